// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;

use crate::{Persistence, PersistenceError, UserData};
use territory_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use territory_core::{TransitionResult, create_territory};
use territory_domain::MapLocation;
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-03-01 10:00 UTC);

/// Opens an isolated database with a cheap bcrypt cost.
pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory()
        .expect("in-memory database")
        .with_password_cost(4)
}

pub fn create_test_actor() -> Actor {
    Actor::for_user(String::from("admin"), 1, String::from("Admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_event(name: &str) -> AuditEvent {
    AuditEvent::new(
        create_test_actor(),
        create_test_cause(),
        Action::new(name.to_string(), None),
        StateSnapshot::new(String::from("before")),
        StateSnapshot::new(String::from("after")),
    )
}

/// Registers an account with a `SignUp` audit event.
pub fn register(
    persistence: &mut Persistence,
    email: &str,
    display_name: &str,
) -> Result<UserData, PersistenceError> {
    persistence.register_user(email, display_name, "secret-pass", NOW, |_| {
        create_test_event("SignUp")
    })
}

/// Registers an administrator followed by a publisher.
pub fn seed_users(persistence: &mut Persistence) -> (UserData, UserData) {
    let admin: UserData = register(persistence, "admin@example.org", "Admin").unwrap();
    let publisher: UserData = register(persistence, "ana@example.org", "Ana").unwrap();
    (admin, publisher)
}

/// Stores a new available territory and returns its ID.
pub fn seed_territory(persistence: &mut Persistence, name: &str) -> i64 {
    let result: TransitionResult = create_territory(
        name,
        MapLocation::Link(format!("https://maps.example.org/{name}.pdf")),
        NOW,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    persistence
        .create_territory(result, NOW)
        .unwrap()
        .new_territory
        .territory_id
        .unwrap()
}
