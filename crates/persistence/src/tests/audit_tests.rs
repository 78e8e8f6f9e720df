// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{NOW, create_test_cause, create_test_persistence};
use crate::{AuditEventRecord, PersistenceError, encode_timestamp};
use territory_audit::{Action, Actor, AuditEvent, StateSnapshot};
use time::Duration;

fn event(name: &str) -> AuditEvent {
    AuditEvent::new(
        Actor::for_user(String::from("admin"), 1, String::from("Admin")),
        create_test_cause(),
        Action::new(name.to_string(), Some(String::from("details"))),
        StateSnapshot::new(String::from("before")),
        StateSnapshot::new(String::from("after")),
    )
}

#[test]
fn test_audit_event_round_trip() {
    let mut persistence = create_test_persistence();

    let event_id: i64 = persistence
        .persist_audit_event(&event("UpdateTerritory"), NOW)
        .unwrap();
    let record: AuditEventRecord = persistence.get_audit_event(event_id).unwrap();

    assert_eq!(record.event.event_id, Some(event_id));
    assert_eq!(record.event.action.name, "UpdateTerritory");
    assert_eq!(record.event.actor.user_id, Some(1));
    assert_eq!(record.event.actor.display_name.as_deref(), Some("Admin"));
    assert_eq!(record.event.before.data, "before");
    assert_eq!(record.created_at, encode_timestamp(NOW));
}

#[test]
fn test_unknown_audit_event() {
    let mut persistence = create_test_persistence();

    let result = persistence.get_audit_event(404);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_list_audit_events_newest_first() {
    let mut persistence = create_test_persistence();
    persistence
        .persist_audit_event(&event("First"), NOW)
        .unwrap();
    persistence
        .persist_audit_event(&event("Second"), NOW + Duration::seconds(1))
        .unwrap();

    let names: Vec<String> = persistence
        .list_audit_events(10)
        .unwrap()
        .into_iter()
        .map(|r| r.event.action.name)
        .collect();

    assert_eq!(names, vec!["Second", "First"]);
}

#[test]
fn test_timestamps_sort_lexically() {
    let early: String = encode_timestamp(NOW);
    let late: String = encode_timestamp(NOW + Duration::milliseconds(1500));

    assert!(early < late);
    assert_eq!(early, "2026-03-01T10:00:00.000Z");
    assert_eq!(late, "2026-03-01T10:00:01.500Z");
}
