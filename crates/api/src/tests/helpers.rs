// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use territory_audit::Cause;
use territory_domain::{AssignmentPolicy, Role};
use territory_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AssignTerritoryRequest, AuthenticatedActor, CreateTerritoryRequest, RequestResponse,
    SignUpRequest, SignUpResponse, TerritoryResponse, assign_territory, create_territory,
    request_territory, sign_up,
};

pub const NOW: OffsetDateTime = datetime!(2026-03-01 10:00 UTC);
pub const PASSWORD: &str = "walking42";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory()
        .expect("in-memory database")
        .with_password_cost(4)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-1"), String::from("API request"))
}

pub fn create_sign_up_request(email: &str, display_name: Option<&str>) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        display_name: display_name.map(str::to_string),
        password: String::from(PASSWORD),
        password_confirmation: String::from(PASSWORD),
    }
}

fn actor_from(response: &SignUpResponse) -> AuthenticatedActor {
    let role: Role = response.role.parse().unwrap();
    AuthenticatedActor::new(
        response.user_id,
        response.email.clone(),
        response.display_name.clone(),
        role,
    )
}

/// Signs up an administrator (first account) and a publisher.
pub fn seed_accounts(persistence: &mut Persistence) -> (AuthenticatedActor, AuthenticatedActor) {
    let admin: SignUpResponse = sign_up(
        persistence,
        &create_sign_up_request("admin@example.org", Some("Admin")),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    let publisher: SignUpResponse = sign_up(
        persistence,
        &create_sign_up_request("ana@example.org", Some("Ana")),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    (actor_from(&admin), actor_from(&publisher))
}

/// Signs up one more publisher.
pub fn seed_publisher(
    persistence: &mut Persistence,
    email: &str,
    name: &str,
) -> AuthenticatedActor {
    let response: SignUpResponse = sign_up(
        persistence,
        &create_sign_up_request(email, Some(name)),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    actor_from(&response)
}

pub fn seed_territory(
    persistence: &mut Persistence,
    admin: &AuthenticatedActor,
    name: &str,
) -> i64 {
    let response: TerritoryResponse = create_territory(
        persistence,
        &CreateTerritoryRequest {
            name: name.to_string(),
            map_url: format!("https://maps.example.org/{name}.pdf"),
        },
        admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();
    response.territory.territory_id
}

/// Opens a request for `publisher` and assigns `territory_id` to it.
pub fn seed_assignment(
    persistence: &mut Persistence,
    admin: &AuthenticatedActor,
    publisher: &AuthenticatedActor,
    territory_id: i64,
) {
    let request: RequestResponse =
        request_territory(persistence, publisher, create_test_cause(), NOW).unwrap();
    assign_territory(
        persistence,
        request.request.request_id,
        &AssignTerritoryRequest { territory_id },
        admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();
}
