// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use territory_audit::{Actor, Cause};
use territory_domain::{
    Assignment, MapLocation, Territory, TerritoryRequest, TerritoryStatus,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-03-01 10:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::for_user(String::from("admin"), 1, String::from("Admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_territory() -> Territory {
    let mut territory: Territory = Territory::new(
        "T-12",
        MapLocation::Link(String::from("https://maps.example.org/t12.pdf")),
        datetime!(2025-01-01 00:00 UTC),
    );
    territory.territory_id = Some(12);
    territory
}

pub fn create_assigned_territory(user_id: i64) -> Territory {
    let mut territory: Territory = create_test_territory();
    territory.status = TerritoryStatus::InUse;
    territory.assignment = Some(Assignment {
        user_id,
        user_name: String::from("Ana"),
        assignment_date: datetime!(2026-02-01 09:00 UTC),
        due_date: datetime!(2026-03-03 09:00 UTC),
    });
    territory
}

pub fn create_pending_request(user_id: i64) -> TerritoryRequest {
    let mut request: TerritoryRequest =
        TerritoryRequest::new(user_id, String::from("Ana"), datetime!(2026-02-28 18:00 UTC));
    request.request_id = Some(3);
    request
}
