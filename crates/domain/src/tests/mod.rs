// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod policy;

use crate::{HistoryEntry, MapLocation, Territory, TerritoryStatus, Assignment};
use time::OffsetDateTime;

/// Builds an available territory with no history.
pub fn territory(id: i64, name: &str, created_at: OffsetDateTime) -> Territory {
    let mut t: Territory = Territory::new(
        name,
        MapLocation::Link(format!("https://maps.example.org/{id}.pdf")),
        created_at,
    );
    t.territory_id = Some(id);
    t
}

/// Appends a completed work cycle to a territory.
pub fn with_completion(mut t: Territory, completed: OffsetDateTime) -> Territory {
    t.history.push(HistoryEntry {
        user_id: 7,
        user_name: String::from("Ana"),
        assignment_date: None,
        completed_date: completed,
        notes: None,
    });
    t
}

/// Marks a territory as in use by user 7.
pub fn in_use(mut t: Territory, assigned: OffsetDateTime) -> Territory {
    t.status = TerritoryStatus::InUse;
    t.assignment = Some(Assignment {
        user_id: 7,
        user_name: String::from("Ana"),
        assignment_date: assigned,
        due_date: assigned + time::Duration::days(30),
    });
    t
}
