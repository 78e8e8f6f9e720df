// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod policy;
mod statistics;
mod triage;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use policy::{
    APPROACHING_DAYS, AssignmentPolicy, DEFAULT_LOAN_DAYS, DEFAULT_REST_DAYS, DUE_SOON_DAYS,
    DeadlineStatus, compute_due_date, days_remaining, deadline_status,
};
pub use statistics::{
    InactiveTerritory, LONGEST_INACTIVE_LIMIT, TerritoryStatistics, compute_statistics,
};
pub use triage::{compare_for_triage, compare_names, is_resting, last_completed, sort_for_triage};
pub use types::{
    Assignment, HistoryEntry, MapLocation, NewNotification, Notification, NotificationKind,
    RequestStatus, Role, Territory, TerritoryRequest, TerritoryStatus,
};
pub use validation::{
    FALLBACK_DISPLAY_NAME, MAP_FILE_EXTENSIONS, MAX_DISPLAY_NAME_LEN, MAX_NOTES_LEN,
    MAX_TERRITORY_NAME_LEN, display_name_fallback, normalize_email, validate_display_name,
    validate_email, validate_map_file_name, validate_map_link, validate_notes,
    validate_territory_name,
};
