// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    APPROACHING_DAYS, AssignmentPolicy, DUE_SOON_DAYS, DeadlineStatus, compute_due_date,
    days_remaining, deadline_status,
};
use time::macros::{date, datetime};
use time::{Date, Duration, OffsetDateTime};

#[test]
fn test_default_policy() {
    let policy: AssignmentPolicy = AssignmentPolicy::default();
    assert_eq!(policy.loan_days, 30);
    assert_eq!(policy.rest_days, 60);
}

#[test]
fn test_due_date_is_thirty_days_after_assignment() {
    let policy: AssignmentPolicy = AssignmentPolicy::default();
    let due = compute_due_date(datetime!(2026-03-01 10:00 UTC), &policy).unwrap();
    assert_eq!(due, datetime!(2026-03-31 10:00 UTC));
}

#[test]
fn test_due_date_honours_custom_loan() {
    let policy: AssignmentPolicy = AssignmentPolicy::new(7, 60);
    let due = compute_due_date(datetime!(2026-12-28 00:00 UTC), &policy).unwrap();
    assert_eq!(due, datetime!(2027-01-04 00:00 UTC));
}

#[test]
fn test_days_remaining_counts_calendar_days() {
    // Late in the evening still counts as the whole day.
    let due = datetime!(2026-03-10 01:00 UTC);
    assert_eq!(days_remaining(due, date!(2026 - 03 - 09)), 1);
    assert_eq!(days_remaining(due, date!(2026 - 03 - 10)), 0);
    assert_eq!(days_remaining(due, date!(2026 - 03 - 12)), -2);
}

#[test]
fn test_deadline_thresholds() {
    let due = datetime!(2026-03-31 12:00 UTC);
    assert_eq!(
        deadline_status(Some(due), date!(2026 - 04 - 01)),
        DeadlineStatus::Overdue
    );
    assert_eq!(
        deadline_status(Some(due), date!(2026 - 03 - 31)),
        DeadlineStatus::DueSoon
    );
    assert_eq!(
        deadline_status(Some(due), date!(2026 - 03 - 26)),
        DeadlineStatus::DueSoon
    );
    assert_eq!(
        deadline_status(Some(due), date!(2026 - 03 - 25)),
        DeadlineStatus::Approaching
    );
    assert_eq!(
        deadline_status(Some(due), date!(2026 - 03 - 16)),
        DeadlineStatus::Approaching
    );
    assert_eq!(
        deadline_status(Some(due), date!(2026 - 03 - 15)),
        DeadlineStatus::OnTrack
    );
}

#[test]
fn test_deadline_edges_sit_on_threshold_days() {
    let today: Date = date!(2026 - 03 - 01);
    let due_in = |days: i64| -> OffsetDateTime {
        datetime!(2026-03-01 18:00 UTC) + Duration::days(days)
    };

    assert_eq!(days_remaining(due_in(DUE_SOON_DAYS), today), 5);
    assert_eq!(
        deadline_status(Some(due_in(DUE_SOON_DAYS)), today),
        DeadlineStatus::DueSoon
    );
    assert_eq!(
        deadline_status(Some(due_in(DUE_SOON_DAYS + 1)), today),
        DeadlineStatus::Approaching
    );

    assert_eq!(days_remaining(due_in(APPROACHING_DAYS), today), 15);
    assert_eq!(
        deadline_status(Some(due_in(APPROACHING_DAYS)), today),
        DeadlineStatus::Approaching
    );
    assert_eq!(
        deadline_status(Some(due_in(APPROACHING_DAYS + 1)), today),
        DeadlineStatus::OnTrack
    );

    assert_eq!(deadline_status(Some(due_in(0)), today), DeadlineStatus::DueSoon);
    assert_eq!(deadline_status(Some(due_in(-1)), today), DeadlineStatus::Overdue);
}

#[test]
fn test_missing_due_date_is_overdue() {
    assert_eq!(
        deadline_status(None, date!(2026 - 03 - 01)),
        DeadlineStatus::Overdue
    );
}
