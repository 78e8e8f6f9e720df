// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Loan period, rest window, and deadline rules.
//!
//! ## Invariants
//!
//! - A due date is always the assignment date plus the loan period
//! - Days remaining are counted in whole calendar days, not 24-hour spans
//! - A missing due date is treated as overdue

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

/// Default number of days a publisher may keep a territory.
pub const DEFAULT_LOAN_DAYS: u16 = 30;

/// Default number of days a completed territory rests before reassignment.
pub const DEFAULT_REST_DAYS: u16 = 60;

/// Days remaining at or below which a deadline is "due soon".
pub const DUE_SOON_DAYS: i64 = 5;

/// Days remaining at or below which a deadline is "approaching".
pub const APPROACHING_DAYS: i64 = 15;

/// Tunable periods governing assignment and rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentPolicy {
    /// Length of a loan in days.
    pub loan_days: u16,
    /// Length of the rest window in days.
    pub rest_days: u16,
}

impl AssignmentPolicy {
    /// Creates a policy with explicit periods.
    #[must_use]
    pub const fn new(loan_days: u16, rest_days: u16) -> Self {
        Self {
            loan_days,
            rest_days,
        }
    }

    /// Returns the loan period as a duration.
    #[must_use]
    pub fn loan_period(&self) -> Duration {
        Duration::days(i64::from(self.loan_days))
    }

    /// Returns the rest window as a duration.
    #[must_use]
    pub fn rest_period(&self) -> Duration {
        Duration::days(i64::from(self.rest_days))
    }
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LOAN_DAYS, DEFAULT_REST_DAYS)
    }
}

/// How close an assignment is to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    /// Past due, or no due date recorded.
    Overdue,
    /// Five days or fewer remain.
    DueSoon,
    /// Fifteen days or fewer remain.
    Approaching,
    OnTrack,
}

impl DeadlineStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueSoon => "due_soon",
            Self::Approaching => "approaching",
            Self::OnTrack => "on_track",
        }
    }
}

/// Computes the due date for a new assignment.
///
/// # Arguments
///
/// * `assignment_date` - When the territory is handed out
/// * `policy` - The active assignment policy
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the result falls outside
/// the representable date range.
pub fn compute_due_date(
    assignment_date: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<OffsetDateTime, DomainError> {
    assignment_date
        .checked_add(policy.loan_period())
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("adding {} loan days", policy.loan_days),
        })
}

/// Counts whole calendar days from `today` until `due_date`.
///
/// The result is negative once the due date has passed.
#[must_use]
pub fn days_remaining(due_date: OffsetDateTime, today: Date) -> i64 {
    (due_date.date() - today).whole_days()
}

/// Classifies an assignment by how much time is left before it is due.
#[must_use]
pub fn deadline_status(due_date: Option<OffsetDateTime>, today: Date) -> DeadlineStatus {
    let Some(due) = due_date else {
        return DeadlineStatus::Overdue;
    };

    let remaining: i64 = days_remaining(due, today);
    if remaining < 0 {
        DeadlineStatus::Overdue
    } else if remaining <= DUE_SOON_DAYS {
        DeadlineStatus::DueSoon
    } else if remaining <= APPROACHING_DAYS {
        DeadlineStatus::Approaching
    } else {
        DeadlineStatus::OnTrack
    }
}
