// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use territory_audit::{AuditEvent, StateSnapshot};
use territory_domain::{NewNotification, Territory, TerritoryRequest};

/// Converts a territory to a snapshot for audit purposes.
#[must_use]
pub fn territory_snapshot(territory: &Territory) -> StateSnapshot {
    StateSnapshot::new(territory.snapshot_string())
}

/// Converts a request to a snapshot for audit purposes.
#[must_use]
pub fn request_snapshot(request: &TerritoryRequest) -> StateSnapshot {
    StateSnapshot::new(request.snapshot_string())
}

/// The result of a successful territory transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The territory after the transition.
    pub new_territory: Territory,
    /// A notification to deliver alongside the change, if any.
    pub notification: Option<NewNotification>,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of assigning a territory in response to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResult {
    /// The territory, now in use by the requester.
    pub territory: Territory,
    /// The request, now approved.
    pub request: TerritoryRequest,
    /// Exactly one notification for the requester.
    pub notification: NewNotification,
    /// The audit event recording the assignment.
    pub audit_event: AuditEvent,
}

/// What the store knows about a user at the moment they ask for a territory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEligibility {
    /// Whether the user already has a pending request.
    pub has_pending: bool,
    /// The name of the territory the user is currently working, if any.
    pub held_territory: Option<String>,
}

/// The result of opening or resolving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    /// The request after the transition.
    pub request: TerritoryRequest,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
