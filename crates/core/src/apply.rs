// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{
    AssignmentResult, RequestEligibility, RequestResult, TransitionResult, request_snapshot,
    territory_snapshot,
};
use territory_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use territory_domain::{
    Assignment, AssignmentPolicy, DomainError, HistoryEntry, MapLocation, NewNotification,
    NotificationKind, RequestStatus, Territory, TerritoryRequest, TerritoryStatus,
    compute_due_date, validate_notes, validate_territory_name,
};
use time::OffsetDateTime;

/// Applies a command to a territory, producing the new territory and an audit event.
///
/// This function is pure: the current time is supplied by the caller and
/// nothing is written anywhere.
///
/// # Arguments
///
/// * `territory` - The current territory (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The current time
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new territory, an optional
///   notification, and the audit event
/// * `Err(CoreError)` if the command is invalid for the territory
///
/// # Errors
///
/// Returns an error if:
/// - A report is submitted for a territory that is not in use
/// - A report is submitted by someone other than the assignee
/// - A reclaim targets a territory that is not in use
/// - A status change targets `InUse` or a territory that is in use
/// - An edited name or notes fail validation
#[allow(clippy::too_many_lines)]
pub fn apply(
    territory: &Territory,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let action_name: &'static str = command.action_name();
    let before: StateSnapshot = territory_snapshot(territory);
    let mut new_territory: Territory = territory.clone();

    let (details, notification): (String, Option<NewNotification>) = match command {
        Command::UpdateDetails {
            name,
            permanent_notes,
        } => {
            if let Some(name) = name {
                validate_territory_name(&name)?;
                new_territory.name = name.trim().to_string();
            }
            if let Some(notes) = permanent_notes {
                validate_notes(&notes)?;
                new_territory.permanent_notes = notes;
            }
            (
                format!("Updated details of territory '{}'", new_territory.name),
                None,
            )
        }
        Command::SetStatus { status } => {
            if status == TerritoryStatus::InUse {
                return Err(CoreError::DomainViolation(
                    DomainError::InvalidTerritoryStatus(String::from(
                        "in_use is only reachable by assigning a request",
                    )),
                ));
            }
            if territory.status == TerritoryStatus::InUse {
                return Err(status_conflict(territory, "change the status of"));
            }
            new_territory.status = status;
            (
                format!(
                    "Changed status of territory '{}' from {} to {status}",
                    territory.name, territory.status
                ),
                None,
            )
        }
        Command::SubmitReport {
            user_id,
            user_name,
            notes,
        } => {
            let Some(assignment) = territory.assignment.as_ref() else {
                return Err(status_conflict(territory, "report on"));
            };
            if territory.status != TerritoryStatus::InUse {
                return Err(status_conflict(territory, "report on"));
            }
            if assignment.user_id != user_id {
                return Err(CoreError::DomainViolation(
                    DomainError::TerritoryNotAssignedToUser {
                        territory: territory.name.clone(),
                        user_id,
                    },
                ));
            }

            let notes: Option<String> = notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            if let Some(text) = notes.as_deref() {
                validate_notes(text)?;
            }

            new_territory.history.push(HistoryEntry {
                user_id,
                user_name: user_name.clone(),
                assignment_date: Some(assignment.assignment_date),
                completed_date: now,
                notes,
            });
            new_territory.assignment = None;
            new_territory.status = TerritoryStatus::Available;

            (
                format!(
                    "{user_name} completed territory '{}' assigned on {}",
                    territory.name,
                    assignment.assignment_date.date()
                ),
                None,
            )
        }
        Command::Reclaim => {
            let Some(assignment) = territory.assignment.as_ref() else {
                return Err(status_conflict(territory, "reclaim"));
            };
            if territory.status != TerritoryStatus::InUse {
                return Err(status_conflict(territory, "reclaim"));
            }

            new_territory.assignment = None;
            new_territory.status = TerritoryStatus::Available;

            let notification: NewNotification = NewNotification {
                user_id: assignment.user_id,
                message: format!(
                    "Territory {} was returned to the available pool by an administrator",
                    territory.name
                ),
                kind: NotificationKind::Warning,
            };

            (
                format!(
                    "Reclaimed territory '{}' from {}",
                    territory.name, assignment.user_name
                ),
                Some(notification),
            )
        }
    };

    let after: StateSnapshot = territory_snapshot(&new_territory);
    let action: Action = Action::new(String::from(action_name), Some(details));
    let audit_event: AuditEvent = AuditEvent::new(actor, cause, action, before, after);

    Ok(TransitionResult {
        new_territory,
        notification,
        audit_event,
    })
}

/// Assigns a territory to the publisher who opened a request.
///
/// The territory becomes `InUse` with a due date `policy.loan_days` after
/// `now`, the request becomes `Approved`, and exactly one success
/// notification is produced for the requester.
///
/// # Errors
///
/// Returns an error if:
/// - The request is no longer pending
/// - The territory is not available (in use or held closed)
/// - The due date cannot be represented
pub fn apply_assignment(
    territory: &Territory,
    request: &TerritoryRequest,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<AssignmentResult, CoreError> {
    if !request.is_pending() {
        return Err(CoreError::DomainViolation(DomainError::RequestNotPending {
            request_id: request.request_id.unwrap_or_default(),
        }));
    }
    if !territory.status.is_assignable() {
        return Err(status_conflict(territory, "assign"));
    }

    let due_date: OffsetDateTime = compute_due_date(now, policy)?;

    let mut new_territory: Territory = territory.clone();
    new_territory.status = TerritoryStatus::InUse;
    new_territory.assignment = Some(Assignment {
        user_id: request.user_id,
        user_name: request.user_name.clone(),
        assignment_date: now,
        due_date,
    });

    let mut new_request: TerritoryRequest = request.clone();
    new_request.status = RequestStatus::Approved;

    let notification: NewNotification = NewNotification {
        user_id: request.user_id,
        message: format!(
            "Territory {} has been assigned to you. Please return it by {}",
            territory.name,
            due_date.date()
        ),
        kind: NotificationKind::Success,
    };

    let before: StateSnapshot = StateSnapshot::new(format!(
        "{};{}",
        territory.snapshot_string(),
        request.snapshot_string()
    ));
    let after: StateSnapshot = StateSnapshot::new(format!(
        "{};{}",
        new_territory.snapshot_string(),
        new_request.snapshot_string()
    ));
    let action: Action = Action::new(
        String::from("AssignTerritory"),
        Some(format!(
            "Assigned territory '{}' to {} until {}",
            territory.name,
            request.user_name,
            due_date.date()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(actor, cause, action, before, after);

    Ok(AssignmentResult {
        territory: new_territory,
        request: new_request,
        notification,
        audit_event,
    })
}

/// Opens a new territory request for a publisher.
///
/// # Arguments
///
/// * `user_id` - The requesting user
/// * `user_name` - The requesting user's display name
/// * `eligibility` - The user's held territory and pending request state
/// * `now` - The request timestamp
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns `DomainError::AlreadyHoldsTerritory` if the user is still working
/// a territory, or `DomainError::DuplicatePendingRequest` if a request is
/// already pending.
pub fn open_request(
    user_id: i64,
    user_name: &str,
    eligibility: &RequestEligibility,
    now: OffsetDateTime,
    actor: Actor,
    cause: Cause,
) -> Result<RequestResult, CoreError> {
    if let Some(territory) = &eligibility.held_territory {
        return Err(CoreError::DomainViolation(
            DomainError::AlreadyHoldsTerritory {
                user_id,
                territory: territory.clone(),
            },
        ));
    }
    if eligibility.has_pending {
        return Err(CoreError::DomainViolation(
            DomainError::DuplicatePendingRequest { user_id },
        ));
    }

    let request: TerritoryRequest = TerritoryRequest::new(user_id, user_name.to_string(), now);

    let action: Action = Action::new(
        String::from("RequestTerritory"),
        Some(format!("{user_name} requested a territory")),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("request_does_not_exist")),
        request_snapshot(&request),
    );

    Ok(RequestResult {
        request,
        audit_event,
    })
}

/// Rejects a pending request.
///
/// # Errors
///
/// Returns `DomainError::RequestNotPending` if the request was already resolved.
pub fn reject_request(
    request: &TerritoryRequest,
    actor: Actor,
    cause: Cause,
) -> Result<RequestResult, CoreError> {
    if !request.is_pending() {
        return Err(CoreError::DomainViolation(DomainError::RequestNotPending {
            request_id: request.request_id.unwrap_or_default(),
        }));
    }

    let mut new_request: TerritoryRequest = request.clone();
    new_request.status = RequestStatus::Rejected;

    let action: Action = Action::new(
        String::from("RejectRequest"),
        Some(format!("Rejected request from {}", request.user_name)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        request_snapshot(request),
        request_snapshot(&new_request),
    );

    Ok(RequestResult {
        request: new_request,
        audit_event,
    })
}

/// Creates a new available territory.
///
/// # Errors
///
/// Returns an error if the name is invalid.
pub fn create_territory(
    name: &str,
    map: MapLocation,
    now: OffsetDateTime,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    validate_territory_name(name)?;

    let territory: Territory = Territory::new(name, map, now);

    let action: Action = Action::new(
        String::from("CreateTerritory"),
        Some(format!(
            "Created territory '{}' with map {}",
            territory.name,
            territory.map.url()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("territory_does_not_exist")),
        territory_snapshot(&territory),
    );

    Ok(TransitionResult {
        new_territory: territory,
        notification: None,
        audit_event,
    })
}

/// Validates that a territory may be deleted and records the deletion.
///
/// # Errors
///
/// Returns an error if the territory is in use.
pub fn delete_territory(
    territory: &Territory,
    actor: Actor,
    cause: Cause,
) -> Result<AuditEvent, CoreError> {
    if !territory.status.is_deletable() {
        return Err(status_conflict(territory, "delete"));
    }

    let action: Action = Action::new(
        String::from("DeleteTerritory"),
        Some(format!(
            "Deleted territory '{}' with {} history entries",
            territory.name,
            territory.history.len()
        )),
    );

    Ok(AuditEvent::new(
        actor,
        cause,
        action,
        territory_snapshot(territory),
        StateSnapshot::new(String::from("territory_deleted")),
    ))
}

fn status_conflict(territory: &Territory, operation: &'static str) -> CoreError {
    CoreError::DomainViolation(DomainError::TerritoryStatusConflict {
        territory: territory.name.clone(),
        status: territory.status,
        operation,
    })
}
