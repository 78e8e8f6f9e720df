// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler takes the persistence adapter, the authenticated actor where
//! one is required, and the current time. Authorization is enforced here,
//! before any command is built.

use std::str::FromStr;
use territory_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use territory_core::{
    AssignmentResult, Command, RequestResult, TransitionResult, apply, apply_assignment,
    create_territory as create_territory_cmd, delete_territory as delete_territory_cmd,
    open_request, reject_request as reject_request_cmd,
};
use territory_domain::{
    AssignmentPolicy, DomainError, MapLocation, Notification, Role, Territory, TerritoryRequest,
    TerritoryStatistics, TerritoryStatus, compare_names, compute_statistics, days_remaining,
    deadline_status, display_name_fallback, is_resting, normalize_email, sort_for_triage,
    validate_display_name, validate_email, validate_map_file_name, validate_map_link,
};
use territory_persistence::{AuditEventRecord, DEFAULT_NOTIFICATION_LIMIT, Persistence, UserData};
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::capabilities::{
    compute_global_capabilities, compute_territory_capabilities, compute_user_capabilities,
};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AssignTerritoryRequest, AssignTerritoryResponse, AssignmentInfo, AuditEventInfo,
    ChangePasswordRequest, ChangePasswordResponse, CreateTerritoryRequest,
    CreateUploadedTerritoryRequest, DeleteTerritoryResponse, HistoryEntryInfo,
    InactiveTerritoryInfo, ListAuditEventsResponse, ListNotificationsResponse,
    ListRequestsResponse, ListTerritoriesRequest, ListTerritoriesResponse, ListUsersResponse,
    LoginRequest, LoginResponse, MarkNotificationsReadRequest, MarkNotificationsReadResponse,
    NotificationInfo, PublisherOverviewResponse, RequestInfo, RequestResponse, SignUpRequest,
    SignUpResponse, StatisticsResponse, SubmitReportRequest, TerritoryHistoryResponse,
    TerritoryInfo, TerritoryOrder, TerritoryResponse, UpdateTerritoryRequest,
    UpdateUserRoleRequest, UpdateUserRoleResponse, UserInfo, WhoAmIResponse,
};

// ========================================================================
// Conversions
// ========================================================================

fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), ApiError> {
    AuthorizationService::require_admin(actor, action)?;
    Ok(())
}

fn persisted_id(id: Option<i64>, what: &str) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::Internal {
        message: format!("{what} has no identifier after persistence"),
    })
}

fn territory_info(
    actor: &AuthenticatedActor,
    territory: &Territory,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryInfo, ApiError> {
    let territory_id: i64 = persisted_id(territory.territory_id, "Territory")?;

    let assignment: Option<AssignmentInfo> = territory.assignment.as_ref().map(|a| {
        AssignmentInfo {
            user_id: a.user_id,
            user_name: a.user_name.clone(),
            assignment_date: a.assignment_date,
            due_date: a.due_date,
            days_remaining: days_remaining(a.due_date, now.date()),
            deadline_status: String::from(deadline_status(Some(a.due_date), now.date()).as_str()),
        }
    });

    Ok(TerritoryInfo {
        territory_id,
        name: territory.name.clone(),
        status: String::from(territory.status.as_str()),
        map_url: territory.map.url(),
        permanent_notes: territory.permanent_notes.clone(),
        created_at: territory.created_at,
        assignment,
        last_completed_date: territory.last_completed().map(|e| e.completed_date),
        history_count: territory.history.len(),
        is_resting: is_resting(territory, now, policy),
        capabilities: compute_territory_capabilities(actor, territory),
    })
}

fn request_info(request: &TerritoryRequest) -> Result<RequestInfo, ApiError> {
    Ok(RequestInfo {
        request_id: persisted_id(request.request_id, "Request")?,
        user_id: request.user_id,
        user_name: request.user_name.clone(),
        request_date: request.request_date,
        status: String::from(request.status.as_str()),
    })
}

fn notification_info(notification: Notification) -> NotificationInfo {
    NotificationInfo {
        notification_id: notification.notification_id,
        message: notification.message,
        kind: String::from(notification.kind.as_str()),
        read: notification.read,
        created_at: notification.created_at,
    }
}

fn load_territory(
    persistence: &mut Persistence,
    territory_id: i64,
) -> Result<Territory, ApiError> {
    persistence
        .get_territory(territory_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::TerritoryNotFound(territory_id)))
}

fn parse_status(status: &str) -> Result<TerritoryStatus, ApiError> {
    TerritoryStatus::from_str(status.trim()).map_err(translate_domain_error)
}

// ========================================================================
// Accounts
// ========================================================================

/// Creates an account.
///
/// The first account ever created becomes an administrator. When no display
/// name is given, the local part of the email is used.
///
/// # Errors
///
/// Returns an error if:
/// - The email or display name is invalid
/// - The password violates the password policy
/// - The email is already registered
pub fn sign_up(
    persistence: &mut Persistence,
    request: &SignUpRequest,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SignUpResponse, ApiError> {
    validate_email(&request.email).map_err(translate_domain_error)?;
    let email: String = normalize_email(&request.email);

    let display_name: String = display_name_fallback(request.display_name.as_deref(), &email);
    validate_display_name(&display_name).map_err(translate_domain_error)?;

    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &email,
        &display_name,
    )?;

    let user: UserData = persistence
        .register_user(&email, &display_name, &request.password, now, |user| {
            AuditEvent::new(
                Actor::for_user(user.role.clone(), user.user_id, user.display_name.clone()),
                cause,
                Action::new(
                    String::from("SignUp"),
                    Some(format!("{} created an account", user.display_name)),
                ),
                StateSnapshot::new(String::from("user_does_not_exist")),
                StateSnapshot::new(format!("user_id={},role={}", user.user_id, user.role)),
            )
        })
        .map_err(translate_persistence_error)?;

    info!(user_id = user.user_id, role = %user.role, "Account created");

    Ok(SignUpResponse {
        user_id: user.user_id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
        message: String::from("Account created"),
    })
}

/// Logs in and creates a session.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` if the credentials are wrong.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    now: OffsetDateTime,
    session_ttl: Duration,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor, expires_at): (String, AuthenticatedActor, OffsetDateTime) =
        AuthenticationService::login(
            persistence,
            &request.email,
            &request.password,
            now,
            session_ttl,
        )?;

    Ok(LoginResponse {
        session_token,
        user_id: actor.user_id,
        email: actor.email,
        display_name: actor.display_name,
        role: String::from(actor.role.as_str()),
        expires_at,
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the authenticated account and what it may do.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: actor.user_id,
        email: actor.email.clone(),
        display_name: actor.display_name.clone(),
        role: String::from(actor.role.as_str()),
        capabilities: compute_global_capabilities(actor),
    }
}

/// Changes the caller's own password and ends all of their sessions.
///
/// # Errors
///
/// Returns an error if:
/// - The current password is wrong
/// - The new password violates the password policy
pub fn change_password(
    persistence: &mut Persistence,
    request: &ChangePasswordRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ChangePasswordResponse, ApiError> {
    let user: UserData = persistence
        .get_user_by_id(actor.user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::UserNotFound(actor.user_id)))?;

    let current_ok: bool = persistence
        .verify_password(&request.current_password, &user.password_hash)
        .map_err(translate_persistence_error)?;
    if !current_ok {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &user.email,
        &user.display_name,
    )?;

    let audit_actor: Actor = actor.to_audit_actor();
    let sessions_invalidated: usize = persistence
        .change_password(actor.user_id, &request.new_password, now, |sessions_invalidated| {
            AuditEvent::new(
                audit_actor,
                cause,
                Action::new(String::from("ChangePassword"), None),
                StateSnapshot::new(format!("user_id={}", actor.user_id)),
                StateSnapshot::new(format!(
                    "user_id={},sessions_invalidated={sessions_invalidated}",
                    actor.user_id
                )),
            )
        })
        .map_err(translate_persistence_error)?;

    Ok(ChangePasswordResponse {
        sessions_invalidated,
        message: String::from("Password changed. Please log in again."),
    })
}

// ========================================================================
// Territories
// ========================================================================

/// Lists territories with optional search, status filter, and ordering.
///
/// # Errors
///
/// Returns an error if the status filter is not a known status or the
/// query fails.
pub fn list_territories(
    persistence: &mut Persistence,
    request: &ListTerritoriesRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<ListTerritoriesResponse, ApiError> {
    let status_filter: Option<TerritoryStatus> = request
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_status)
        .transpose()?;

    let needle: Option<String> = request
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut territories: Vec<Territory> = persistence
        .list_territories()
        .map_err(translate_persistence_error)?
        .into_iter()
        .filter(|t| status_filter.is_none_or(|status| t.status == status))
        .filter(|t| {
            needle
                .as_deref()
                .is_none_or(|n| t.name.to_lowercase().contains(n))
        })
        .collect();

    match request.order {
        TerritoryOrder::Triage => sort_for_triage(&mut territories, now, policy),
        TerritoryOrder::Name => territories.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }

    let territories: Vec<TerritoryInfo> = territories
        .iter()
        .map(|t| territory_info(actor, t, now, policy))
        .collect::<Result<_, _>>()?;

    Ok(ListTerritoriesResponse { territories })
}

/// Retrieves one territory.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the territory does not exist.
pub fn get_territory(
    persistence: &mut Persistence,
    territory_id: i64,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryInfo, ApiError> {
    let territory: Territory = load_territory(persistence, territory_id)?;
    territory_info(actor, &territory, now, policy)
}

fn store_new_territory(
    persistence: &mut Persistence,
    name: &str,
    map: MapLocation,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryResponse, ApiError> {
    let result: TransitionResult =
        create_territory_cmd(name, map, now, actor.to_audit_actor(), cause)
            .map_err(translate_core_error)?;
    let stored: TransitionResult = persistence
        .create_territory(result, now)
        .map_err(translate_persistence_error)?;

    let territory: TerritoryInfo = territory_info(actor, &stored.new_territory, now, policy)?;
    Ok(TerritoryResponse {
        message: format!("Territory '{}' created", territory.name),
        territory,
    })
}

/// Creates a territory whose map is an external link. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the name or link is invalid.
pub fn create_territory(
    persistence: &mut Persistence,
    request: &CreateTerritoryRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryResponse, ApiError> {
    require_admin(actor, "create_territory")?;
    validate_map_link(&request.map_url).map_err(translate_domain_error)?;

    store_new_territory(
        persistence,
        &request.name,
        MapLocation::Link(request.map_url.trim().to_string()),
        actor,
        cause,
        now,
        policy,
    )
}

/// Creates a territory whose map was uploaded to the map store. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the name is invalid, or the
/// uploaded file type is not accepted.
pub fn create_uploaded_territory(
    persistence: &mut Persistence,
    request: &CreateUploadedTerritoryRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryResponse, ApiError> {
    require_admin(actor, "create_territory")?;
    validate_map_file_name(&request.original_file_name).map_err(translate_domain_error)?;

    store_new_territory(
        persistence,
        &request.name,
        MapLocation::Stored {
            file_name: request.stored_file_name.clone(),
        },
        actor,
        cause,
        now,
        policy,
    )
}

/// Folds a status change into a details edit so both land as one event.
fn merge_transitions(first: TransitionResult, second: TransitionResult) -> TransitionResult {
    let details: Option<String> = match (
        first.audit_event.action.details,
        second.audit_event.action.details,
    ) {
        (Some(a), Some(b)) => Some(format!("{a}; {b}")),
        (a, b) => a.or(b),
    };

    TransitionResult {
        new_territory: second.new_territory,
        notification: None,
        audit_event: AuditEvent::new(
            second.audit_event.actor,
            second.audit_event.cause,
            Action::new(first.audit_event.action.name, details),
            first.audit_event.before,
            second.audit_event.after,
        ),
    }
}

/// Edits a territory's name, permanent notes, or status. Admin only.
///
/// All requested changes are applied in one transaction.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The territory does not exist
/// - A new name or notes fail validation
/// - The status is `in_use`, or the territory is currently in use and a
///   status change was requested
pub fn update_territory(
    persistence: &mut Persistence,
    territory_id: i64,
    request: &UpdateTerritoryRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryResponse, ApiError> {
    require_admin(actor, "update_territory")?;

    let status: Option<TerritoryStatus> = request.status.as_deref().map(parse_status).transpose()?;
    let details_changed: bool = request.name.is_some() || request.permanent_notes.is_some();

    if !details_changed && status.is_none() {
        return Err(ApiError::InvalidInput {
            field: String::from("body"),
            message: String::from("Nothing to update"),
        });
    }

    let audit_actor: Actor = actor.to_audit_actor();
    let result: TransitionResult = persistence
        .apply_territory_transition(territory_id, now, |territory| {
            let details_command = || Command::UpdateDetails {
                name: request.name.clone(),
                permanent_notes: request.permanent_notes.clone(),
            };

            let Some(status) = status else {
                return apply(territory, details_command(), audit_actor, cause, now);
            };
            if !details_changed {
                return apply(
                    territory,
                    Command::SetStatus { status },
                    audit_actor,
                    cause,
                    now,
                );
            }

            let first: TransitionResult = apply(
                territory,
                details_command(),
                audit_actor.clone(),
                cause.clone(),
                now,
            )?;
            let second: TransitionResult = apply(
                &first.new_territory,
                Command::SetStatus { status },
                audit_actor,
                cause,
                now,
            )?;
            Ok(merge_transitions(first, second))
        })
        .map_err(translate_persistence_error)?;

    let territory: TerritoryInfo = territory_info(actor, &result.new_territory, now, policy)?;
    Ok(TerritoryResponse {
        message: format!("Territory '{}' updated", territory.name),
        territory,
    })
}

/// Deletes a territory and its history. Admin only.
///
/// In-use territories must be reclaimed first. The response names the stored
/// map file, if any, so the caller can remove it.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the territory does not
/// exist, or it is in use.
pub fn delete_territory(
    persistence: &mut Persistence,
    territory_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<DeleteTerritoryResponse, ApiError> {
    require_admin(actor, "delete_territory")?;

    let audit_actor: Actor = actor.to_audit_actor();
    let (deleted, _event): (Territory, AuditEvent) = persistence
        .delete_territory(territory_id, now, |territory| {
            delete_territory_cmd(territory, audit_actor, cause)
        })
        .map_err(translate_persistence_error)?;

    info!(territory_id, name = %deleted.name, "Territory deleted");

    Ok(DeleteTerritoryResponse {
        territory_id,
        stored_map_file: deleted.map.stored_file_name().map(str::to_string),
        message: format!("Territory '{}' deleted", deleted.name),
        name: deleted.name,
    })
}

/// Returns a territory's work history, most recent completion first.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the territory does not exist.
pub fn get_territory_history(
    persistence: &mut Persistence,
    territory_id: i64,
) -> Result<TerritoryHistoryResponse, ApiError> {
    let territory: Territory = load_territory(persistence, territory_id)?;

    let mut entries: Vec<HistoryEntryInfo> = territory
        .history
        .into_iter()
        .map(|e| HistoryEntryInfo {
            user_id: e.user_id,
            user_name: e.user_name,
            assignment_date: e.assignment_date,
            completed_date: e.completed_date,
            notes: e.notes,
        })
        .collect();
    entries.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));

    Ok(TerritoryHistoryResponse {
        territory_id,
        name: territory.name,
        entries,
    })
}

/// Takes an in-use territory back from its assignee. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the territory does not
/// exist, or it is not in use.
pub fn reclaim_territory(
    persistence: &mut Persistence,
    territory_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryResponse, ApiError> {
    require_admin(actor, "reclaim_territory")?;

    let audit_actor: Actor = actor.to_audit_actor();
    let result: TransitionResult = persistence
        .apply_territory_transition(territory_id, now, |territory| {
            apply(territory, Command::Reclaim, audit_actor, cause, now)
        })
        .map_err(translate_persistence_error)?;

    let territory: TerritoryInfo = territory_info(actor, &result.new_territory, now, policy)?;
    Ok(TerritoryResponse {
        message: format!("Territory '{}' returned to the pool", territory.name),
        territory,
    })
}

/// Computes dashboard statistics. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn get_statistics(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<StatisticsResponse, ApiError> {
    require_admin(actor, "get_statistics")?;

    let territories: Vec<Territory> = persistence
        .list_territories()
        .map_err(translate_persistence_error)?;
    let pending_requests: usize = persistence
        .list_pending_requests()
        .map_err(translate_persistence_error)?
        .len();

    let stats: TerritoryStatistics = compute_statistics(&territories, now);

    Ok(StatisticsResponse {
        total: stats.total,
        available: stats.available,
        in_use: stats.in_use,
        closed: stats.closed,
        pending_requests,
        longest_inactive: stats
            .longest_inactive
            .into_iter()
            .map(|t| InactiveTerritoryInfo {
                territory_id: t.territory_id,
                name: t.name,
                status: String::from(t.status.as_str()),
                last_activity: t.last_activity,
                days_inactive: t.days_inactive,
            })
            .collect(),
    })
}

// ========================================================================
// Requests
// ========================================================================

/// Asks the administrators for a territory.
///
/// # Errors
///
/// Returns `ApiError::DomainRuleViolation` if the caller is still working a
/// territory or already has a pending request.
pub fn request_territory(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<RequestResponse, ApiError> {
    let audit_actor: Actor = actor.to_audit_actor();
    let result: RequestResult = persistence
        .open_request(actor.user_id, now, |eligibility| {
            open_request(
                actor.user_id,
                &actor.display_name,
                eligibility,
                now,
                audit_actor,
                cause,
            )
        })
        .map_err(translate_persistence_error)?;

    Ok(RequestResponse {
        request: request_info(&result.request)?,
        message: String::from("Request sent to the administrators"),
    })
}

/// Lists pending requests, newest first. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_pending_requests(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListRequestsResponse, ApiError> {
    require_admin(actor, "list_requests")?;

    let requests: Vec<RequestInfo> = persistence
        .list_pending_requests()
        .map_err(translate_persistence_error)?
        .iter()
        .map(request_info)
        .collect::<Result<_, _>>()?;

    Ok(ListRequestsResponse { requests })
}

/// Assigns a territory to the publisher behind a pending request. Admin only.
///
/// The territory becomes in use with a due date `policy.loan_days` out, the
/// request is approved, and the publisher is notified, all in one
/// transaction.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The request or territory does not exist
/// - The request is no longer pending
/// - The territory is already in use
pub fn assign_territory(
    persistence: &mut Persistence,
    request_id: i64,
    request: &AssignTerritoryRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<AssignTerritoryResponse, ApiError> {
    require_admin(actor, "assign_territory")?;

    let audit_actor: Actor = actor.to_audit_actor();
    let result: AssignmentResult = persistence
        .assign_territory_to_request(request_id, request.territory_id, now, |territory, req| {
            apply_assignment(territory, req, audit_actor, cause, now, policy)
        })
        .map_err(translate_persistence_error)?;

    let territory: TerritoryInfo = territory_info(actor, &result.territory, now, policy)?;
    Ok(AssignTerritoryResponse {
        message: format!(
            "Territory '{}' assigned to {}",
            territory.name, result.request.user_name
        ),
        request: request_info(&result.request)?,
        territory,
    })
}

/// Declines a pending request. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the request does not exist,
/// or it was already resolved.
pub fn reject_request(
    persistence: &mut Persistence,
    request_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<RequestResponse, ApiError> {
    require_admin(actor, "reject_request")?;

    let audit_actor: Actor = actor.to_audit_actor();
    let result: RequestResult = persistence
        .update_request(request_id, now, |req| {
            reject_request_cmd(req, audit_actor, cause)
        })
        .map_err(translate_persistence_error)?;

    Ok(RequestResponse {
        request: request_info(&result.request)?,
        message: String::from("Request rejected"),
    })
}

// ========================================================================
// Publisher
// ========================================================================

/// Returns the caller's active territory and request state.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn publisher_overview(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<PublisherOverviewResponse, ApiError> {
    let active_territory: Option<TerritoryInfo> = persistence
        .find_active_territory_for_user(actor.user_id)
        .map_err(translate_persistence_error)?
        .map(|t| territory_info(actor, &t, now, policy))
        .transpose()?;

    let has_pending_request: bool = persistence
        .has_pending_request(actor.user_id)
        .map_err(translate_persistence_error)?;
    let unread_notifications: i64 = persistence
        .count_unread_notifications(actor.user_id)
        .map_err(translate_persistence_error)?;

    Ok(PublisherOverviewResponse {
        active_territory,
        has_pending_request,
        unread_notifications,
    })
}

/// Reports the caller's territory as worked.
///
/// The territory gains a history entry and returns to the available pool,
/// where triage keeps it behind others until its rest period has passed.
///
/// # Errors
///
/// Returns an error if the territory does not exist, is not in use, or is
/// assigned to someone else, or if the notes are too long.
pub fn submit_report(
    persistence: &mut Persistence,
    territory_id: i64,
    request: &SubmitReportRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Result<TerritoryResponse, ApiError> {
    let audit_actor: Actor = actor.to_audit_actor();
    let result: TransitionResult = persistence
        .apply_territory_transition(territory_id, now, |territory| {
            apply(
                territory,
                Command::SubmitReport {
                    user_id: actor.user_id,
                    user_name: actor.display_name.clone(),
                    notes: request.notes.clone(),
                },
                audit_actor,
                cause,
                now,
            )
        })
        .map_err(translate_persistence_error)?;

    let territory: TerritoryInfo = territory_info(actor, &result.new_territory, now, policy)?;
    Ok(TerritoryResponse {
        message: format!("Thank you! Territory '{}' was reported as worked", territory.name),
        territory,
    })
}

// ========================================================================
// Users
// ========================================================================

/// Lists every account. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_users(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    require_admin(actor, "list_users")?;

    let users: Vec<UserInfo> = persistence
        .list_users()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|u| UserInfo {
            capabilities: compute_user_capabilities(actor, &u),
            user_id: u.user_id,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
            created_at: u.created_at,
            last_login_at: u.last_login_at,
        })
        .collect();

    Ok(ListUsersResponse { users })
}

/// Changes another account's role. Admin only.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The actor targets their own account
/// - The role is not recognized
/// - The account does not exist
pub fn update_user_role(
    persistence: &mut Persistence,
    user_id: i64,
    request: &UpdateUserRoleRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<UpdateUserRoleResponse, ApiError> {
    require_admin(actor, "update_user_role")?;

    if user_id == actor.user_id {
        return Err(translate_domain_error(DomainError::CannotChangeOwnRole));
    }

    let role: Role = Role::from_str(request.role.trim()).map_err(translate_domain_error)?;

    let target: UserData = persistence
        .get_user_by_id(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::UserNotFound(user_id)))?;

    let audit_event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("UpdateUserRole"),
            Some(format!(
                "Changed role of {} from {} to {role}",
                target.display_name, target.role
            )),
        ),
        StateSnapshot::new(format!("user_id={user_id},role={}", target.role)),
        StateSnapshot::new(format!("user_id={user_id},role={role}")),
    );
    persistence
        .change_user_role(user_id, role, &audit_event, now)
        .map_err(translate_persistence_error)?;

    Ok(UpdateUserRoleResponse {
        user_id,
        role: String::from(role.as_str()),
        message: format!("{} is now {role}", target.display_name),
    })
}

// ========================================================================
// Notifications
// ========================================================================

/// Lists the caller's most recent notifications.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_notifications(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListNotificationsResponse, ApiError> {
    let notifications: Vec<NotificationInfo> = persistence
        .list_notifications(actor.user_id, DEFAULT_NOTIFICATION_LIMIT)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(notification_info)
        .collect();
    let unread_count: i64 = persistence
        .count_unread_notifications(actor.user_id)
        .map_err(translate_persistence_error)?;

    Ok(ListNotificationsResponse {
        notifications,
        unread_count,
    })
}

/// Marks the caller's notifications read. An empty ID list marks all.
///
/// IDs belonging to other accounts are ignored.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_notifications_read(
    persistence: &mut Persistence,
    request: &MarkNotificationsReadRequest,
    actor: &AuthenticatedActor,
) -> Result<MarkNotificationsReadResponse, ApiError> {
    let updated: usize = persistence
        .mark_notifications_read(actor.user_id, &request.ids)
        .map_err(translate_persistence_error)?;
    let unread_count: i64 = persistence
        .count_unread_notifications(actor.user_id)
        .map_err(translate_persistence_error)?;

    Ok(MarkNotificationsReadResponse {
        updated,
        unread_count,
    })
}

// ========================================================================
// Audit
// ========================================================================

/// Lists the most recent audit events. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_audit_events(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    limit: i64,
) -> Result<ListAuditEventsResponse, ApiError> {
    require_admin(actor, "list_audit_events")?;

    let records: Vec<AuditEventRecord> = persistence
        .list_audit_events(limit.clamp(1, 500))
        .map_err(translate_persistence_error)?;

    let events: Vec<AuditEventInfo> = records
        .into_iter()
        .map(|record| -> Result<AuditEventInfo, ApiError> {
            let event: AuditEvent = record.event;
            Ok(AuditEventInfo {
                event_id: persisted_id(event.event_id, "Audit event")?,
                actor_id: event.actor.id,
                actor_type: event.actor.actor_type,
                actor_name: event.actor.display_name,
                cause: event.cause.description,
                action: event.action.name,
                details: event.action.details,
                before: event.before.data,
                after: event.after.data,
                created_at: record.created_at,
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(ListAuditEventsResponse { events })
}
