// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional orchestration.
//!
//! Each function here opens one `SQLite` transaction, loads the rows it
//! needs, hands them to a pure transition supplied by the caller, and writes
//! the outcome together with its notification and audit event. If the
//! transition rejects the change, or any write fails, nothing is committed.

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_audit::AuditEvent;
use territory_core::{
    AssignmentResult, CoreError, RequestEligibility, RequestResult, TransitionResult,
};
use territory_domain::{Territory, TerritoryRequest};
use time::OffsetDateTime;
use tracing::info;

use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::notifications::insert_notification;
use crate::mutations::requests::{insert_request, update_request_status};
use crate::mutations::territories::{delete_territory_row, insert_territory, save_territory};
use crate::queries::requests::{get_request, has_pending_request};
use crate::queries::territories::{find_active_territory_for_user, get_territory};

fn load_territory(
    conn: &mut SqliteConnection,
    territory_id: i64,
) -> Result<Territory, PersistenceError> {
    get_territory(conn, territory_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Territory {territory_id}")))
}

fn load_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<TerritoryRequest, PersistenceError> {
    get_request(conn, request_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Request {request_id}")))
}

/// Inserts a newly created territory with its audit event.
///
/// # Returns
///
/// The result with the territory ID and event ID filled in.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn create_territory(
    conn: &mut SqliteConnection,
    result: TransitionResult,
    now: OffsetDateTime,
) -> Result<TransitionResult, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let mut result: TransitionResult = result;
        let territory_id: i64 = insert_territory(conn, &result.new_territory)?;
        result.new_territory.territory_id = Some(territory_id);

        let event_id: i64 = persist_audit_event(conn, &result.audit_event, now)?;
        result.audit_event = result.audit_event.with_event_id(event_id);

        info!(territory_id, event_id, "Territory created");
        Ok(result)
    })
}

/// Loads a territory, applies a transition, and stores the outcome.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the territory does not exist,
/// `PersistenceError::TransitionRejected` if the transition fails, or an
/// error if any write fails.
pub fn apply_territory_transition<F>(
    conn: &mut SqliteConnection,
    territory_id: i64,
    now: OffsetDateTime,
    transition: F,
) -> Result<TransitionResult, PersistenceError>
where
    F: FnOnce(&Territory) -> Result<TransitionResult, CoreError>,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let territory: Territory = load_territory(conn, territory_id)?;
        let mut result: TransitionResult = transition(&territory)?;

        save_territory(conn, &result.new_territory)?;
        if let Some(notification) = &result.notification {
            insert_notification(conn, notification, now)?;
        }

        let event_id: i64 = persist_audit_event(conn, &result.audit_event, now)?;
        result.audit_event = result.audit_event.with_event_id(event_id);

        info!(
            territory_id,
            event_id,
            action = %result.audit_event.action.name,
            "Territory transition committed"
        );
        Ok(result)
    })
}

/// Assigns a territory in response to a pending request.
///
/// The request and the territory are read inside the same transaction that
/// writes the in-use territory, the approved request, the requester's
/// notification, and the audit event.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the request or territory is
/// missing, `PersistenceError::TransitionRejected` if the assignment is not
/// allowed, or an error if any write fails.
pub fn assign_territory_to_request<F>(
    conn: &mut SqliteConnection,
    request_id: i64,
    territory_id: i64,
    now: OffsetDateTime,
    transition: F,
) -> Result<AssignmentResult, PersistenceError>
where
    F: FnOnce(&Territory, &TerritoryRequest) -> Result<AssignmentResult, CoreError>,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let request: TerritoryRequest = load_request(conn, request_id)?;
        let territory: Territory = load_territory(conn, territory_id)?;

        let mut result: AssignmentResult = transition(&territory, &request)?;

        save_territory(conn, &result.territory)?;
        update_request_status(conn, &result.request)?;
        insert_notification(conn, &result.notification, now)?;

        let event_id: i64 = persist_audit_event(conn, &result.audit_event, now)?;
        result.audit_event = result.audit_event.with_event_id(event_id);

        info!(
            request_id,
            territory_id,
            user_id = result.request.user_id,
            event_id,
            "Territory assigned"
        );
        Ok(result)
    })
}

/// Opens a request after checking what the user already holds or awaits.
///
/// The eligibility checks and the insert share a transaction, so two
/// concurrent requests from one user cannot both succeed.
///
/// # Errors
///
/// Returns `PersistenceError::TransitionRejected` if the transition refuses
/// the request, or an error if any write fails.
pub fn open_request<F>(
    conn: &mut SqliteConnection,
    user_id: i64,
    now: OffsetDateTime,
    transition: F,
) -> Result<RequestResult, PersistenceError>
where
    F: FnOnce(&RequestEligibility) -> Result<RequestResult, CoreError>,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let eligibility: RequestEligibility = RequestEligibility {
            has_pending: has_pending_request(conn, user_id)?,
            held_territory: find_active_territory_for_user(conn, user_id)?
                .map(|territory| territory.name),
        };
        let mut result: RequestResult = transition(&eligibility)?;

        let request_id: i64 = insert_request(conn, &result.request)?;
        result.request.request_id = Some(request_id);

        let event_id: i64 = persist_audit_event(conn, &result.audit_event, now)?;
        result.audit_event = result.audit_event.with_event_id(event_id);

        info!(request_id, user_id, "Territory requested");
        Ok(result)
    })
}

/// Loads a request, applies a transition, and stores the new status.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the request does not exist,
/// `PersistenceError::TransitionRejected` if the transition fails, or an
/// error if any write fails.
pub fn update_request<F>(
    conn: &mut SqliteConnection,
    request_id: i64,
    now: OffsetDateTime,
    transition: F,
) -> Result<RequestResult, PersistenceError>
where
    F: FnOnce(&TerritoryRequest) -> Result<RequestResult, CoreError>,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let request: TerritoryRequest = load_request(conn, request_id)?;
        let mut result: RequestResult = transition(&request)?;

        update_request_status(conn, &result.request)?;

        let event_id: i64 = persist_audit_event(conn, &result.audit_event, now)?;
        result.audit_event = result.audit_event.with_event_id(event_id);

        info!(request_id, status = %result.request.status, "Request updated");
        Ok(result)
    })
}

/// Deletes a territory after the caller's check accepts it.
///
/// # Returns
///
/// The deleted territory (so the caller can clean up its map file) and the
/// persisted audit event.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the territory does not exist,
/// `PersistenceError::TransitionRejected` if the check fails, or an error if
/// any write fails.
pub fn delete_territory<F>(
    conn: &mut SqliteConnection,
    territory_id: i64,
    now: OffsetDateTime,
    check: F,
) -> Result<(Territory, AuditEvent), PersistenceError>
where
    F: FnOnce(&Territory) -> Result<AuditEvent, CoreError>,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let territory: Territory = load_territory(conn, territory_id)?;
        let event: AuditEvent = check(&territory)?;

        delete_territory_row(conn, territory_id)?;
        let event_id: i64 = persist_audit_event(conn, &event, now)?;

        Ok((territory, event.with_event_id(event_id)))
    })
}
