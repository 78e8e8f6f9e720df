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
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod maps;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use territory_api::{
    ApiError, AssignTerritoryRequest, AssignTerritoryResponse, ChangePasswordRequest,
    ChangePasswordResponse, CreateTerritoryRequest, CreateUploadedTerritoryRequest,
    DEFAULT_SESSION_TTL, DeleteTerritoryResponse, ListAuditEventsResponse,
    ListNotificationsResponse, ListRequestsResponse, ListTerritoriesRequest,
    ListTerritoriesResponse, ListUsersResponse, LoginRequest, LoginResponse,
    MarkNotificationsReadRequest, MarkNotificationsReadResponse, PublisherOverviewResponse,
    RequestResponse, SignUpRequest, SignUpResponse, StatisticsResponse, SubmitReportRequest,
    TerritoryHistoryResponse, TerritoryInfo, TerritoryResponse, UpdateTerritoryRequest,
    UpdateUserRoleRequest, UpdateUserRoleResponse, WhoAmIResponse, assign_territory,
    change_password, create_territory, create_uploaded_territory, delete_territory,
    get_statistics, get_territory, get_territory_history, list_audit_events, list_notifications,
    list_pending_requests, list_territories, list_users, login, logout, mark_notifications_read,
    publisher_overview, reclaim_territory, reject_request, request_territory, sign_up,
    submit_report, update_territory, update_user_role, whoami,
};
use territory_audit::Cause;
use territory_domain::{
    AssignmentPolicy, DEFAULT_LOAN_DAYS, DEFAULT_REST_DAYS, validate_map_file_name,
};
use territory_persistence::Persistence;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::maps::{MapStore, content_type};
use crate::session::SessionActor;

/// Default number of audit events returned when no limit is given.
const DEFAULT_AUDIT_LIMIT: i64 = 100;

/// Territory Server - HTTP server for the congregation territory service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "TERRITORY_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "TERRITORY_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, env = "TERRITORY_PORT", default_value_t = 3000)]
    port: u16,

    /// Directory for uploaded map files
    #[arg(long, env = "TERRITORY_MAPS_DIR", default_value = "maps")]
    maps_dir: PathBuf,

    /// Days a publisher may keep a territory
    #[arg(long, env = "TERRITORY_LOAN_DAYS", default_value_t = DEFAULT_LOAN_DAYS)]
    loan_days: u16,

    /// Days a worked territory rests before it is suggested again
    #[arg(long, env = "TERRITORY_REST_DAYS", default_value_t = DEFAULT_REST_DAYS)]
    rest_days: u16,

    /// Session lifetime in hours
    #[arg(
        long,
        env = "TERRITORY_SESSION_HOURS",
        default_value_t = DEFAULT_SESSION_TTL.whole_hours()
    )]
    session_hours: i64,

    /// Largest accepted map upload in mebibytes
    #[arg(long, env = "TERRITORY_MAX_UPLOAD_MB", default_value_t = 20)]
    max_upload_mb: usize,
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind one async mutex; every handler holds it
/// only for the duration of a single service call.
#[derive(Clone)]
struct AppState {
    /// Accounts, territories, requests, notifications, and audit events.
    persistence: Arc<Mutex<Persistence>>,
    /// Live change feed.
    broadcaster: Arc<LiveEventBroadcaster>,
    /// Uploaded map files.
    map_store: Arc<MapStore>,
    /// Loan and rest periods.
    policy: AssignmentPolicy,
    /// How long a new session stays valid.
    session_ttl: Duration,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.broadcaster)
    }
}

// ========================================================================
// Errors
// ========================================================================

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl HttpError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(context: &str, err: &impl std::fmt::Display) -> Self {
        error!(error = %err, context, "Internal server error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{context}: {err}"),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal API error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ========================================================================
// Helpers
// ========================================================================

/// Builds the audit cause for one HTTP request.
fn request_cause(description: &str) -> Cause {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    Cause::new(
        format!("http-{}", now.unix_timestamp_nanos()),
        description.to_string(),
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    limit: Option<i64>,
}

// ========================================================================
// Accounts
// ========================================================================

/// Handler for POST `/auth/signup`.
async fn handle_sign_up(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: SignUpResponse = sign_up(
        &mut persistence,
        &req,
        request_cause("Account sign-up"),
        OffsetDateTime::now_utc(),
    )?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = login(
        &mut persistence,
        &req,
        OffsetDateTime::now_utc(),
        app_state.session_ttl,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, token): SessionActor,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    logout(&mut persistence, &token)?;
    info!(user_id = actor.user_id, "User logged out");
    Ok(Json(MessageResponse {
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/auth/whoami`.
async fn handle_whoami(SessionActor(actor, _): SessionActor) -> Json<WhoAmIResponse> {
    Json(whoami(&actor))
}

/// Handler for POST `/auth/password`.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ChangePasswordResponse = change_password(
        &mut persistence,
        &req,
        &actor,
        request_cause("Password change"),
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

// ========================================================================
// Territories
// ========================================================================

/// Handler for GET `/territories`.
async fn handle_list_territories(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Query(query): Query<ListTerritoriesRequest>,
) -> Result<Json<ListTerritoriesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListTerritoriesResponse = list_territories(
        &mut persistence,
        &query,
        &actor,
        OffsetDateTime::now_utc(),
        &app_state.policy,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/territories`.
async fn handle_create_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateTerritoryRequest>,
) -> Result<(StatusCode, Json<TerritoryResponse>), HttpError> {
    let response: TerritoryResponse = {
        let mut persistence = app_state.persistence.lock().await;
        create_territory(
            &mut persistence,
            &req,
            &actor,
            request_cause("Create territory"),
            OffsetDateTime::now_utc(),
            &app_state.policy,
        )?
    };

    app_state.broadcaster.broadcast(&LiveEvent::TerritoryCreated {
        territory_id: response.territory.territory_id,
    });
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/territories/upload`.
///
/// Expects a multipart body with a `name` text field and a `file` field.
/// The file is written before the territory is stored and removed again if
/// the territory is rejected.
async fn handle_upload_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<TerritoryResponse>), HttpError> {
    if !actor.is_admin() {
        return Err(ApiError::Unauthorized {
            action: String::from("create_territory"),
            required_role: String::from("Admin"),
        }
        .into());
    }

    let mut name: Option<String> = None;
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        let field_name: Option<String> = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => {
                name = Some(field.text().await.map_err(|e| {
                    HttpError::bad_request(format!("Invalid name field: {e}"))
                })?);
            }
            Some("file") => {
                let file_name: String = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| HttpError::bad_request("The file field has no file name"))?;
                let bytes: Bytes = field.bytes().await.map_err(|e| {
                    HttpError::bad_request(format!("Failed to read upload: {e}"))
                })?;
                upload = Some((file_name, bytes));
            }
            _ => {}
        }
    }

    let name: String = name.ok_or_else(|| HttpError::bad_request("Missing 'name' field"))?;
    let (original_file_name, bytes): (String, Bytes) =
        upload.ok_or_else(|| HttpError::bad_request("Missing 'file' field"))?;
    if bytes.is_empty() {
        return Err(HttpError::bad_request("The uploaded file is empty"));
    }
    validate_map_file_name(&original_file_name)
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let stored_file_name: String = app_state
        .map_store
        .save(&original_file_name, &bytes, now)
        .await
        .map_err(|e| HttpError::internal("Failed to store map", &e))?;

    let request: CreateUploadedTerritoryRequest = CreateUploadedTerritoryRequest {
        name,
        original_file_name,
        stored_file_name: stored_file_name.clone(),
    };
    let result: Result<TerritoryResponse, ApiError> = {
        let mut persistence = app_state.persistence.lock().await;
        create_uploaded_territory(
            &mut persistence,
            &request,
            &actor,
            request_cause("Create territory from upload"),
            now,
            &app_state.policy,
        )
    };

    match result {
        Ok(response) => {
            app_state.broadcaster.broadcast(&LiveEvent::TerritoryCreated {
                territory_id: response.territory.territory_id,
            });
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            if let Err(e) = app_state.map_store.remove(&stored_file_name).await {
                warn!(error = %e, file = %stored_file_name, "Failed to remove orphaned upload");
            }
            Err(err.into())
        }
    }
}

/// Handler for GET `/territories/{territory_id}`.
async fn handle_get_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(territory_id): Path<i64>,
) -> Result<Json<TerritoryInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TerritoryInfo = get_territory(
        &mut persistence,
        territory_id,
        &actor,
        OffsetDateTime::now_utc(),
        &app_state.policy,
    )?;
    Ok(Json(response))
}

/// Handler for PATCH `/territories/{territory_id}`.
async fn handle_update_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(territory_id): Path<i64>,
    Json(req): Json<UpdateTerritoryRequest>,
) -> Result<Json<TerritoryResponse>, HttpError> {
    let response: TerritoryResponse = {
        let mut persistence = app_state.persistence.lock().await;
        update_territory(
            &mut persistence,
            territory_id,
            &req,
            &actor,
            request_cause("Update territory"),
            OffsetDateTime::now_utc(),
            &app_state.policy,
        )?
    };

    app_state
        .broadcaster
        .broadcast(&LiveEvent::TerritoryUpdated { territory_id });
    Ok(Json(response))
}

/// Handler for DELETE `/territories/{territory_id}`.
///
/// The stored map file, if any, is removed after the row is gone. A failed
/// file removal is logged and does not fail the request.
async fn handle_delete_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(territory_id): Path<i64>,
) -> Result<Json<DeleteTerritoryResponse>, HttpError> {
    let response: DeleteTerritoryResponse = {
        let mut persistence = app_state.persistence.lock().await;
        delete_territory(
            &mut persistence,
            territory_id,
            &actor,
            request_cause("Delete territory"),
            OffsetDateTime::now_utc(),
        )?
    };

    if let Some(file) = response.stored_map_file.as_deref()
        && let Err(e) = app_state.map_store.remove(file).await
    {
        warn!(error = %e, file, territory_id, "Failed to remove map file");
    }

    app_state
        .broadcaster
        .broadcast(&LiveEvent::TerritoryDeleted { territory_id });
    Ok(Json(response))
}

/// Handler for GET `/territories/{territory_id}/history`.
async fn handle_territory_history(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_actor, _): SessionActor,
    Path(territory_id): Path<i64>,
) -> Result<Json<TerritoryHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TerritoryHistoryResponse = get_territory_history(&mut persistence, territory_id)?;
    Ok(Json(response))
}

/// Handler for POST `/territories/{territory_id}/reclaim`.
async fn handle_reclaim_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(territory_id): Path<i64>,
) -> Result<Json<TerritoryResponse>, HttpError> {
    let response: TerritoryResponse = {
        let mut persistence = app_state.persistence.lock().await;
        reclaim_territory(
            &mut persistence,
            territory_id,
            &actor,
            request_cause("Reclaim territory"),
            OffsetDateTime::now_utc(),
            &app_state.policy,
        )?
    };

    app_state
        .broadcaster
        .broadcast(&LiveEvent::TerritoryReclaimed { territory_id });
    Ok(Json(response))
}

/// Handler for POST `/territories/{territory_id}/report`.
async fn handle_submit_report(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(territory_id): Path<i64>,
    Json(req): Json<SubmitReportRequest>,
) -> Result<Json<TerritoryResponse>, HttpError> {
    let response: TerritoryResponse = {
        let mut persistence = app_state.persistence.lock().await;
        submit_report(
            &mut persistence,
            territory_id,
            &req,
            &actor,
            request_cause("Territory report"),
            OffsetDateTime::now_utc(),
            &app_state.policy,
        )?
    };

    app_state
        .broadcaster
        .broadcast(&LiveEvent::TerritoryReported { territory_id });
    Ok(Json(response))
}

/// Handler for GET `/statistics`.
async fn handle_statistics(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<StatisticsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: StatisticsResponse =
        get_statistics(&mut persistence, &actor, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for GET `/maps/{file_name}`.
///
/// Map files are served without a session so that they can be linked
/// directly.
async fn handle_get_map(
    AxumState(app_state): AxumState<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, HttpError> {
    let bytes: Vec<u8> = app_state
        .map_store
        .read(&file_name)
        .await
        .map_err(|e| HttpError::internal("Failed to read map", &e))?
        .ok_or_else(|| HttpError::not_found(format!("Map '{file_name}' not found")))?;

    Ok(([(header::CONTENT_TYPE, content_type(&file_name))], bytes).into_response())
}

// ========================================================================
// Requests
// ========================================================================

/// Handler for GET `/requests`.
async fn handle_list_requests(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<ListRequestsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListRequestsResponse = list_pending_requests(&mut persistence, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/requests`.
async fn handle_request_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<(StatusCode, Json<RequestResponse>), HttpError> {
    let response: RequestResponse = {
        let mut persistence = app_state.persistence.lock().await;
        request_territory(
            &mut persistence,
            &actor,
            request_cause("Territory request"),
            OffsetDateTime::now_utc(),
        )?
    };

    app_state.broadcaster.broadcast(&LiveEvent::RequestOpened {
        request_id: response.request.request_id,
    });
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/requests/{request_id}/assign`.
async fn handle_assign_territory(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(request_id): Path<i64>,
    Json(req): Json<AssignTerritoryRequest>,
) -> Result<Json<AssignTerritoryResponse>, HttpError> {
    let response: AssignTerritoryResponse = {
        let mut persistence = app_state.persistence.lock().await;
        assign_territory(
            &mut persistence,
            request_id,
            &req,
            &actor,
            request_cause("Assign territory"),
            OffsetDateTime::now_utc(),
            &app_state.policy,
        )?
    };

    app_state.broadcaster.broadcast(&LiveEvent::TerritoryAssigned {
        territory_id: response.territory.territory_id,
        request_id,
    });
    Ok(Json(response))
}

/// Handler for POST `/requests/{request_id}/reject`.
async fn handle_reject_request(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestResponse>, HttpError> {
    let response: RequestResponse = {
        let mut persistence = app_state.persistence.lock().await;
        reject_request(
            &mut persistence,
            request_id,
            &actor,
            request_cause("Reject request"),
            OffsetDateTime::now_utc(),
        )?
    };

    app_state
        .broadcaster
        .broadcast(&LiveEvent::RequestRejected { request_id });
    Ok(Json(response))
}

// ========================================================================
// Publisher, users, notifications, audit
// ========================================================================

/// Handler for GET `/me`.
async fn handle_publisher_overview(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<PublisherOverviewResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: PublisherOverviewResponse = publisher_overview(
        &mut persistence,
        &actor,
        OffsetDateTime::now_utc(),
        &app_state.policy,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/users`.
async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListUsersResponse = list_users(&mut persistence, &actor)?;
    Ok(Json(response))
}

/// Handler for PUT `/users/{user_id}/role`.
async fn handle_update_user_role(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> Result<Json<UpdateUserRoleResponse>, HttpError> {
    let response: UpdateUserRoleResponse = {
        let mut persistence = app_state.persistence.lock().await;
        update_user_role(
            &mut persistence,
            user_id,
            &req,
            &actor,
            request_cause("Change role"),
            OffsetDateTime::now_utc(),
        )?
    };

    app_state
        .broadcaster
        .broadcast(&LiveEvent::UserRoleChanged { user_id });
    Ok(Json(response))
}

/// Handler for GET `/notifications`.
async fn handle_list_notifications(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
) -> Result<Json<ListNotificationsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListNotificationsResponse = list_notifications(&mut persistence, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/notifications/read`.
async fn handle_mark_notifications_read(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<MarkNotificationsReadRequest>,
) -> Result<Json<MarkNotificationsReadResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MarkNotificationsReadResponse =
        mark_notifications_read(&mut persistence, &req, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/audit/events`.
async fn handle_list_audit_events(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ListAuditEventsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListAuditEventsResponse = list_audit_events(
        &mut persistence,
        &actor,
        query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/health`.
async fn handle_health() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: String::from("ok"),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/auth/signup", post(handle_sign_up))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/auth/password", post(handle_change_password))
        .route(
            "/territories",
            get(handle_list_territories).post(handle_create_territory),
        )
        .route(
            "/territories/upload",
            post(handle_upload_territory).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/territories/{territory_id}",
            get(handle_get_territory)
                .patch(handle_update_territory)
                .delete(handle_delete_territory),
        )
        .route(
            "/territories/{territory_id}/history",
            get(handle_territory_history),
        )
        .route(
            "/territories/{territory_id}/reclaim",
            post(handle_reclaim_territory),
        )
        .route(
            "/territories/{territory_id}/report",
            post(handle_submit_report),
        )
        .route("/statistics", get(handle_statistics))
        .route(
            "/requests",
            get(handle_list_requests).post(handle_request_territory),
        )
        .route("/requests/{request_id}/assign", post(handle_assign_territory))
        .route("/requests/{request_id}/reject", post(handle_reject_request))
        .route("/me", get(handle_publisher_overview))
        .route("/users", get(handle_list_users))
        .route("/users/{user_id}/role", put(handle_update_user_role))
        .route("/notifications", get(handle_list_notifications))
        .route("/notifications/read", post(handle_mark_notifications_read))
        .route("/audit/events", get(handle_list_audit_events))
        .route("/maps/{file_name}", get(handle_get_map))
        .route("/live", get(live_events_handler))
        .route("/health", get(handle_health))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing territory server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    persistence.verify_foreign_key_enforcement()?;

    let removed: usize = persistence.delete_expired_sessions(OffsetDateTime::now_utc())?;
    if removed > 0 {
        info!(removed, "Deleted expired sessions");
    }

    let map_store: MapStore = MapStore::new(args.maps_dir.clone());
    map_store.ensure_dir().await?;
    info!(maps_dir = %map_store.root().display(), "Map store ready");

    let policy: AssignmentPolicy = AssignmentPolicy::new(args.loan_days, args.rest_days);
    info!(
        loan_days = policy.loan_days,
        rest_days = policy.rest_days,
        session_hours = args.session_hours,
        "Assignment policy"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        map_store: Arc::new(map_store),
        policy,
        session_ttl: Duration::hours(args.session_hours),
    };

    let app: Router = build_router(app_state, args.max_upload_mb.saturating_mul(1024 * 1024));

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
