// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the territory service.
//!
//! This crate sits between the HTTP server and the persistence layer. It
//! authenticates sessions, enforces role-based authorization, validates
//! request DTOs, runs the pure transitions from `territory-core`, and maps
//! every failure into a stable [`ApiError`].
//!
//! Handlers are synchronous and take `&mut Persistence`; the server owns the
//! connection and serializes access to it.

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
#![allow(clippy::multiple_crate_versions, clippy::too_many_arguments)]

mod auth;
mod capabilities;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, DEFAULT_SESSION_TTL,
};
pub use capabilities::{
    compute_global_capabilities, compute_territory_capabilities, compute_user_capabilities,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    assign_territory, change_password, create_territory, create_uploaded_territory,
    delete_territory, get_statistics, get_territory, get_territory_history, list_audit_events,
    list_notifications, list_pending_requests, list_territories, list_users, login, logout,
    mark_notifications_read, publisher_overview, reclaim_territory, reject_request,
    request_territory, sign_up, submit_report, update_territory, update_user_role, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AssignTerritoryRequest, AssignTerritoryResponse, AssignmentInfo, AuditEventInfo, Capability,
    ChangePasswordRequest, ChangePasswordResponse, CreateTerritoryRequest,
    CreateUploadedTerritoryRequest, DeleteTerritoryResponse, GlobalCapabilities,
    HistoryEntryInfo, InactiveTerritoryInfo, ListAuditEventsResponse, ListNotificationsResponse,
    ListRequestsResponse, ListTerritoriesRequest, ListTerritoriesResponse, ListUsersResponse,
    LoginRequest, LoginResponse, MarkNotificationsReadRequest, MarkNotificationsReadResponse,
    NotificationInfo, PublisherOverviewResponse, RequestInfo, RequestResponse, SignUpRequest,
    SignUpResponse, StatisticsResponse, SubmitReportRequest, TerritoryCapabilities,
    TerritoryHistoryResponse, TerritoryInfo, TerritoryOrder, TerritoryResponse,
    UpdateTerritoryRequest, UpdateUserRoleRequest, UpdateUserRoleResponse, UserCapabilities,
    UserInfo, WhoAmIResponse,
};
