// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps serialize as RFC 3339 strings.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ========================================================================
// Accounts
// ========================================================================

/// API request to create an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpRequest {
    /// The email address used to log in.
    pub email: String,
    /// Optional display name; the email local part is used when absent.
    #[serde(default)]
    pub display_name: Option<String>,
    /// The new password.
    pub password: String,
    /// The password confirmation.
    pub password_confirmation: String,
}

/// API response for a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    /// `"admin"` for the first account, `"publisher"` afterwards.
    pub role: String,
    pub message: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The opaque session token to send as a bearer token.
    pub session_token: String,
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// API response describing the current account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    /// What the account may do, for UI gating.
    pub capabilities: GlobalCapabilities,
}

/// API request to change the caller's own password.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// API response for a successful password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordResponse {
    /// Sessions that were ended, including the caller's.
    pub sessions_invalidated: usize,
    pub message: String,
}

// ========================================================================
// Territories
// ========================================================================

/// Sort order for the territory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryOrder {
    /// Best candidates for the next assignment first.
    #[default]
    Triage,
    /// Natural name order.
    Name,
}

/// API request to list territories.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ListTerritoriesRequest {
    /// Case-insensitive substring of the territory name.
    #[serde(default)]
    pub search: Option<String>,
    /// Only territories with this status (`available`, `in_use`, `closed`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order: TerritoryOrder,
}

/// The current holder of an in-use territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    pub user_id: i64,
    pub user_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub assignment_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    /// Calendar days until the due date; negative when overdue.
    pub days_remaining: i64,
    /// `overdue`, `due_soon`, `approaching`, or `on_track`.
    pub deadline_status: String,
}

/// Territory summary returned by list and detail calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryInfo {
    pub territory_id: i64,
    pub name: String,
    pub status: String,
    /// Where clients fetch the map.
    pub map_url: String,
    pub permanent_notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub assignment: Option<AssignmentInfo>,
    /// Completion date of the most recent work cycle.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_completed_date: Option<OffsetDateTime>,
    pub history_count: usize,
    /// Whether the territory was completed within the rest window.
    pub is_resting: bool,
    pub capabilities: TerritoryCapabilities,
}

/// API response listing territories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTerritoriesResponse {
    pub territories: Vec<TerritoryInfo>,
}

/// API request to create a territory from an external map link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTerritoryRequest {
    pub name: String,
    pub map_url: String,
}

/// API request to create a territory from an uploaded map file.
///
/// Built by the server once the file has been written to the map store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUploadedTerritoryRequest {
    pub name: String,
    /// The file name the client uploaded.
    pub original_file_name: String,
    /// The name the map store saved it under.
    pub stored_file_name: String,
}

/// API response carrying one territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryResponse {
    pub territory: TerritoryInfo,
    pub message: String,
}

/// API request to edit a territory. Absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UpdateTerritoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permanent_notes: Option<String>,
    /// `available` or `closed`.
    #[serde(default)]
    pub status: Option<String>,
}

/// API response for a deleted territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTerritoryResponse {
    pub territory_id: i64,
    pub name: String,
    /// The stored map file the caller should remove, if any.
    pub stored_map_file: Option<String>,
    pub message: String,
}

/// One completed work cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryInfo {
    pub user_id: i64,
    pub user_name: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub assignment_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_date: OffsetDateTime,
    pub notes: Option<String>,
}

/// API response with a territory's history, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryHistoryResponse {
    pub territory_id: i64,
    pub name: String,
    pub entries: Vec<HistoryEntryInfo>,
}

/// A territory that has gone a long time without being worked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveTerritoryInfo {
    pub territory_id: i64,
    pub name: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
    pub days_inactive: i64,
}

/// API response with dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub total: usize,
    pub available: usize,
    pub in_use: usize,
    pub closed: usize,
    pub pending_requests: usize,
    pub longest_inactive: Vec<InactiveTerritoryInfo>,
}

// ========================================================================
// Requests
// ========================================================================

/// A territory request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub request_id: i64,
    pub user_id: i64,
    pub user_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub request_date: OffsetDateTime,
    pub status: String,
}

/// API response listing pending requests, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequestsResponse {
    pub requests: Vec<RequestInfo>,
}

/// API response for a new or resolved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResponse {
    pub request: RequestInfo,
    pub message: String,
}

/// API request to assign a territory to a pending request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignTerritoryRequest {
    pub territory_id: i64,
}

/// API response for a completed assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignTerritoryResponse {
    pub request: RequestInfo,
    pub territory: TerritoryInfo,
    pub message: String,
}

// ========================================================================
// Publisher
// ========================================================================

/// API response with the caller's own state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherOverviewResponse {
    /// The territory currently assigned to the caller.
    pub active_territory: Option<TerritoryInfo>,
    pub has_pending_request: bool,
    pub unread_notifications: i64,
}

/// API request to report a territory as worked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

// ========================================================================
// Users
// ========================================================================

/// An account as seen by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub capabilities: UserCapabilities,
}

/// API response listing accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

/// API request to change an account's role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRoleRequest {
    /// `admin` or `publisher`.
    pub role: String,
}

/// API response for a role change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRoleResponse {
    pub user_id: i64,
    pub role: String,
    pub message: String,
}

// ========================================================================
// Notifications
// ========================================================================

/// An in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationInfo {
    pub notification_id: i64,
    pub message: String,
    pub kind: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// API response listing the caller's notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNotificationsResponse {
    pub notifications: Vec<NotificationInfo>,
    pub unread_count: i64,
}

/// API request to mark notifications read. An empty list marks all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MarkNotificationsReadRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// API response for marking notifications read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkNotificationsReadResponse {
    pub updated: usize,
    pub unread_count: i64,
}

// ========================================================================
// Audit
// ========================================================================

/// An audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    pub event_id: i64,
    pub actor_id: String,
    pub actor_type: String,
    pub actor_name: Option<String>,
    pub cause: String,
    pub action: String,
    pub details: Option<String>,
    pub before: String,
    pub after: String,
    pub created_at: String,
}

/// API response listing audit events, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAuditEventsResponse {
    pub events: Vec<AuditEventInfo>,
}

// ========================================================================
// Capability Model
// ========================================================================

/// Represents whether a specific action is permitted.
///
/// This enum provides better type safety than raw booleans and serializes
/// to JSON as true/false for API compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b: bool = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// Account-level capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapabilities {
    /// Create, edit, and delete territories.
    pub can_manage_territories: Capability,
    /// Assign territories and reject requests.
    pub can_manage_requests: Capability,
    /// Change other accounts' roles.
    pub can_manage_users: Capability,
    pub can_view_audit: Capability,
    pub can_request_territory: Capability,
}

/// Capabilities on one territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryCapabilities {
    pub can_edit: Capability,
    pub can_delete: Capability,
    pub can_reclaim: Capability,
    /// Whether the caller may report this territory as worked.
    pub can_report: Capability,
}

/// Capabilities on one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCapabilities {
    pub can_change_role: Capability,
}
