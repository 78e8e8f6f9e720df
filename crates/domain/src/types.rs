// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The availability state of a territory.
///
/// A territory is `InUse` exactly when it carries an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryStatus {
    /// Not assigned and never closed out (or reopened by an administrator).
    #[default]
    Available,
    /// Assigned to a publisher who is currently working it.
    InUse,
    /// Worked to completion and returned.
    Closed,
}

impl TerritoryStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in_use",
            Self::Closed => "closed",
        }
    }

    /// Returns whether a territory in this status may be handed to a publisher.
    ///
    /// Only `Available` territories are offered; `Closed` is an explicit
    /// administrator hold.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Returns whether a territory in this status may be deleted.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        matches!(self, Self::Available | Self::Closed)
    }
}

impl FromStr for TerritoryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "in_use" => Ok(Self::InUse),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidTerritoryStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TerritoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages territories, requests, and user roles.
    Admin,
    /// Requests and works territories.
    #[default]
    Publisher,
}

impl Role {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Publisher => "publisher",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "publisher" => Ok(Self::Publisher),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The lifecycle state of a territory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting administrator action.
    Pending,
    /// A territory was assigned in response.
    Approved,
    /// Declined by an administrator.
    Rejected,
}

impl RequestStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidRequestStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
}

impl NotificationKind {
    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "success" => Ok(Self::Success),
            _ => Err(DomainError::InvalidNotificationKind(s.to_string())),
        }
    }
}

/// Where a territory's map can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapLocation {
    /// An external link entered by an administrator.
    Link(String),
    /// A file uploaded to the server's map store.
    Stored {
        /// The stored file name, relative to the map store root.
        file_name: String,
    },
}

impl MapLocation {
    /// Returns the URL clients should use to fetch the map.
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Link(url) => url.clone(),
            Self::Stored { file_name } => format!("/maps/{file_name}"),
        }
    }

    /// Returns the stored file name, if the map lives in the map store.
    #[must_use]
    pub fn stored_file_name(&self) -> Option<&str> {
        match self {
            Self::Link(_) => None,
            Self::Stored { file_name } => Some(file_name),
        }
    }
}

/// One completed work cycle on a territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The publisher who worked the territory.
    pub user_id: i64,
    /// The publisher's display name at completion time.
    pub user_name: String,
    /// When the territory was handed out, if known.
    pub assignment_date: Option<OffsetDateTime>,
    /// When the publisher reported the territory as done.
    pub completed_date: OffsetDateTime,
    /// Free-text notes left by the publisher.
    pub notes: Option<String>,
}

/// The current holder of an in-use territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub user_id: i64,
    pub user_name: String,
    pub assignment_date: OffsetDateTime,
    pub due_date: OffsetDateTime,
}

/// A territory and its complete work history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the territory has not been persisted yet.
    pub territory_id: Option<i64>,
    /// Display name, e.g. "T-12".
    pub name: String,
    /// Current status.
    pub status: TerritoryStatus,
    /// Where the map file lives.
    pub map: MapLocation,
    /// Notes that stay with the territory across assignments.
    pub permanent_notes: String,
    /// When the territory was added.
    pub created_at: OffsetDateTime,
    /// The current assignment; present exactly when `status` is `InUse`.
    pub assignment: Option<Assignment>,
    /// Completed work cycles in append order.
    pub history: Vec<HistoryEntry>,
}

impl Territory {
    /// Creates a new, never-worked territory.
    ///
    /// # Arguments
    ///
    /// * `name` - The territory name
    /// * `map` - Where the map can be fetched from
    /// * `created_at` - The creation timestamp
    #[must_use]
    pub fn new(name: &str, map: MapLocation, created_at: OffsetDateTime) -> Self {
        Self {
            territory_id: None,
            name: name.trim().to_string(),
            status: TerritoryStatus::Available,
            map,
            permanent_notes: String::new(),
            created_at,
            assignment: None,
            history: Vec::new(),
        }
    }

    /// Returns the persisted identifier, or 0 for an unsaved territory.
    #[must_use]
    pub fn id_or_default(&self) -> i64 {
        self.territory_id.unwrap_or_default()
    }

    /// Returns the most recent completed work cycle.
    ///
    /// History is stored in append order, but entries may be imported out of
    /// order, so the latest completion date wins.
    #[must_use]
    pub fn last_completed(&self) -> Option<&HistoryEntry> {
        self.history.iter().max_by_key(|entry| entry.completed_date)
    }

    /// Returns the last moment anything happened to this territory.
    ///
    /// This is the latest completion date, or the creation date for a
    /// territory that has never been worked.
    #[must_use]
    pub fn last_activity(&self) -> OffsetDateTime {
        self.last_completed()
            .map_or(self.created_at, |entry| entry.completed_date)
    }

    /// Produces a compact audit representation of this territory.
    #[must_use]
    pub fn snapshot_string(&self) -> String {
        let assignee: String = self
            .assignment
            .as_ref()
            .map_or_else(|| String::from("none"), |a| a.user_id.to_string());
        format!(
            "territory_id={},name={},status={},assigned_to={},history_len={}",
            self.id_or_default(),
            self.name,
            self.status,
            assignee,
            self.history.len()
        )
    }
}

/// A publisher's ask for a territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryRequest {
    /// `None` until persisted.
    pub request_id: Option<i64>,
    pub user_id: i64,
    pub user_name: String,
    pub request_date: OffsetDateTime,
    pub status: RequestStatus,
}

impl TerritoryRequest {
    /// Creates a new pending request.
    #[must_use]
    pub const fn new(user_id: i64, user_name: String, request_date: OffsetDateTime) -> Self {
        Self {
            request_id: None,
            user_id,
            user_name,
            request_date,
            status: RequestStatus::Pending,
        }
    }

    /// Returns whether the request still awaits an administrator.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Produces a compact audit representation of this request.
    #[must_use]
    pub fn snapshot_string(&self) -> String {
        format!(
            "request_id={},user_id={},status={}",
            self.request_id.unwrap_or_default(),
            self.user_id,
            self.status
        )
    }
}

/// A notification that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// The recipient.
    pub user_id: i64,
    pub message: String,
    pub kind: NotificationKind,
}

/// A stored in-app notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: OffsetDateTime,
}
