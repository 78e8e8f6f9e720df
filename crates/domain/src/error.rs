// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::TerritoryStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Territory name is empty or invalid.
    InvalidTerritoryName(String),
    /// Map link or map file name is invalid.
    InvalidMap(String),
    /// Free-text notes are invalid.
    InvalidNotes(String),
    /// User display name is invalid.
    InvalidDisplayName(String),
    /// Email address is invalid.
    InvalidEmail(String),
    /// Territory status string is not recognized.
    InvalidTerritoryStatus(String),
    /// Role string is not recognized.
    InvalidRole(String),
    /// Request status string is not recognized.
    InvalidRequestStatus(String),
    /// Notification kind string is not recognized.
    InvalidNotificationKind(String),
    /// The territory does not exist.
    TerritoryNotFound(i64),
    /// The request does not exist.
    RequestNotFound(i64),
    /// The user does not exist.
    UserNotFound(i64),
    /// The territory is in a status that does not permit the operation.
    TerritoryStatusConflict {
        /// The territory name.
        territory: String,
        /// The current status.
        status: TerritoryStatus,
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// The territory is not assigned to the acting user.
    TerritoryNotAssignedToUser {
        /// The territory name.
        territory: String,
        /// The user who attempted the operation.
        user_id: i64,
    },
    /// The request has already been approved or rejected.
    RequestNotPending {
        /// The request identifier.
        request_id: i64,
    },
    /// The user already has a pending request.
    DuplicatePendingRequest {
        /// The requesting user.
        user_id: i64,
    },
    /// The user is still working a territory.
    AlreadyHoldsTerritory {
        /// The requesting user.
        user_id: i64,
        /// The territory the user holds.
        territory: String,
    },
    /// The email address is already registered.
    DuplicateEmail(String),
    /// Administrators may not change their own role.
    CannotChangeOwnRole,
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTerritoryName(msg) => write!(f, "Invalid territory name: {msg}"),
            Self::InvalidMap(msg) => write!(f, "Invalid map: {msg}"),
            Self::InvalidNotes(msg) => write!(f, "Invalid notes: {msg}"),
            Self::InvalidDisplayName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidTerritoryStatus(s) => write!(f, "Unknown territory status: {s}"),
            Self::InvalidRole(s) => write!(f, "Unknown role: {s}"),
            Self::InvalidRequestStatus(s) => write!(f, "Unknown request status: {s}"),
            Self::InvalidNotificationKind(s) => write!(f, "Unknown notification kind: {s}"),
            Self::TerritoryNotFound(id) => write!(f, "Territory {id} not found"),
            Self::RequestNotFound(id) => write!(f, "Request {id} not found"),
            Self::UserNotFound(id) => write!(f, "User {id} not found"),
            Self::TerritoryStatusConflict {
                territory,
                status,
                operation,
            } => {
                write!(
                    f,
                    "Cannot {operation} territory '{territory}' while it is {status}"
                )
            }
            Self::TerritoryNotAssignedToUser { territory, user_id } => {
                write!(
                    f,
                    "Territory '{territory}' is not assigned to user {user_id}"
                )
            }
            Self::RequestNotPending { request_id } => {
                write!(f, "Request {request_id} is no longer pending")
            }
            Self::DuplicatePendingRequest { user_id } => {
                write!(f, "User {user_id} already has a pending request")
            }
            Self::AlreadyHoldsTerritory { user_id, territory } => {
                write!(
                    f,
                    "User {user_id} must report territory '{territory}' before requesting another"
                )
            }
            Self::DuplicateEmail(email) => {
                write!(f, "An account with email '{email}' already exists")
            }
            Self::CannotChangeOwnRole => write!(f, "Administrators cannot change their own role"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
