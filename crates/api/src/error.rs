// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use territory_core::CoreError;
use territory_domain::DomainError;
use territory_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidTerritoryName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidMap(msg) => ApiError::InvalidInput {
            field: String::from("map"),
            message: msg,
        },
        DomainError::InvalidNotes(msg) => ApiError::InvalidInput {
            field: String::from("notes"),
            message: msg,
        },
        DomainError::InvalidDisplayName(msg) => ApiError::InvalidInput {
            field: String::from("display_name"),
            message: msg,
        },
        DomainError::InvalidEmail(msg) => ApiError::InvalidInput {
            field: String::from("email"),
            message: msg,
        },
        DomainError::InvalidTerritoryStatus(_) => ApiError::InvalidInput {
            field: String::from("status"),
            message,
        },
        DomainError::InvalidRole(_) => ApiError::InvalidInput {
            field: String::from("role"),
            message,
        },
        DomainError::InvalidRequestStatus(_) | DomainError::InvalidNotificationKind(_) => {
            ApiError::Internal { message }
        }
        DomainError::TerritoryNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Territory"),
            message,
        },
        DomainError::RequestNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Request"),
            message,
        },
        DomainError::UserNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message,
        },
        DomainError::TerritoryStatusConflict { .. } => ApiError::DomainRuleViolation {
            rule: String::from("territory_status"),
            message,
        },
        DomainError::TerritoryNotAssignedToUser { .. } => ApiError::DomainRuleViolation {
            rule: String::from("territory_assignee"),
            message,
        },
        DomainError::RequestNotPending { .. } => ApiError::DomainRuleViolation {
            rule: String::from("request_pending"),
            message,
        },
        DomainError::DuplicatePendingRequest { .. } => ApiError::DomainRuleViolation {
            rule: String::from("single_pending_request"),
            message,
        },
        DomainError::AlreadyHoldsTerritory { .. } => ApiError::DomainRuleViolation {
            rule: String::from("single_active_territory"),
            message,
        },
        DomainError::DuplicateEmail(_) => ApiError::DomainRuleViolation {
            rule: String::from("unique_email"),
            message,
        },
        DomainError::CannotChangeOwnRole => ApiError::DomainRuleViolation {
            rule: String::from("own_role"),
            message,
        },
        DomainError::DateArithmeticOverflow { .. } => ApiError::InvalidInput {
            field: String::from("date"),
            message,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Rule violations detected inside a transaction keep their domain meaning;
/// storage failures become internal errors.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::TransitionRejected(core_err) => translate_core_error(core_err),
        PersistenceError::DuplicateEmail(email) => {
            translate_domain_error(DomainError::DuplicateEmail(email))
        }
        PersistenceError::NotFound(what) => {
            let resource_type: String = what
                .split_whitespace()
                .next()
                .unwrap_or("Resource")
                .to_string();
            ApiError::ResourceNotFound {
                resource_type,
                message: format!("{what} does not exist"),
            }
        }
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
