// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::str::FromStr;
use territory_audit::Actor;
use territory_domain::{Role, normalize_email};
use territory_persistence::{Persistence, PersistenceError, SessionData, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

/// An authenticated account with its role.
///
/// Built from the stored account on every request, so a role change takes
/// effect on the account's next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The account ID.
    pub user_id: i64,
    /// The normalized email address.
    pub email: String,
    /// The display name.
    pub display_name: String,
    /// The role assigned to this account.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, email: String, display_name: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            display_name,
            role,
        }
    }

    /// Builds an actor from a stored account.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is not recognized.
    pub fn from_user(user: &UserData) -> Result<Self, AuthError> {
        let role: Role =
            Role::from_str(&user.role).map_err(|_| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", user.role),
            })?;
        Ok(Self::new(
            user.user_id,
            user.email.clone(),
            user.display_name.clone(),
            role,
        ))
    }

    /// Returns whether this actor is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the authenticated account.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::for_user(
            String::from(self.role.as_str()),
            self.user_id,
            self.display_name.clone(),
        )
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor is an administrator.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The action being attempted, for the error message
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Publisher => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies credentials and creates a session.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `email` - The email address, in any case
    /// * `password` - The plain-text password
    /// * `now` - The login time
    /// * `session_ttl` - How long the session stays valid
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `expires_at`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong or the session cannot
    /// be stored. Unknown emails and wrong passwords fail identically.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
        now: OffsetDateTime,
        session_ttl: Duration,
    ) -> Result<(String, AuthenticatedActor, OffsetDateTime), AuthError> {
        let normalized: String = normalize_email(email);

        let user: UserData = persistence
            .get_user_by_email(&normalized)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(Self::invalid_credentials)?;

        let valid: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !valid {
            warn!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(Self::invalid_credentials());
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = now + session_ttl;

        persistence
            .create_session(&session_token, user.user_id, now, expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id, now)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, role = %actor.role, "User logged in");
        Ok((session_token, actor, expires_at))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// Expired sessions are deleted on sight.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or if its
    /// account no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = territory_persistence::decode_timestamp(
            &session.expires_at,
        )
        .map_err(Self::map_persistence_error)?;

        if now >= expires_at {
            debug!(session_id = session.session_id, "Session expired");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        persistence
            .update_session_activity(session.session_id, now)
            .map_err(Self::map_persistence_error)?;

        AuthenticatedActor::from_user(&user)
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })
    }

    /// Generates an opaque 256-bit session token.
    fn generate_session_token() -> String {
        format!(
            "{:016x}{:016x}{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>(),
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        }
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
