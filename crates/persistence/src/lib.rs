// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the territory service.
//!
//! This crate stores accounts, sessions, territories with their work
//! history, requests, notifications, and audit events in `SQLite` via Diesel.
//!
//! ## Storage
//!
//! - Tests use a uniquely named shared in-memory database per adapter
//! - Deployments use a file-backed database in WAL mode
//! - Foreign key enforcement is verified at startup
//! - Timestamps are stored as fixed-width UTC text so that lexical order is
//!   chronological order
//!
//! ## Transactions
//!
//! Every state change that touches more than one row runs inside a single
//! transaction (see `mutations::transitions`). The pure transition from
//! `territory-core` is evaluated inside that transaction against freshly
//! loaded rows, so a rejected change leaves nothing behind.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use territory_audit::AuditEvent;
use territory_core::{
    AssignmentResult, CoreError, RequestEligibility, RequestResult, TransitionResult,
};
use territory_domain::{Notification, Role, Territory, TerritoryRequest};
use time::OffsetDateTime;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod timestamp;

#[cfg(test)]
mod tests;

pub use data_models::{AuditEventRecord, SessionData, UserData};
pub use error::PersistenceError;
pub use timestamp::{decode as decode_timestamp, encode as encode_timestamp};

/// Number of notifications returned to a user by default.
pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 20;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the territory service.
pub struct Persistence {
    conn: SqliteConnection,
    password_cost: u32,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            password_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError(String::from("Invalid database path"))
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            password_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Sets the bcrypt cost used for new password hashes.
    #[must_use]
    pub const fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Registers an account, hashing the password.
    ///
    /// The first account becomes an administrator. The closure builds the
    /// audit event from the stored account; both are written together.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateEmail` if the email is taken, or an
    /// error if hashing or the insert fails.
    pub fn register_user<F>(
        &mut self,
        email: &str,
        display_name: &str,
        password: &str,
        now: OffsetDateTime,
        audit: F,
    ) -> Result<UserData, PersistenceError>
    where
        F: FnOnce(&UserData) -> AuditEvent,
    {
        let password_hash: String = mutations::users::hash_password(password, self.password_cost)?;
        mutations::users::register_user(
            &mut self.conn,
            email,
            display_name,
            &password_hash,
            now,
            audit,
        )
    }

    /// Retrieves an account by normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_email(&mut self.conn, email)
    }

    /// Retrieves an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Lists every account, ordered by display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Counts all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Changes an account's role and records `event` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the user does not exist, or an
    /// error if a write fails.
    pub fn change_user_role(
        &mut self,
        user_id: i64,
        role: Role,
        event: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::change_user_role(&mut self.conn, user_id, role, event, now)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    /// Replaces an account's password and ends all of its sessions.
    ///
    /// The closure receives the number of sessions removed; its audit event
    /// is written in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or a write fails.
    pub fn change_password<F>(
        &mut self,
        user_id: i64,
        new_password: &str,
        now: OffsetDateTime,
        audit: F,
    ) -> Result<usize, PersistenceError>
    where
        F: FnOnce(usize) -> AuditEvent,
    {
        let password_hash: String =
            mutations::users::hash_password(new_password, self.password_cost)?;
        mutations::users::change_password(&mut self.conn, user_id, &password_hash, now, audit)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(
        &mut self,
        user_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_last_login(&mut self.conn, user_id, now)
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Creates a new session for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        now: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(&mut self.conn, session_token, user_id, now, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Records activity on a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(
        &mut self,
        session_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_session_activity(&mut self.conn, session_id, now)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes every session for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::users::delete_sessions_for_user(&mut self.conn, user_id)
    }

    /// Deletes every session that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Territories
    // ========================================================================

    /// Retrieves a territory with its history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn get_territory(
        &mut self,
        territory_id: i64,
    ) -> Result<Option<Territory>, PersistenceError> {
        queries::territories::get_territory(&mut self.conn, territory_id)
    }

    /// Lists every territory with its history.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_territories(&mut self) -> Result<Vec<Territory>, PersistenceError> {
        queries::territories::list_territories(&mut self.conn)
    }

    /// Finds the territory currently assigned to a user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_active_territory_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Option<Territory>, PersistenceError> {
        queries::territories::find_active_territory_for_user(&mut self.conn, user_id)
    }

    /// Stores a newly created territory and its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails.
    pub fn create_territory(
        &mut self,
        result: TransitionResult,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, PersistenceError> {
        mutations::transitions::create_territory(&mut self.conn, result, now)
    }

    /// Applies a transition to a stored territory in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::TransitionRejected`,
    /// or a database error.
    pub fn apply_territory_transition<F>(
        &mut self,
        territory_id: i64,
        now: OffsetDateTime,
        transition: F,
    ) -> Result<TransitionResult, PersistenceError>
    where
        F: FnOnce(&Territory) -> Result<TransitionResult, CoreError>,
    {
        mutations::transitions::apply_territory_transition(
            &mut self.conn,
            territory_id,
            now,
            transition,
        )
    }

    /// Assigns a territory to a pending request in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::TransitionRejected`,
    /// or a database error.
    pub fn assign_territory_to_request<F>(
        &mut self,
        request_id: i64,
        territory_id: i64,
        now: OffsetDateTime,
        transition: F,
    ) -> Result<AssignmentResult, PersistenceError>
    where
        F: FnOnce(&Territory, &TerritoryRequest) -> Result<AssignmentResult, CoreError>,
    {
        mutations::transitions::assign_territory_to_request(
            &mut self.conn,
            request_id,
            territory_id,
            now,
            transition,
        )
    }

    /// Deletes a territory and its history in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::TransitionRejected`,
    /// or a database error.
    pub fn delete_territory<F>(
        &mut self,
        territory_id: i64,
        now: OffsetDateTime,
        check: F,
    ) -> Result<(Territory, AuditEvent), PersistenceError>
    where
        F: FnOnce(&Territory) -> Result<AuditEvent, CoreError>,
    {
        mutations::transitions::delete_territory(&mut self.conn, territory_id, now, check)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Retrieves a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn get_request(
        &mut self,
        request_id: i64,
    ) -> Result<Option<TerritoryRequest>, PersistenceError> {
        queries::requests::get_request(&mut self.conn, request_id)
    }

    /// Lists pending requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_pending_requests(&mut self) -> Result<Vec<TerritoryRequest>, PersistenceError> {
        queries::requests::list_pending_requests(&mut self.conn)
    }

    /// Returns whether a user has a pending request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn has_pending_request(&mut self, user_id: i64) -> Result<bool, PersistenceError> {
        queries::requests::has_pending_request(&mut self.conn, user_id)
    }

    /// Opens a request; the closure receives the user's held territory and
    /// pending request state, read inside the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::TransitionRejected` or a database error.
    pub fn open_request<F>(
        &mut self,
        user_id: i64,
        now: OffsetDateTime,
        transition: F,
    ) -> Result<RequestResult, PersistenceError>
    where
        F: FnOnce(&RequestEligibility) -> Result<RequestResult, CoreError>,
    {
        mutations::transitions::open_request(&mut self.conn, user_id, now, transition)
    }

    /// Applies a transition to a stored request in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::TransitionRejected`,
    /// or a database error.
    pub fn update_request<F>(
        &mut self,
        request_id: i64,
        now: OffsetDateTime,
        transition: F,
    ) -> Result<RequestResult, PersistenceError>
    where
        F: FnOnce(&TerritoryRequest) -> Result<RequestResult, CoreError>,
    {
        mutations::transitions::update_request(&mut self.conn, request_id, now, transition)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Lists a user's most recent notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_notifications(
        &mut self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Notification>, PersistenceError> {
        queries::notifications::list_notifications(&mut self.conn, user_id, limit)
    }

    /// Counts a user's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_unread_notifications(&mut self, user_id: i64) -> Result<i64, PersistenceError> {
        queries::notifications::count_unread(&mut self.conn, user_id)
    }

    /// Marks notifications read. An empty `ids` marks all of them.
    ///
    /// Notifications owned by other users are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_notifications_read(
        &mut self,
        user_id: i64,
        ids: &[i64],
    ) -> Result<usize, PersistenceError> {
        mutations::notifications::mark_notifications_read(&mut self.conn, user_id, ids)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists a standalone audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails.
    pub fn persist_audit_event(
        &mut self,
        event: &AuditEvent,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event, now)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the event does not exist.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEventRecord, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Lists the most recent audit events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_audit_events(
        &mut self,
        limit: i64,
    ) -> Result<Vec<AuditEventRecord>, PersistenceError> {
        queries::audit::list_audit_events(&mut self.conn, limit)
    }
}
