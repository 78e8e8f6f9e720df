// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_audit::AuditEvent;
use territory_domain::Role;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::UserData;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::queries::users::{count_users, get_user_by_email, get_user_by_id};
use crate::timestamp;

/// Hashes a plain-text password with bcrypt.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PersistenceError> {
    bcrypt::hash(password, cost)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))
}

/// Inserts an account row.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `email` - The normalized email address
/// * `display_name` - The display name
/// * `password_hash` - A bcrypt hash
/// * `role` - The initial role
/// * `now` - The creation time
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    display_name: &str,
    password_hash: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::email.eq(email),
            users::display_name.eq(display_name),
            users::password_hash.eq(password_hash),
            users::role.eq(role.as_str()),
            users::created_at.eq(timestamp::encode(now)),
        ))
        .execute(conn)?;

    let user_id: i64 = get_last_insert_rowid(conn)?;
    info!(user_id, role = %role, "User created successfully");
    Ok(user_id)
}

/// Registers a new account.
///
/// The first account ever registered becomes an administrator; every later
/// one starts as a publisher. The duplicate check, the count, the insert and
/// the audit event built from the stored account share one transaction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `email` - The normalized email address
/// * `display_name` - The resolved display name
/// * `password_hash` - A bcrypt hash
/// * `now` - The registration time
/// * `audit` - Builds the audit event for the new account
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEmail` if the address is taken, or an
/// error if a query fails.
pub fn register_user<F>(
    conn: &mut SqliteConnection,
    email: &str,
    display_name: &str,
    password_hash: &str,
    now: OffsetDateTime,
    audit: F,
) -> Result<UserData, PersistenceError>
where
    F: FnOnce(&UserData) -> AuditEvent,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if get_user_by_email(conn, email)?.is_some() {
            return Err(PersistenceError::DuplicateEmail(email.to_string()));
        }

        let role: Role = if count_users(conn)? == 0 {
            Role::Admin
        } else {
            Role::Publisher
        };

        let user_id: i64 = insert_user(conn, email, display_name, password_hash, role, now)?;
        let user: UserData = get_user_by_id(conn, user_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("User {user_id}")))?;

        persist_audit_event(conn, &audit(&user), now)?;
        Ok(user)
    })
}

/// Changes an account's role.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn update_user_role(
    conn: &mut SqliteConnection,
    user_id: i64,
    role: Role,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(users::table.find(user_id))
        .set(users::role.eq(role.as_str()))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id}")));
    }
    info!(user_id, role = %role, "Updated user role");
    Ok(())
}

/// Replaces an account's password hash.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn update_password(
    conn: &mut SqliteConnection,
    user_id: i64,
    password_hash: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(users::table.find(user_id))
        .set(users::password_hash.eq(password_hash))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id}")));
    }
    info!(user_id, "Updated password");
    Ok(())
}

/// Changes an account's role and records the audit event in the same
/// transaction.
///
/// # Returns
///
/// The audit event ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist, or an
/// error if a write fails. Nothing is committed on error.
pub fn change_user_role(
    conn: &mut SqliteConnection,
    user_id: i64,
    role: Role,
    event: &AuditEvent,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        update_user_role(conn, user_id, role)?;
        persist_audit_event(conn, event, now)
    })
}

/// Replaces an account's password and ends all of its sessions.
///
/// The audit event is built from the number of sessions removed and written
/// in the same transaction.
///
/// # Returns
///
/// The number of sessions removed.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist, or an
/// error if a write fails. Nothing is committed on error.
pub fn change_password<F>(
    conn: &mut SqliteConnection,
    user_id: i64,
    password_hash: &str,
    now: OffsetDateTime,
    audit: F,
) -> Result<usize, PersistenceError>
where
    F: FnOnce(usize) -> AuditEvent,
{
    conn.transaction::<_, PersistenceError, _>(|conn| {
        update_password(conn, user_id, password_hash)?;
        let sessions_invalidated: usize = delete_sessions_for_user(conn, user_id)?;

        persist_audit_event(conn, &audit(sessions_invalidated), now)?;
        info!(user_id, sessions_invalidated, "Password changed");
        Ok(sessions_invalidated)
    })
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    debug!(user_id, "Updating last_login_at");

    diesel::update(users::table.find(user_id))
        .set(users::last_login_at.eq(Some(timestamp::encode(now))))
        .execute(conn)?;

    Ok(())
}

/// Creates a session.
///
/// # Returns
///
/// The session ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    now: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let created: String = timestamp::encode(now);

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(&created),
            sessions::last_activity_at.eq(&created),
            sessions::expires_at.eq(timestamp::encode(expires_at)),
        ))
        .execute(conn)?;

    let session_id: i64 = get_last_insert_rowid(conn)?;
    debug!(session_id, user_id, "Created session");
    Ok(session_id)
}

/// Records activity on a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table.find(session_id))
        .set(sessions::last_activity_at.eq(timestamp::encode(now)))
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;
    Ok(())
}

/// Deletes every session belonging to a user.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<usize, PersistenceError> {
    Ok(diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?)
}

/// Deletes sessions whose expiry is in the past.
///
/// # Returns
///
/// The number of sessions removed.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(
        sessions::table.filter(sessions::expires_at.le(timestamp::encode(now))),
    )
    .execute(conn)?;

    if deleted > 0 {
        info!(deleted, "Removed expired sessions");
    }
    Ok(deleted)
}
