// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_domain::NewNotification;
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;
use crate::timestamp;

/// Stores an unread notification.
///
/// # Errors
///
/// Returns an error if the insert fails (for example, an unknown recipient).
pub fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &NewNotification,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(notifications::table)
        .values((
            notifications::user_id.eq(notification.user_id),
            notifications::message.eq(&notification.message),
            notifications::kind.eq(notification.kind.as_str()),
            notifications::is_read.eq(0),
            notifications::created_at.eq(timestamp::encode(now)),
        ))
        .execute(conn)?;

    let notification_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        notification_id,
        user_id = notification.user_id,
        "Queued notification"
    );
    Ok(notification_id)
}

/// Marks notifications as read.
///
/// Only notifications owned by `user_id` are touched. An empty `ids` slice
/// marks every unread notification of the user.
///
/// # Returns
///
/// The number of notifications updated.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_notifications_read(
    conn: &mut SqliteConnection,
    user_id: i64,
    ids: &[i64],
) -> Result<usize, PersistenceError> {
    let owned = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::is_read.eq(0));

    let updated: usize = if ids.is_empty() {
        diesel::update(owned)
            .set(notifications::is_read.eq(1))
            .execute(conn)?
    } else {
        diesel::update(owned.filter(notifications::notification_id.eq_any(ids)))
            .set(notifications::is_read.eq(1))
            .execute(conn)?
    };

    debug!(user_id, updated, "Marked notifications read");
    Ok(updated)
}
