// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_domain::{Notification, NotificationKind};

use crate::diesel_schema::notifications;
use crate::error::PersistenceError;
use crate::timestamp;

/// Diesel Queryable struct for notification rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = notifications)]
struct NotificationRow {
    notification_id: i64,
    user_id: i64,
    message: String,
    kind: String,
    is_read: i32,
    created_at: String,
}

/// Lists a user's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_notifications(
    conn: &mut SqliteConnection,
    user_id: i64,
    limit: i64,
) -> Result<Vec<Notification>, PersistenceError> {
    let rows: Vec<NotificationRow> = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .order((
            notifications::created_at.desc(),
            notifications::notification_id.desc(),
        ))
        .limit(limit)
        .select(NotificationRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            Ok(Notification {
                notification_id: row.notification_id,
                user_id: row.user_id,
                message: row.message,
                kind: NotificationKind::from_str(&row.kind)
                    .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?,
                read: row.is_read != 0,
                created_at: timestamp::decode(&row.created_at)?,
            })
        })
        .collect()
}

/// Counts a user's unread notifications.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_unread(conn: &mut SqliteConnection, user_id: i64) -> Result<i64, PersistenceError> {
    Ok(notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::is_read.eq(0))
        .count()
        .get_result(conn)?)
}
