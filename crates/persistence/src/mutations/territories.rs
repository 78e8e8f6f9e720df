// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Territory row mutations.
//!
//! History is append-only: saving a territory inserts only the entries past
//! the number already stored.

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_domain::{Assignment, HistoryEntry, Territory};
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{territories, territory_history};
use crate::error::PersistenceError;
use crate::queries::territories::count_history;
use crate::timestamp;

fn insert_history(
    conn: &mut SqliteConnection,
    territory_id: i64,
    entries: &[HistoryEntry],
) -> Result<(), PersistenceError> {
    for entry in entries {
        diesel::insert_into(territory_history::table)
            .values((
                territory_history::territory_id.eq(territory_id),
                territory_history::user_id.eq(entry.user_id),
                territory_history::user_name.eq(&entry.user_name),
                territory_history::assignment_date
                    .eq(entry.assignment_date.map(timestamp::encode)),
                territory_history::completed_date.eq(timestamp::encode(entry.completed_date)),
                territory_history::notes.eq(entry.notes.as_deref()),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Inserts a new territory and any history it already carries.
///
/// # Returns
///
/// The territory ID.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_territory(
    conn: &mut SqliteConnection,
    territory: &Territory,
) -> Result<i64, PersistenceError> {
    let assignment: Option<&Assignment> = territory.assignment.as_ref();

    diesel::insert_into(territories::table)
        .values((
            territories::name.eq(&territory.name),
            territories::status.eq(territory.status.as_str()),
            territories::map_url.eq(territory.map.url()),
            territories::map_file.eq(territory.map.stored_file_name()),
            territories::permanent_notes.eq(&territory.permanent_notes),
            territories::created_at.eq(timestamp::encode(territory.created_at)),
            territories::assigned_to.eq(assignment.map(|a| a.user_id)),
            territories::assigned_to_name.eq(assignment.map(|a| a.user_name.as_str())),
            territories::assignment_date
                .eq(assignment.map(|a| timestamp::encode(a.assignment_date))),
            territories::due_date.eq(assignment.map(|a| timestamp::encode(a.due_date))),
        ))
        .execute(conn)?;

    let territory_id: i64 = get_last_insert_rowid(conn)?;
    insert_history(conn, territory_id, &territory.history)?;

    debug!(territory_id, name = %territory.name, "Inserted territory");
    Ok(territory_id)
}

/// Writes every column of an existing territory and appends new history.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the territory has no ID or no row
/// matches, or an error if a write fails.
pub fn save_territory(
    conn: &mut SqliteConnection,
    territory: &Territory,
) -> Result<(), PersistenceError> {
    let Some(territory_id) = territory.territory_id else {
        return Err(PersistenceError::NotFound(String::from(
            "Territory has not been persisted",
        )));
    };
    let assignment: Option<&Assignment> = territory.assignment.as_ref();

    let updated: usize = diesel::update(territories::table.find(territory_id))
        .set((
            territories::name.eq(&territory.name),
            territories::status.eq(territory.status.as_str()),
            territories::map_url.eq(territory.map.url()),
            territories::map_file.eq(territory.map.stored_file_name()),
            territories::permanent_notes.eq(&territory.permanent_notes),
            territories::assigned_to.eq(assignment.map(|a| a.user_id)),
            territories::assigned_to_name.eq(assignment.map(|a| a.user_name.as_str())),
            territories::assignment_date
                .eq(assignment.map(|a| timestamp::encode(a.assignment_date))),
            territories::due_date.eq(assignment.map(|a| timestamp::encode(a.due_date))),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Territory {territory_id}"
        )));
    }

    let stored: usize = count_history(conn, territory_id)?;
    if let Some(new_entries) = territory.history.get(stored..) {
        insert_history(conn, territory_id, new_entries)?;
    }

    Ok(())
}

/// Deletes a territory row; history rows cascade.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no row matches.
pub fn delete_territory_row(
    conn: &mut SqliteConnection,
    territory_id: i64,
) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(territories::table.find(territory_id)).execute(conn)?;
    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Territory {territory_id}"
        )));
    }
    debug!(territory_id, "Deleted territory");
    Ok(())
}
