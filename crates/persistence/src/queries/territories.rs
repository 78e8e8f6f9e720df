// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Territory and history queries.

use std::collections::HashMap;
use std::str::FromStr;

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_domain::{Assignment, HistoryEntry, MapLocation, Territory, TerritoryStatus};
use tracing::debug;

use crate::diesel_schema::{territories, territory_history};
use crate::error::PersistenceError;
use crate::timestamp;

/// Diesel Queryable struct for territory rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = territories)]
pub(crate) struct TerritoryRow {
    territory_id: i64,
    name: String,
    status: String,
    map_url: String,
    map_file: Option<String>,
    permanent_notes: String,
    created_at: String,
    assigned_to: Option<i64>,
    assigned_to_name: Option<String>,
    assignment_date: Option<String>,
    due_date: Option<String>,
}

/// Diesel Queryable struct for history rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = territory_history)]
pub(crate) struct HistoryRow {
    territory_id: i64,
    user_id: i64,
    user_name: String,
    assignment_date: Option<String>,
    completed_date: String,
    notes: Option<String>,
}

fn history_entry(row: HistoryRow) -> Result<HistoryEntry, PersistenceError> {
    Ok(HistoryEntry {
        user_id: row.user_id,
        user_name: row.user_name,
        assignment_date: timestamp::decode_opt(row.assignment_date.as_deref())?,
        completed_date: timestamp::decode(&row.completed_date)?,
        notes: row.notes,
    })
}

fn assignment(row: &TerritoryRow) -> Result<Option<Assignment>, PersistenceError> {
    let Some(user_id) = row.assigned_to else {
        return Ok(None);
    };

    match (&row.assigned_to_name, &row.assignment_date, &row.due_date) {
        (Some(user_name), Some(assignment_date), Some(due_date)) => Ok(Some(Assignment {
            user_id,
            user_name: user_name.clone(),
            assignment_date: timestamp::decode(assignment_date)?,
            due_date: timestamp::decode(due_date)?,
        })),
        _ => Err(PersistenceError::CorruptRow(format!(
            "territory {} has an assignee but incomplete assignment columns",
            row.territory_id
        ))),
    }
}

/// Builds a domain territory from its row and its history rows.
///
/// History rows must already be in insertion order.
pub(crate) fn territory_from_rows(
    row: TerritoryRow,
    history: Vec<HistoryRow>,
) -> Result<Territory, PersistenceError> {
    let status: TerritoryStatus = TerritoryStatus::from_str(&row.status)
        .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;
    let assignment: Option<Assignment> = assignment(&row)?;

    if (status == TerritoryStatus::InUse) != assignment.is_some() {
        return Err(PersistenceError::CorruptRow(format!(
            "territory {} is {status} but assignment presence disagrees",
            row.territory_id
        )));
    }

    let map: MapLocation = match row.map_file {
        Some(file_name) => MapLocation::Stored { file_name },
        None => MapLocation::Link(row.map_url),
    };

    let history: Vec<HistoryEntry> = history
        .into_iter()
        .map(history_entry)
        .collect::<Result<_, _>>()?;

    Ok(Territory {
        territory_id: Some(row.territory_id),
        name: row.name,
        status,
        map,
        permanent_notes: row.permanent_notes,
        created_at: timestamp::decode(&row.created_at)?,
        assignment,
        history,
    })
}

/// Retrieves a territory with its full history.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
/// Returns `Ok(None)` if the territory does not exist.
pub fn get_territory(
    conn: &mut SqliteConnection,
    territory_id: i64,
) -> Result<Option<Territory>, PersistenceError> {
    debug!(territory_id, "Loading territory");

    let row: Option<TerritoryRow> = territories::table
        .filter(territories::territory_id.eq(territory_id))
        .select(TerritoryRow::as_select())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let history: Vec<HistoryRow> = territory_history::table
        .filter(territory_history::territory_id.eq(territory_id))
        .order(territory_history::history_id.asc())
        .select(HistoryRow::as_select())
        .load(conn)?;

    territory_from_rows(row, history).map(Some)
}

/// Loads every territory with its history, ordered by ID.
///
/// History is loaded in one query and grouped in memory.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_territories(conn: &mut SqliteConnection) -> Result<Vec<Territory>, PersistenceError> {
    let rows: Vec<TerritoryRow> = territories::table
        .order(territories::territory_id.asc())
        .select(TerritoryRow::as_select())
        .load(conn)?;

    let history_rows: Vec<HistoryRow> = territory_history::table
        .order(territory_history::history_id.asc())
        .select(HistoryRow::as_select())
        .load(conn)?;

    let mut by_territory: HashMap<i64, Vec<HistoryRow>> = HashMap::new();
    for h in history_rows {
        by_territory.entry(h.territory_id).or_default().push(h);
    }

    debug!(count = rows.len(), "Loaded territories");

    rows.into_iter()
        .map(|row| {
            let history: Vec<HistoryRow> =
                by_territory.remove(&row.territory_id).unwrap_or_default();
            territory_from_rows(row, history)
        })
        .collect()
}

/// Finds the territory currently assigned to a user, if any.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn find_active_territory_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<Territory>, PersistenceError> {
    let territory_id: Option<i64> = territories::table
        .filter(territories::status.eq(TerritoryStatus::InUse.as_str()))
        .filter(territories::assigned_to.eq(user_id))
        .order(territories::assignment_date.desc())
        .select(territories::territory_id)
        .first(conn)
        .optional()?;

    match territory_id {
        Some(id) => get_territory(conn, id),
        None => Ok(None),
    }
}

/// Returns the number of history rows stored for a territory.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_history(
    conn: &mut SqliteConnection,
    territory_id: i64,
) -> Result<usize, PersistenceError> {
    let count: i64 = territory_history::table
        .filter(territory_history::territory_id.eq(territory_id))
        .count()
        .get_result(conn)?;
    usize::try_from(count).map_err(|e| PersistenceError::CorruptRow(e.to_string()))
}
