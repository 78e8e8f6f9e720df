// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Territory request queries.

use std::str::FromStr;

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_domain::{RequestStatus, TerritoryRequest};

use crate::diesel_schema::territory_requests;
use crate::error::PersistenceError;
use crate::timestamp;

/// Diesel Queryable struct for request rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = territory_requests)]
struct RequestRow {
    request_id: i64,
    user_id: i64,
    user_name: String,
    request_date: String,
    status: String,
}

fn request_from_row(row: RequestRow) -> Result<TerritoryRequest, PersistenceError> {
    Ok(TerritoryRequest {
        request_id: Some(row.request_id),
        user_id: row.user_id,
        user_name: row.user_name,
        request_date: timestamp::decode(&row.request_date)?,
        status: RequestStatus::from_str(&row.status)
            .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?,
    })
}

/// Retrieves a request by ID.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if the request does not exist.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Option<TerritoryRequest>, PersistenceError> {
    territory_requests::table
        .filter(territory_requests::request_id.eq(request_id))
        .select(RequestRow::as_select())
        .first(conn)
        .optional()?
        .map(request_from_row)
        .transpose()
}

/// Lists pending requests, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_pending_requests(
    conn: &mut SqliteConnection,
) -> Result<Vec<TerritoryRequest>, PersistenceError> {
    let rows: Vec<RequestRow> = territory_requests::table
        .filter(territory_requests::status.eq(RequestStatus::Pending.as_str()))
        .order((
            territory_requests::request_date.desc(),
            territory_requests::request_id.desc(),
        ))
        .select(RequestRow::as_select())
        .load(conn)?;

    rows.into_iter().map(request_from_row).collect()
}

/// Returns whether a user has a request awaiting action.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn has_pending_request(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = territory_requests::table
        .filter(territory_requests::user_id.eq(user_id))
        .filter(territory_requests::status.eq(RequestStatus::Pending.as_str()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
