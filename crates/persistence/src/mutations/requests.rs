// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use territory_domain::TerritoryRequest;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::territory_requests;
use crate::error::PersistenceError;
use crate::timestamp;

/// Inserts a new request row.
///
/// # Returns
///
/// The request ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_request(
    conn: &mut SqliteConnection,
    request: &TerritoryRequest,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(territory_requests::table)
        .values((
            territory_requests::user_id.eq(request.user_id),
            territory_requests::user_name.eq(&request.user_name),
            territory_requests::request_date.eq(timestamp::encode(request.request_date)),
            territory_requests::status.eq(request.status.as_str()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Writes the status of an existing request.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the request has no ID or no row
/// was updated.
pub fn update_request_status(
    conn: &mut SqliteConnection,
    request: &TerritoryRequest,
) -> Result<(), PersistenceError> {
    let Some(request_id) = request.request_id else {
        return Err(PersistenceError::NotFound(String::from(
            "Request has not been persisted",
        )));
    };

    let updated: usize = diesel::update(territory_requests::table.find(request_id))
        .set(territory_requests::status.eq(request.status.as_str()))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Request {request_id}")));
    }
    Ok(())
}
