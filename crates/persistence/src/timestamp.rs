// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Text encoding of timestamps.
//!
//! Every timestamp column holds UTC with exactly three fractional digits,
//! so lexical order in SQL matches chronological order.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::PersistenceError;

const STORAGE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Encodes a timestamp for storage.
#[must_use]
pub fn encode(ts: OffsetDateTime) -> String {
    let utc: OffsetDateTime = ts.to_offset(UtcOffset::UTC);
    // Every component the format names is present on an OffsetDateTime.
    utc.format(STORAGE_FORMAT)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Decodes a stored timestamp.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRow` if the text is not in storage format.
pub fn decode(text: &str) -> Result<OffsetDateTime, PersistenceError> {
    PrimitiveDateTime::parse(text, STORAGE_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| PersistenceError::CorruptRow(format!("bad timestamp '{text}': {e}")))
}

/// Decodes an optional stored timestamp.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRow` if the text is present but malformed.
pub fn decode_opt(text: Option<&str>) -> Result<Option<OffsetDateTime>, PersistenceError> {
    text.map(decode).transpose()
}
