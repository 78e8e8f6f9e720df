// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Triage ordering for the administrator's territory list.
//!
//! Territories are ordered so the best candidates for the next assignment
//! come first. The chain is evaluated in order, each step only breaking ties
//! left by the previous one:
//!
//! 1. Territories in use sort last
//! 2. Territories that have never been worked sort first
//! 3. Territories outside their rest window sort before resting ones
//! 4. Older last completion dates sort first
//! 5. Names compare in natural, numeric-aware order
//!
//! ## Invariants
//!
//! - The ordering is total and deterministic for any input
//! - "Most recent" history means the greatest completion date, regardless of
//!   storage order

use crate::policy::AssignmentPolicy;
use crate::types::{HistoryEntry, Territory, TerritoryStatus};
use std::cmp::Ordering;
use time::OffsetDateTime;

/// Returns the most recent completed work cycle of a territory.
#[must_use]
pub fn last_completed(territory: &Territory) -> Option<&HistoryEntry> {
    territory.last_completed()
}

/// Returns whether a territory was completed within the rest window.
///
/// A territory with no history is never resting.
///
/// # Arguments
///
/// * `territory` - The territory to inspect
/// * `now` - The current time
/// * `policy` - Supplies the rest window length
#[must_use]
pub fn is_resting(territory: &Territory, now: OffsetDateTime, policy: &AssignmentPolicy) -> bool {
    last_completed(territory).is_some_and(|entry| now - entry.completed_date < policy.rest_period())
}

/// Compares two territories by the triage chain.
#[must_use]
pub fn compare_for_triage(
    a: &Territory,
    b: &Territory,
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) -> Ordering {
    let a_in_use: bool = a.status == TerritoryStatus::InUse;
    let b_in_use: bool = b.status == TerritoryStatus::InUse;

    let a_last: Option<OffsetDateTime> = last_completed(a).map(|entry| entry.completed_date);
    let b_last: Option<OffsetDateTime> = last_completed(b).map(|entry| entry.completed_date);

    a_in_use
        .cmp(&b_in_use)
        .then_with(|| a_last.is_some().cmp(&b_last.is_some()))
        .then_with(|| is_resting(a, now, policy).cmp(&is_resting(b, now, policy)))
        .then_with(|| a_last.cmp(&b_last))
        .then_with(|| compare_names(&a.name, &b.name))
}

/// Sorts territories in place by the triage chain.
pub fn sort_for_triage(
    territories: &mut [Territory],
    now: OffsetDateTime,
    policy: &AssignmentPolicy,
) {
    territories.sort_by(|a, b| compare_for_triage(a, b, now, policy));
}

/// A run of either digits or non-digits within a name.
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out: Vec<Chunk<'_>> = Vec::new();
    let mut start: usize = 0;
    let mut in_digits: Option<bool> = None;

    for (idx, ch) in s.char_indices() {
        let is_digit: bool = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                let piece: &str = &s[start..idx];
                out.push(if prev {
                    Chunk::Number(piece)
                } else {
                    Chunk::Text(piece)
                });
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if let Some(prev) = in_digits {
        let piece: &str = &s[start..];
        out.push(if prev {
            Chunk::Number(piece)
        } else {
            Chunk::Text(piece)
        });
    }

    out
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a_trimmed: &str = a.trim_start_matches('0');
    let b_trimmed: &str = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let a_lower = a.chars().flat_map(char::to_lowercase);
    let b_lower = b.chars().flat_map(char::to_lowercase);
    a_lower.cmp(b_lower)
}

/// Compares two names in natural order.
///
/// Digit runs compare by numeric value ("T2" before "T10") and text runs
/// compare case-insensitively. Names that are equal under those rules fall
/// back to plain byte order.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let a_chunks: Vec<Chunk<'_>> = chunks(a);
    let b_chunks: Vec<Chunk<'_>> = chunks(b);

    for (left, right) in a_chunks.iter().zip(b_chunks.iter()) {
        let ord: Ordering = match (left, right) {
            (Chunk::Number(x), Chunk::Number(y)) => compare_numbers(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => compare_text(x, y),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_chunks
        .len()
        .cmp(&b_chunks.len())
        .then_with(|| a.cmp(b))
}
