// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::triage::compare_names;
use crate::types::{Territory, TerritoryStatus};
use time::OffsetDateTime;

/// Number of entries reported in the longest-inactive list.
pub const LONGEST_INACTIVE_LIMIT: usize = 3;

/// A territory that has gone a long time without being worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactiveTerritory {
    pub territory_id: i64,
    pub name: String,
    pub status: TerritoryStatus,
    /// Latest completion date, or creation date when never worked.
    pub last_activity: OffsetDateTime,
    /// Whole days since `last_activity`.
    pub days_inactive: i64,
}

/// Summary counts for the administrator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerritoryStatistics {
    pub total: usize,
    pub available: usize,
    pub in_use: usize,
    pub closed: usize,
    /// Up to three available or closed territories, longest inactive first.
    pub longest_inactive: Vec<InactiveTerritory>,
}

/// Computes dashboard statistics over every territory.
///
/// In-use territories count toward the totals but never appear in
/// `longest_inactive`. Ties on inactivity break by natural name order.
#[must_use]
pub fn compute_statistics(territories: &[Territory], now: OffsetDateTime) -> TerritoryStatistics {
    let mut stats: TerritoryStatistics = TerritoryStatistics {
        total: territories.len(),
        ..TerritoryStatistics::default()
    };

    for territory in territories {
        match territory.status {
            TerritoryStatus::Available => stats.available += 1,
            TerritoryStatus::InUse => stats.in_use += 1,
            TerritoryStatus::Closed => stats.closed += 1,
        }
    }

    let mut idle: Vec<InactiveTerritory> = territories
        .iter()
        .filter(|t| t.status != TerritoryStatus::InUse)
        .map(|t| {
            let last_activity: OffsetDateTime = t.last_activity();
            InactiveTerritory {
                territory_id: t.id_or_default(),
                name: t.name.clone(),
                status: t.status,
                last_activity,
                days_inactive: (now - last_activity).whole_days(),
            }
        })
        .collect();

    idle.sort_by(|a, b| {
        a.last_activity
            .cmp(&b.last_activity)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    idle.truncate(LONGEST_INACTIVE_LIMIT);

    stats.longest_inactive = idle;
    stats
}
