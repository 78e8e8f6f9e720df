// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use territory_domain::TerritoryStatus;

/// A command represents user intent against a single territory, as data only.
///
/// Commands are the only way to request territory state changes.
/// Assignment involves a request as well as a territory and goes through
/// `apply_assignment` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Edit the descriptive fields of a territory.
    UpdateDetails {
        /// The new name, if it changes.
        name: Option<String>,
        /// The new permanent notes, if they change.
        permanent_notes: Option<String>,
    },
    /// Move a territory between `Available` and `Closed`.
    SetStatus {
        /// The target status. `InUse` is only reachable through assignment.
        status: TerritoryStatus,
    },
    /// The assignee reports the territory as completed.
    SubmitReport {
        /// The reporting user.
        user_id: i64,
        /// The reporting user's display name.
        user_name: String,
        /// Optional notes about the work done.
        notes: Option<String>,
    },
    /// An administrator takes an in-use territory back.
    Reclaim,
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::UpdateDetails { .. } => "UpdateTerritory",
            Self::SetStatus { .. } => "SetTerritoryStatus",
            Self::SubmitReport { .. } => "SubmitReport",
            Self::Reclaim => "ReclaimTerritory",
        }
    }
}
