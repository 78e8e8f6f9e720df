// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions an account is permitted to perform
//! without leaking domain internals. They are advisory only and do not
//! replace backend authorization checks.

use territory_domain::{Role, Territory, TerritoryStatus};
use territory_persistence::UserData;

use crate::auth::AuthenticatedActor;
use crate::request_response::{
    Capability, GlobalCapabilities, TerritoryCapabilities, UserCapabilities,
};

/// Computes account-level capabilities from the actor's role.
#[must_use]
pub fn compute_global_capabilities(actor: &AuthenticatedActor) -> GlobalCapabilities {
    let admin: Capability = Capability::from_bool(actor.role == Role::Admin);
    GlobalCapabilities {
        can_manage_territories: admin,
        can_manage_requests: admin,
        can_manage_users: admin,
        can_view_audit: admin,
        can_request_territory: Capability::Allowed,
    }
}

/// Computes capabilities on one territory.
///
/// Administrators may edit any territory, delete or reclaim it depending on
/// its status. Only the current assignee may report it as worked.
#[must_use]
pub fn compute_territory_capabilities(
    actor: &AuthenticatedActor,
    territory: &Territory,
) -> TerritoryCapabilities {
    let is_admin: bool = actor.role == Role::Admin;
    let in_use: bool = territory.status == TerritoryStatus::InUse;
    let is_assignee: bool = territory
        .assignment
        .as_ref()
        .is_some_and(|a| a.user_id == actor.user_id);

    TerritoryCapabilities {
        can_edit: Capability::from_bool(is_admin),
        can_delete: Capability::from_bool(is_admin && territory.status.is_deletable()),
        can_reclaim: Capability::from_bool(is_admin && in_use),
        can_report: Capability::from_bool(in_use && is_assignee),
    }
}

/// Computes capabilities on one account. Nobody may change their own role.
#[must_use]
pub fn compute_user_capabilities(
    actor: &AuthenticatedActor,
    target: &UserData,
) -> UserCapabilities {
    UserCapabilities {
        can_change_role: Capability::from_bool(
            actor.role == Role::Admin && actor.user_id != target.user_id,
        ),
    }
}
