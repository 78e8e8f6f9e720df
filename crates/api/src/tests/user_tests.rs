// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use territory_domain::Role;
use territory_persistence::{Persistence, UserData};

use super::helpers::{NOW, create_test_cause, create_test_persistence, seed_accounts};
use crate::{
    ApiError, AuditEventInfo, AuthenticatedActor, Capability, ListAuditEventsResponse,
    ListUsersResponse, UpdateUserRoleRequest, UpdateUserRoleResponse, UserInfo, list_audit_events,
    list_users, update_user_role,
};

fn change_role(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    role: &str,
) -> Result<UpdateUserRoleResponse, ApiError> {
    update_user_role(
        persistence,
        user_id,
        &UpdateUserRoleRequest {
            role: role.to_string(),
        },
        actor,
        create_test_cause(),
        NOW,
    )
}

#[test]
fn test_list_users_is_admin_only() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    assert!(matches!(
        list_users(&mut persistence, &publisher),
        Err(ApiError::Unauthorized { .. })
    ));

    let response: ListUsersResponse = list_users(&mut persistence, &admin).unwrap();
    assert_eq!(response.users.len(), 2);

    let me: &UserInfo = response
        .users
        .iter()
        .find(|u| u.user_id == admin.user_id)
        .unwrap();
    let other: &UserInfo = response
        .users
        .iter()
        .find(|u| u.user_id == publisher.user_id)
        .unwrap();
    assert_eq!(me.capabilities.can_change_role, Capability::Denied);
    assert_eq!(other.capabilities.can_change_role, Capability::Allowed);
    assert_eq!(other.role, "publisher");
}

#[test]
fn test_admin_promotes_publisher() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let response: UpdateUserRoleResponse =
        change_role(&mut persistence, &admin, publisher.user_id, "Admin").unwrap();

    assert_eq!(response.role, "admin");
    let stored: UserData = persistence
        .get_user_by_id(publisher.user_id)
        .unwrap()
        .unwrap();
    assert_eq!(
        AuthenticatedActor::from_user(&stored).unwrap().role,
        Role::Admin
    );

    let events: ListAuditEventsResponse = list_audit_events(&mut persistence, &admin, 10).unwrap();
    let latest: &AuditEventInfo = &events.events[0];
    assert_eq!(latest.action, "UpdateUserRole");
    assert_eq!(latest.before, format!("user_id={},role=publisher", publisher.user_id));
    assert_eq!(latest.after, format!("user_id={},role=admin", publisher.user_id));
}

#[test]
fn test_admin_cannot_change_own_role() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let result: Result<UpdateUserRoleResponse, ApiError> =
        change_role(&mut persistence, &admin, admin.user_id, "publisher");

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "own_role"
    ));
}

#[test]
fn test_role_change_validation() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    assert!(matches!(
        change_role(&mut persistence, &publisher, admin.user_id, "publisher"),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        change_role(&mut persistence, &admin, publisher.user_id, "elder"),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "role"
    ));
    assert!(matches!(
        change_role(&mut persistence, &admin, 999, "admin"),
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "User"
    ));
}

#[test]
fn test_audit_log_is_admin_only_and_newest_first() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    assert!(matches!(
        list_audit_events(&mut persistence, &publisher, 10),
        Err(ApiError::Unauthorized { .. })
    ));

    let response: ListAuditEventsResponse =
        list_audit_events(&mut persistence, &admin, 10).unwrap();
    let actors: Vec<Option<&str>> = response
        .events
        .iter()
        .map(|e| e.actor_name.as_deref())
        .collect();
    assert_eq!(actors, vec![Some("Ana"), Some("Admin")]);
    assert!(response.events.iter().all(|e| e.action == "SignUp"));
}
