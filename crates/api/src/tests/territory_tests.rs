// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use territory_domain::AssignmentPolicy;
use territory_persistence::Persistence;
use time::Duration;

use super::helpers::{
    NOW, create_test_cause, create_test_persistence, seed_accounts, seed_assignment,
    seed_territory,
};
use crate::{
    ApiError, AuthenticatedActor, Capability, CreateTerritoryRequest,
    CreateUploadedTerritoryRequest, DeleteTerritoryResponse, ListTerritoriesRequest,
    ListTerritoriesResponse, StatisticsResponse, SubmitReportRequest, TerritoryHistoryResponse,
    TerritoryInfo, TerritoryOrder, TerritoryResponse, UpdateTerritoryRequest, create_territory,
    create_uploaded_territory, delete_territory, get_statistics, get_territory,
    get_territory_history, list_audit_events, list_territories, reclaim_territory, submit_report,
    update_territory,
};

fn names(response: &ListTerritoriesResponse) -> Vec<&str> {
    response
        .territories
        .iter()
        .map(|t| t.name.as_str())
        .collect()
}

fn list(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListTerritoriesRequest,
) -> Result<ListTerritoriesResponse, ApiError> {
    list_territories(
        persistence,
        request,
        actor,
        NOW,
        &AssignmentPolicy::default(),
    )
}

fn report(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    territory_id: i64,
) -> Result<TerritoryResponse, ApiError> {
    submit_report(
        persistence,
        territory_id,
        &SubmitReportRequest {
            notes: Some(String::from("Two houses asked for a return visit")),
        },
        actor,
        create_test_cause(),
        NOW + Duration::days(10),
        &AssignmentPolicy::default(),
    )
}

#[test]
fn test_publisher_cannot_create_territory() {
    let mut persistence: Persistence = create_test_persistence();
    let (_admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let result: Result<TerritoryResponse, ApiError> = create_territory(
        &mut persistence,
        &CreateTerritoryRequest {
            name: String::from("Centro 1"),
            map_url: String::from("https://maps.example.org/centro-1.pdf"),
        },
        &publisher,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(persistence.list_territories().unwrap().is_empty());
}

#[test]
fn test_create_territory_with_link() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let response: TerritoryResponse = create_territory(
        &mut persistence,
        &CreateTerritoryRequest {
            name: String::from("  Centro 1 "),
            map_url: String::from("https://maps.example.org/centro-1.pdf"),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();

    assert_eq!(response.territory.name, "Centro 1");
    assert_eq!(response.territory.status, "available");
    assert_eq!(
        response.territory.map_url,
        "https://maps.example.org/centro-1.pdf"
    );
    assert!(response.territory.assignment.is_none());
    assert!(!response.territory.is_resting);
    assert_eq!(response.territory.capabilities.can_delete, Capability::Allowed);
}

#[test]
fn test_create_territory_rejects_bad_map_link() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let result: Result<TerritoryResponse, ApiError> = create_territory(
        &mut persistence,
        &CreateTerritoryRequest {
            name: String::from("Centro 1"),
            map_url: String::from("https://maps.example.org/centro 1.pdf"),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "map"
    ));
}

#[test]
fn test_create_uploaded_territory_checks_extension() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let rejected: Result<TerritoryResponse, ApiError> = create_uploaded_territory(
        &mut persistence,
        &CreateUploadedTerritoryRequest {
            name: String::from("Centro 2"),
            original_file_name: String::from("centro-2.exe"),
            stored_file_name: String::from("1772359200000_centro-2.exe"),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    );
    assert!(matches!(
        rejected,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "map"
    ));

    let accepted: TerritoryResponse = create_uploaded_territory(
        &mut persistence,
        &CreateUploadedTerritoryRequest {
            name: String::from("Centro 2"),
            original_file_name: String::from("Centro 2.PDF"),
            stored_file_name: String::from("1772359200000_Centro_2.PDF"),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();
    assert_eq!(
        accepted.territory.map_url,
        "/maps/1772359200000_Centro_2.PDF"
    );
}

#[test]
fn test_list_filters_by_search_and_status() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    seed_territory(&mut persistence, &admin, "Centro 1");
    seed_territory(&mut persistence, &admin, "Centro 2");
    let closed: i64 = seed_territory(&mut persistence, &admin, "Vila Nova");

    update_territory(
        &mut persistence,
        closed,
        &UpdateTerritoryRequest {
            status: Some(String::from("closed")),
            ..UpdateTerritoryRequest::default()
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();

    let by_search: ListTerritoriesResponse = list(
        &mut persistence,
        &admin,
        &ListTerritoriesRequest {
            search: Some(String::from("  cENTRO ")),
            ..ListTerritoriesRequest::default()
        },
    )
    .unwrap();
    assert_eq!(names(&by_search), vec!["Centro 1", "Centro 2"]);

    let by_status: ListTerritoriesResponse = list(
        &mut persistence,
        &admin,
        &ListTerritoriesRequest {
            status: Some(String::from("closed")),
            ..ListTerritoriesRequest::default()
        },
    )
    .unwrap();
    assert_eq!(names(&by_status), vec!["Vila Nova"]);

    let bad_status: Result<ListTerritoriesResponse, ApiError> = list(
        &mut persistence,
        &admin,
        &ListTerritoriesRequest {
            status: Some(String::from("lost")),
            ..ListTerritoriesRequest::default()
        },
    );
    assert!(matches!(
        bad_status,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "status"
    ));
}

#[test]
fn test_list_orders_by_natural_name() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    seed_territory(&mut persistence, &admin, "Quadra 10");
    seed_territory(&mut persistence, &admin, "Quadra 2");
    seed_territory(&mut persistence, &admin, "Quadra 1");

    let response: ListTerritoriesResponse = list(
        &mut persistence,
        &admin,
        &ListTerritoriesRequest {
            order: TerritoryOrder::Name,
            ..ListTerritoriesRequest::default()
        },
    )
    .unwrap();

    assert_eq!(names(&response), vec!["Quadra 1", "Quadra 2", "Quadra 10"]);
}

#[test]
fn test_triage_order_puts_in_use_last() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let busy: i64 = seed_territory(&mut persistence, &admin, "A");
    seed_territory(&mut persistence, &admin, "B");
    seed_territory(&mut persistence, &admin, "C");
    seed_assignment(&mut persistence, &admin, &publisher, busy);

    let response: ListTerritoriesResponse =
        list(&mut persistence, &admin, &ListTerritoriesRequest::default()).unwrap();

    assert_eq!(names(&response), vec!["B", "C", "A"]);
}

#[test]
fn test_update_name_and_status_in_one_change() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");

    let response: TerritoryResponse = update_territory(
        &mut persistence,
        territory_id,
        &UpdateTerritoryRequest {
            name: Some(String::from("Centro Norte")),
            permanent_notes: Some(String::from("Gate code 1234")),
            status: Some(String::from("closed")),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();

    assert_eq!(response.territory.name, "Centro Norte");
    assert_eq!(response.territory.permanent_notes, "Gate code 1234");
    assert_eq!(response.territory.status, "closed");

    let actions: Vec<String> = list_audit_events(&mut persistence, &admin, 50)
        .unwrap()
        .events
        .into_iter()
        .map(|e| e.action)
        .filter(|a| a == "UpdateTerritory" || a == "SetTerritoryStatus")
        .collect();
    assert_eq!(actions, vec![String::from("UpdateTerritory")]);
}

#[test]
fn test_update_rejects_in_use_status_without_partial_write() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");

    let result: Result<TerritoryResponse, ApiError> = update_territory(
        &mut persistence,
        territory_id,
        &UpdateTerritoryRequest {
            name: Some(String::from("Renamed")),
            permanent_notes: None,
            status: Some(String::from("in_use")),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "status"
    ));
    let territory: TerritoryInfo = get_territory(
        &mut persistence,
        territory_id,
        &admin,
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();
    assert_eq!(territory.name, "Centro 1");
}

#[test]
fn test_update_with_nothing_to_change_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");

    let result: Result<TerritoryResponse, ApiError> = update_territory(
        &mut persistence,
        territory_id,
        &UpdateTerritoryRequest::default(),
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_get_missing_territory_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);

    let result: Result<TerritoryInfo, ApiError> =
        get_territory(&mut persistence, 999, &admin, NOW, &AssignmentPolicy::default());

    assert!(matches!(
        result,
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Territory"
    ));
}

#[test]
fn test_delete_in_use_territory_is_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");
    seed_assignment(&mut persistence, &admin, &publisher, territory_id);

    let result: Result<DeleteTerritoryResponse, ApiError> = delete_territory(
        &mut persistence,
        territory_id,
        &admin,
        create_test_cause(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "territory_status"
    ));
}

#[test]
fn test_delete_uploaded_territory_names_stored_file() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, _publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let created: TerritoryResponse = create_uploaded_territory(
        &mut persistence,
        &CreateUploadedTerritoryRequest {
            name: String::from("Centro 2"),
            original_file_name: String::from("centro.png"),
            stored_file_name: String::from("1772359200000_centro.png"),
        },
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();

    let response: DeleteTerritoryResponse = delete_territory(
        &mut persistence,
        created.territory.territory_id,
        &admin,
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(
        response.stored_map_file.as_deref(),
        Some("1772359200000_centro.png")
    );
    assert!(persistence.list_territories().unwrap().is_empty());
}

#[test]
fn test_report_returns_territory_to_pool_and_records_history() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");
    seed_assignment(&mut persistence, &admin, &publisher, territory_id);

    let response: TerritoryResponse = report(&mut persistence, &publisher, territory_id).unwrap();

    assert_eq!(response.territory.status, "available");
    assert!(response.territory.assignment.is_none());
    assert_eq!(response.territory.history_count, 1);
    assert!(response.territory.is_resting);
    assert_eq!(
        response.territory.last_completed_date,
        Some(NOW + Duration::days(10))
    );

    let history: TerritoryHistoryResponse =
        get_territory_history(&mut persistence, territory_id).unwrap();
    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.entries[0].user_name, "Ana");
    assert_eq!(history.entries[0].assignment_date, Some(NOW));
    assert_eq!(
        history.entries[0].notes.as_deref(),
        Some("Two houses asked for a return visit")
    );
}

#[test]
fn test_reported_territory_counts_as_available() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");
    seed_assignment(&mut persistence, &admin, &publisher, territory_id);
    report(&mut persistence, &publisher, territory_id).unwrap();

    let stats: StatisticsResponse =
        get_statistics(&mut persistence, &admin, NOW + Duration::days(10)).unwrap();

    assert_eq!(stats.available, 1);
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.closed, 0);
}

#[test]
fn test_only_the_assignee_can_report() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");
    seed_assignment(&mut persistence, &admin, &publisher, territory_id);

    let result: Result<TerritoryResponse, ApiError> =
        report(&mut persistence, &admin, territory_id);

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "territory_assignee"
    ));
}

#[test]
fn test_history_is_newest_first() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");

    seed_assignment(&mut persistence, &admin, &publisher, territory_id);
    report(&mut persistence, &publisher, territory_id).unwrap();
    seed_assignment(&mut persistence, &admin, &admin, territory_id);
    submit_report(
        &mut persistence,
        territory_id,
        &SubmitReportRequest::default(),
        &admin,
        create_test_cause(),
        NOW + Duration::days(40),
        &AssignmentPolicy::default(),
    )
    .unwrap();

    let history: TerritoryHistoryResponse =
        get_territory_history(&mut persistence, territory_id).unwrap();
    let who: Vec<&str> = history
        .entries
        .iter()
        .map(|e| e.user_name.as_str())
        .collect();
    assert_eq!(who, vec!["Admin", "Ana"]);
    assert!(history.entries[0].notes.is_none());
}

#[test]
fn test_reclaim_returns_territory_to_pool() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let territory_id: i64 = seed_territory(&mut persistence, &admin, "Centro 1");
    seed_assignment(&mut persistence, &admin, &publisher, territory_id);

    let response: TerritoryResponse = reclaim_territory(
        &mut persistence,
        territory_id,
        &admin,
        create_test_cause(),
        NOW,
        &AssignmentPolicy::default(),
    )
    .unwrap();

    assert_eq!(response.territory.status, "available");
    assert!(response.territory.assignment.is_none());
    assert_eq!(response.territory.history_count, 0);
    assert_eq!(persistence.count_unread_notifications(publisher.user_id).unwrap(), 2);
}

#[test]
fn test_statistics_require_admin_and_count_statuses() {
    let mut persistence: Persistence = create_test_persistence();
    let (admin, publisher): (AuthenticatedActor, AuthenticatedActor) =
        seed_accounts(&mut persistence);
    let busy: i64 = seed_territory(&mut persistence, &admin, "Centro 1");
    seed_territory(&mut persistence, &admin, "Centro 2");
    seed_assignment(&mut persistence, &admin, &publisher, busy);

    assert!(matches!(
        get_statistics(&mut persistence, &publisher, NOW),
        Err(ApiError::Unauthorized { .. })
    ));

    let stats: StatisticsResponse = get_statistics(&mut persistence, &admin, NOW).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.available, 1);
    assert_eq!(stats.in_use, 1);
    assert_eq!(stats.closed, 0);
    assert_eq!(stats.pending_requests, 0);
}
