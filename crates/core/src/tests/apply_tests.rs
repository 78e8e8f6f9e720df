// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    NOW, create_assigned_territory, create_test_actor, create_test_cause, create_test_territory,
};
use crate::{Command, CoreError, TransitionResult, apply, create_territory, delete_territory};
use territory_domain::{DomainError, MapLocation, NotificationKind, Territory, TerritoryStatus};

#[test]
fn test_submit_report_returns_territory_to_pool_with_history() {
    let territory: Territory = create_assigned_territory(7);
    let command: Command = Command::SubmitReport {
        user_id: 7,
        user_name: String::from("Ana"),
        notes: Some(String::from("  Finished the north side  ")),
    };

    let result: TransitionResult = apply(
        &territory,
        command,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    let updated: &Territory = &result.new_territory;
    assert_eq!(updated.status, TerritoryStatus::Available);
    assert!(updated.assignment.is_none());
    assert_eq!(updated.history.len(), 1);
    assert_eq!(updated.history[0].user_id, 7);
    assert_eq!(updated.history[0].completed_date, NOW);
    assert_eq!(
        updated.history[0].assignment_date,
        territory.assignment.map(|a| a.assignment_date)
    );
    assert_eq!(
        updated.history[0].notes.as_deref(),
        Some("Finished the north side")
    );
    assert!(result.notification.is_none());
    assert_eq!(result.audit_event.action.name, "SubmitReport");
}

#[test]
fn test_blank_report_notes_are_dropped() {
    let territory: Territory = create_assigned_territory(7);
    let command: Command = Command::SubmitReport {
        user_id: 7,
        user_name: String::from("Ana"),
        notes: Some(String::from("   ")),
    };

    let result: TransitionResult = apply(
        &territory,
        command,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.new_territory.history[0].notes, None);
}

#[test]
fn test_submit_report_by_other_user_is_rejected() {
    let territory: Territory = create_assigned_territory(7);
    let command: Command = Command::SubmitReport {
        user_id: 8,
        user_name: String::from("Bruno"),
        notes: None,
    };

    let result: Result<TransitionResult, CoreError> = apply(
        &territory,
        command,
        create_test_actor(),
        create_test_cause(),
        NOW,
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::TerritoryNotAssignedToUser {
            territory: String::from("T-12"),
            user_id: 8,
        })
    );
}

#[test]
fn test_submit_report_requires_in_use() {
    let territory: Territory = create_test_territory();
    let command: Command = Command::SubmitReport {
        user_id: 7,
        user_name: String::from("Ana"),
        notes: None,
    };

    let result: Result<TransitionResult, CoreError> = apply(
        &territory,
        command,
        create_test_actor(),
        create_test_cause(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::TerritoryStatusConflict { .. }
        ))
    ));
}

#[test]
fn test_reclaim_frees_territory_and_warns_assignee() {
    let territory: Territory = create_assigned_territory(7);

    let result: TransitionResult = apply(
        &territory,
        Command::Reclaim,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.new_territory.status, TerritoryStatus::Available);
    assert!(result.new_territory.assignment.is_none());
    assert!(result.new_territory.history.is_empty());

    let notification = result.notification.unwrap();
    assert_eq!(notification.user_id, 7);
    assert_eq!(notification.kind, NotificationKind::Warning);
    assert!(notification.message.contains("T-12"));
}

#[test]
fn test_reclaim_requires_in_use() {
    let territory: Territory = create_test_territory();

    let result: Result<TransitionResult, CoreError> = apply(
        &territory,
        Command::Reclaim,
        create_test_actor(),
        create_test_cause(),
        NOW,
    );

    assert!(result.is_err());
}

#[test]
fn test_set_status_moves_between_available_and_closed() {
    let territory: Territory = create_test_territory();

    let result: TransitionResult = apply(
        &territory,
        Command::SetStatus {
            status: TerritoryStatus::Closed,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.new_territory.status, TerritoryStatus::Closed);
    assert_eq!(result.audit_event.action.name, "SetTerritoryStatus");
    assert!(result.audit_event.before.data.contains("status=available"));
    assert!(result.audit_event.after.data.contains("status=closed"));
}

#[test]
fn test_set_status_cannot_target_in_use() {
    let territory: Territory = create_test_territory();

    let result: Result<TransitionResult, CoreError> = apply(
        &territory,
        Command::SetStatus {
            status: TerritoryStatus::InUse,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidTerritoryStatus(_)
        ))
    ));
}

#[test]
fn test_set_status_rejected_while_in_use() {
    let territory: Territory = create_assigned_territory(7);

    let result: Result<TransitionResult, CoreError> = apply(
        &territory,
        Command::SetStatus {
            status: TerritoryStatus::Available,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    );

    assert!(result.is_err());
}

#[test]
fn test_update_details_validates_and_trims() {
    let territory: Territory = create_test_territory();

    let result: TransitionResult = apply(
        &territory,
        Command::UpdateDetails {
            name: Some(String::from("  T-12A ")),
            permanent_notes: Some(String::from("Dog at number 14")),
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.new_territory.name, "T-12A");
    assert_eq!(result.new_territory.permanent_notes, "Dog at number 14");

    let invalid: Result<TransitionResult, CoreError> = apply(
        &territory,
        Command::UpdateDetails {
            name: Some(String::from("  ")),
            permanent_notes: None,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    );
    assert!(invalid.is_err());
}

#[test]
fn test_create_territory_starts_available() {
    let result: TransitionResult = create_territory(
        "T-40",
        MapLocation::Stored {
            file_name: String::from("1700000000000_t40.pdf"),
        },
        NOW,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.new_territory.status, TerritoryStatus::Available);
    assert_eq!(result.new_territory.created_at, NOW);
    assert_eq!(result.audit_event.action.name, "CreateTerritory");
    assert_eq!(result.audit_event.before.data, "territory_does_not_exist");
}

#[test]
fn test_create_territory_rejects_blank_name() {
    let result: Result<TransitionResult, CoreError> = create_territory(
        "",
        MapLocation::Link(String::from("https://example.org/a.pdf")),
        NOW,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(result.is_err());
}

#[test]
fn test_delete_requires_territory_not_in_use() {
    assert!(
        delete_territory(
            &create_test_territory(),
            create_test_actor(),
            create_test_cause()
        )
        .is_ok()
    );
    assert!(
        delete_territory(
            &create_assigned_territory(7),
            create_test_actor(),
            create_test_cause()
        )
        .is_err()
    );
}
