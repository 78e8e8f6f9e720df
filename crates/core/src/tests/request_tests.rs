// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{NOW, create_pending_request, create_test_actor, create_test_cause};
use crate::{CoreError, RequestEligibility, RequestResult, open_request, reject_request};
use territory_domain::{DomainError, RequestStatus, TerritoryRequest};

#[test]
fn test_open_request_is_pending() {
    let result: RequestResult = open_request(
        7,
        "Ana",
        &RequestEligibility::default(),
        NOW,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.request.status, RequestStatus::Pending);
    assert_eq!(result.request.user_id, 7);
    assert_eq!(result.request.request_date, NOW);
    assert_eq!(result.audit_event.action.name, "RequestTerritory");
}

#[test]
fn test_duplicate_pending_request_is_rejected() {
    let eligibility: RequestEligibility = RequestEligibility {
        has_pending: true,
        held_territory: None,
    };
    let result: Result<RequestResult, CoreError> = open_request(
        7,
        "Ana",
        &eligibility,
        NOW,
        create_test_actor(),
        create_test_cause(),
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::DuplicatePendingRequest { user_id: 7 })
    );
}

#[test]
fn test_holder_of_territory_cannot_request() {
    let eligibility: RequestEligibility = RequestEligibility {
        has_pending: false,
        held_territory: Some(String::from("T-4")),
    };
    let result: Result<RequestResult, CoreError> = open_request(
        7,
        "Ana",
        &eligibility,
        NOW,
        create_test_actor(),
        create_test_cause(),
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::AlreadyHoldsTerritory {
            user_id: 7,
            territory: String::from("T-4"),
        })
    );
}

#[test]
fn test_reject_marks_request_rejected() {
    let request: TerritoryRequest = create_pending_request(7);

    let result: RequestResult =
        reject_request(&request, create_test_actor(), create_test_cause()).unwrap();

    assert_eq!(result.request.status, RequestStatus::Rejected);
    assert_eq!(result.audit_event.action.name, "RejectRequest");
}

#[test]
fn test_reject_twice_fails() {
    let mut request: TerritoryRequest = create_pending_request(7);
    request.status = RequestStatus::Rejected;

    let result: Result<RequestResult, CoreError> =
        reject_request(&request, create_test_actor(), create_test_cause());

    assert!(result.is_err());
}
