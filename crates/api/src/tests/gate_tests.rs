// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visitor lifecycle tests driven through the API operations.

use crate::error::ApiError;
use crate::request_response::{
    ClearWalkInRequest, DecideRequest, IssuePassRequest, ValidateCodeRequest, WalkInRequest,
};
use crate::tests::helpers::{
    fresh_db, guard, resident, seed_building, seed_verified_resident,
};
use crate::{
    clear_walk_in, decide, decide_from_callback, issue_pre_approved_pass, list_visitors,
    record_exit, request_walk_in_entry, validate_code,
};
use gatehouse_notify::{DecisionAction, GateDecision};

fn issue_request(building_id: i64) -> IssuePassRequest {
    IssuePassRequest {
        building_id,
        flat: String::from("B-404"),
        guest_name: String::from("Asha Patel"),
        phone: String::from("9123456780"),
        purpose: String::from("Family visit"),
    }
}

fn walk_in_request(building_id: i64, flat: &str) -> WalkInRequest {
    WalkInRequest {
        building_id,
        flat: flat.to_string(),
        guest_name: String::from("Vikram Singh"),
        phone: String::from("9988776655"),
        purpose: String::from("Courier delivery"),
    }
}

#[test]
fn test_pass_issue_then_validate_then_exit() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_verified_resident(&mut db, building_id);

    let pass =
        issue_pre_approved_pass(&mut db, &resident(building_id, profile_id), &issue_request(building_id))
            .unwrap();
    assert_eq!(pass.status, "pending");
    let code = pass.invite_code.clone().unwrap();

    // Gate validates the code
    let entered = validate_code(
        &mut db,
        &guard(building_id),
        &ValidateCodeRequest {
            building_id,
            code: code.clone(),
        },
    )
    .unwrap();
    assert_eq!(entered.status, "entered");
    assert!(entered.check_in_at.is_some());

    // Re-entering the same code finds nothing
    let err = validate_code(
        &mut db,
        &guard(building_id),
        &ValidateCodeRequest { building_id, code },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // Gate records the exit
    let exited = record_exit(&mut db, &guard(building_id), building_id, entered.visitor_id).unwrap();
    assert_eq!(exited.status, "exited");
    assert!(exited.check_out_at.is_some());

    // Exiting twice is a state conflict
    let err = record_exit(&mut db, &guard(building_id), building_id, entered.visitor_id).unwrap_err();
    assert!(matches!(err, ApiError::InvalidState { .. }));
}

#[test]
fn test_only_residents_issue_passes() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_verified_resident(&mut db, building_id);

    let err =
        issue_pre_approved_pass(&mut db, &guard(building_id), &issue_request(building_id)).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_resident_cannot_issue_for_another_flat() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_verified_resident(&mut db, building_id);

    let mut request = issue_request(building_id);
    request.flat = String::from("A-101");

    let err =
        issue_pre_approved_pass(&mut db, &resident(building_id, profile_id), &request).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_malformed_code_is_invalid_input() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);

    let err = validate_code(
        &mut db,
        &guard(building_id),
        &ValidateCodeRequest {
            building_id,
            code: String::from("12ab56"),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_walk_in_requires_verified_resident() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_verified_resident(&mut db, building_id);

    // Unknown flat: refused, no record created
    let err = request_walk_in_entry(
        &mut db,
        &guard(building_id),
        &walk_in_request(building_id, "C-1"),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(
        list_visitors(&mut db, &guard(building_id), building_id)
            .unwrap()
            .is_empty()
    );

    // Verified flat: request lands in waiting_approval with a notification
    let outcome = request_walk_in_entry(
        &mut db,
        &guard(building_id),
        &walk_in_request(building_id, "B-404"),
    )
    .unwrap();
    assert_eq!(outcome.visitor.status, "waiting_approval");
    assert_eq!(outcome.notification.visitor_id, outcome.visitor.visitor_id);
    assert_eq!(outcome.notification.flat, "B-404");
}

#[test]
fn test_walk_in_for_unverified_resident_creates_nothing() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);

    // Registered but never verified
    crate::register_resident(
        &mut db,
        &crate::tests::helpers::admin(building_id),
        &crate::request_response::RegisterResidentRequest {
            building_id,
            flat: String::from("B-404"),
            name: String::from("Ravi Mehta"),
            phone: String::from("9876543210"),
        },
    )
    .unwrap();

    let err = request_walk_in_entry(
        &mut db,
        &guard(building_id),
        &walk_in_request(building_id, "B-404"),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(
        list_visitors(&mut db, &guard(building_id), building_id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_resident_approves_waiting_visitor() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_verified_resident(&mut db, building_id);

    let outcome = request_walk_in_entry(
        &mut db,
        &guard(building_id),
        &walk_in_request(building_id, "B-404"),
    )
    .unwrap();

    let decided = decide(
        &mut db,
        &resident(building_id, profile_id),
        &DecideRequest {
            building_id,
            visitor_id: outcome.visitor.visitor_id,
            approve: true,
        },
    )
    .unwrap();
    assert_eq!(decided.status, "entered");
    assert!(decided.check_in_at.is_some());

    // A second decision is a conflict, not a no-op
    let err = decide(
        &mut db,
        &resident(building_id, profile_id),
        &DecideRequest {
            building_id,
            visitor_id: outcome.visitor.visitor_id,
            approve: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidState { .. }));
}

#[test]
fn test_denial_is_terminal() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_verified_resident(&mut db, building_id);

    let outcome = request_walk_in_entry(
        &mut db,
        &guard(building_id),
        &walk_in_request(building_id, "B-404"),
    )
    .unwrap();

    let denied = decide(
        &mut db,
        &resident(building_id, profile_id),
        &DecideRequest {
            building_id,
            visitor_id: outcome.visitor.visitor_id,
            approve: false,
        },
    )
    .unwrap();
    assert_eq!(denied.status, "rejected");
    assert!(denied.check_in_at.is_none());

    // Rejected visitors never enter or exit
    let err = record_exit(
        &mut db,
        &guard(building_id),
        building_id,
        outcome.visitor.visitor_id,
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidState { .. }));
}

#[test]
fn test_callback_decision_uses_the_same_guard() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_verified_resident(&mut db, building_id);

    let outcome = request_walk_in_entry(
        &mut db,
        &guard(building_id),
        &walk_in_request(building_id, "B-404"),
    )
    .unwrap();

    // Approval arrives through the Telegram callback
    let approved = decide_from_callback(
        &mut db,
        &GateDecision {
            action: DecisionAction::Approve,
            visitor_id: outcome.visitor.visitor_id,
        },
    )
    .unwrap();
    assert_eq!(approved.status, "entered");

    // A repeated tap on the button conflicts
    let err = decide_from_callback(
        &mut db,
        &GateDecision {
            action: DecisionAction::Deny,
            visitor_id: outcome.visitor.visitor_id,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidState { .. }));
}

#[test]
fn test_cleared_walk_in_enters_directly() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_verified_resident(&mut db, building_id);

    let entered = clear_walk_in(
        &mut db,
        &guard(building_id),
        &ClearWalkInRequest {
            building_id,
            flat: String::from("B-404"),
            guest_name: String::from("Vikram Singh"),
            phone: String::from("9988776655"),
            purpose: String::from("Plumbing repair"),
        },
    )
    .unwrap();
    assert_eq!(entered.status, "entered");
    assert!(entered.check_in_at.is_some());
}

#[test]
fn test_code_is_tenant_scoped() {
    let mut db = fresh_db();
    let building_a = seed_building(&mut db);
    let building_b = db
        .create_building("Moonrise Court", "48 Hillside Lane", "2024-06-01T00:00:00Z")
        .unwrap();
    let profile_id = seed_verified_resident(&mut db, building_a);

    let pass =
        issue_pre_approved_pass(&mut db, &resident(building_a, profile_id), &issue_request(building_a))
            .unwrap();

    let err = validate_code(
        &mut db,
        &guard(building_b),
        &ValidateCodeRequest {
            building_id: building_b,
            code: pass.invite_code.unwrap(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[test]
fn test_guard_cannot_act_across_buildings() {
    let mut db = fresh_db();
    let building_a = seed_building(&mut db);
    let building_b = db
        .create_building("Moonrise Court", "48 Hillside Lane", "2024-06-01T00:00:00Z")
        .unwrap();

    let err = validate_code(
        &mut db,
        &guard(building_a),
        &ValidateCodeRequest {
            building_id: building_b,
            code: String::from("123456"),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
}
