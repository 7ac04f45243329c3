// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::PersistenceError;
use crate::tests::helpers::{
    NOW, fresh_db, pending_visitor, seed_building, seed_profile, waiting_visitor,
};
use gatehouse_domain::VisitorStatus;

const LATER: &str = "2024-06-01T12:00:00Z";

#[test]
fn test_insert_and_fetch_visitor() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    let stored = db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap();
    let visitor_id = stored.visitor_id.unwrap();

    let fetched = db.get_visitor(building_id, visitor_id).unwrap().unwrap();
    assert_eq!(fetched.status, VisitorStatus::Pending);
    assert_eq!(fetched.invite_code.unwrap().value(), "483920");
    assert_eq!(fetched.flat.to_string(), "B-404");
}

#[test]
fn test_claim_code_is_single_use() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap();

    // First validation succeeds and stamps check-in
    let entered = db.claim_pending_by_code(building_id, "483920", LATER).unwrap();
    assert_eq!(entered.status, VisitorStatus::Entered);
    assert_eq!(entered.check_in_at, Some(LATER.to_string()));

    // Second validation with the same code finds nothing
    let err = db.claim_pending_by_code(building_id, "483920", LATER).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_claim_unknown_code_is_not_found() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);

    let err = db.claim_pending_by_code(building_id, "111111", LATER).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_code_does_not_cross_tenants() {
    let mut db = fresh_db();
    let building_a = seed_building(&mut db);
    let building_b = db
        .create_building("Moonrise Court", "48 Hillside Lane", NOW)
        .unwrap();
    seed_profile(&mut db, building_a);

    db.insert_visitor(&pending_visitor(building_a, "483920")).unwrap();

    // A code issued in building A must not validate in building B
    let err = db.claim_pending_by_code(building_b, "483920", LATER).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));

    // It still validates where it was issued
    assert!(db.claim_pending_by_code(building_a, "483920", LATER).is_ok());
}

#[test]
fn test_duplicate_pending_code_is_typed_for_retry() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap();

    let err = db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap_err();
    assert_eq!(err, PersistenceError::DuplicateInviteCode);
}

#[test]
fn test_used_code_can_be_reissued() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap();
    db.claim_pending_by_code(building_id, "483920", LATER).unwrap();

    // The partial index only covers pending passes, so a consumed code
    // may be issued again later
    assert!(db.insert_visitor(&pending_visitor(building_id, "483920")).is_ok());
}

#[test]
fn test_same_code_allowed_across_tenants() {
    let mut db = fresh_db();
    let building_a = seed_building(&mut db);
    let building_b = db
        .create_building("Moonrise Court", "48 Hillside Lane", NOW)
        .unwrap();

    db.insert_visitor(&pending_visitor(building_a, "483920")).unwrap();
    assert!(db.insert_visitor(&pending_visitor(building_b, "483920")).is_ok());
}

#[test]
fn test_guarded_transition_applies_once() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    let stored = db.insert_visitor(&waiting_visitor(building_id)).unwrap();
    let visitor_id = stored.visitor_id.unwrap();

    // Resident approves
    let entered = db
        .transition_visitor(
            building_id,
            visitor_id,
            VisitorStatus::WaitingApproval,
            VisitorStatus::Entered,
            LATER,
        )
        .unwrap();
    assert_eq!(entered.status, VisitorStatus::Entered);
    assert_eq!(entered.check_in_at, Some(LATER.to_string()));

    // A raced second decision observes the conflict
    let err = db
        .transition_visitor(
            building_id,
            visitor_id,
            VisitorStatus::WaitingApproval,
            VisitorStatus::Rejected,
            LATER,
        )
        .unwrap_err();
    match err {
        PersistenceError::TransitionConflict { expected, actual, .. } => {
            assert_eq!(expected, "waiting_approval");
            assert_eq!(actual, "entered");
        }
        other => panic!("Expected TransitionConflict, got {other:?}"),
    }
}

#[test]
fn test_transition_missing_visitor_is_not_found() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);

    let err = db
        .transition_visitor(
            building_id,
            999,
            VisitorStatus::Entered,
            VisitorStatus::Exited,
            LATER,
        )
        .unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_exit_stamps_check_out() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap();
    let entered = db.claim_pending_by_code(building_id, "483920", LATER).unwrap();
    let visitor_id = entered.visitor_id.unwrap();

    let exited = db
        .transition_visitor(
            building_id,
            visitor_id,
            VisitorStatus::Entered,
            VisitorStatus::Exited,
            "2024-06-01T18:00:00Z",
        )
        .unwrap();
    assert_eq!(exited.status, VisitorStatus::Exited);
    assert_eq!(exited.check_in_at, Some(LATER.to_string()));
    assert_eq!(exited.check_out_at, Some("2024-06-01T18:00:00Z".to_string()));
}

#[test]
fn test_list_visitors_for_flat_is_scoped() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    db.insert_visitor(&pending_visitor(building_id, "483920")).unwrap();
    db.insert_visitor(&waiting_visitor(building_id)).unwrap();

    let flat = gatehouse_domain::Flat::new("B", 404).unwrap();
    let visitors = db.list_visitors_for_flat(building_id, &flat).unwrap();
    assert_eq!(visitors.len(), 2);

    let other_flat = gatehouse_domain::Flat::new("A", 101).unwrap();
    let none = db.list_visitors_for_flat(building_id, &other_flat).unwrap();
    assert!(none.is_empty());
}
