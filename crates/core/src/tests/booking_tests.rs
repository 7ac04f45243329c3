// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::check_booking;
use crate::error::CoreError;
use gatehouse_domain::{DomainError, OperatingHours, TimeSlot};

fn pool_hours() -> OperatingHours {
    OperatingHours::parse("06:00", "22:00").unwrap()
}

#[test]
fn test_slot_before_opening_is_rejected() {
    let hours = OperatingHours::parse("09:00", "22:00").unwrap();
    let proposed = TimeSlot::parse("08:00", "09:00").unwrap();

    let err = check_booking(&hours, &proposed, &[]).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::OutsideOperatingHours { .. })
    ));
}

#[test]
fn test_slot_past_closing_is_rejected() {
    let proposed = TimeSlot::parse("21:30", "22:30").unwrap();

    let err = check_booking(&pool_hours(), &proposed, &[]).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::OutsideOperatingHours { .. })
    ));
}

#[test]
fn test_overlapping_slot_is_occupied() {
    let existing = vec![TimeSlot::parse("10:00", "11:00").unwrap()];
    let proposed = TimeSlot::parse("10:30", "11:30").unwrap();

    let err = check_booking(&pool_hours(), &proposed, &existing).unwrap_err();
    match err {
        CoreError::DomainViolation(DomainError::SlotOccupied {
            taken_start,
            taken_end,
            ..
        }) => {
            assert_eq!(taken_start.format("%H:%M").to_string(), "10:00");
            assert_eq!(taken_end.format("%H:%M").to_string(), "11:00");
        }
        other => panic!("Expected SlotOccupied, got {other:?}"),
    }
}

#[test]
fn test_touching_boundary_is_accepted() {
    let existing = vec![TimeSlot::parse("10:00", "11:00").unwrap()];

    let after = TimeSlot::parse("11:00", "12:00").unwrap();
    assert!(check_booking(&pool_hours(), &after, &existing).is_ok());

    let before = TimeSlot::parse("09:00", "10:00").unwrap();
    assert!(check_booking(&pool_hours(), &before, &existing).is_ok());
}

#[test]
fn test_full_window_booking_is_accepted() {
    let proposed = TimeSlot::parse("06:00", "22:00").unwrap();
    assert!(check_booking(&pool_hours(), &proposed, &[]).is_ok());
}

#[test]
fn test_scan_reports_any_conflicting_neighbor() {
    let existing = vec![
        TimeSlot::parse("08:00", "09:00").unwrap(),
        TimeSlot::parse("12:00", "14:00").unwrap(),
        TimeSlot::parse("18:00", "19:00").unwrap(),
    ];

    let proposed = TimeSlot::parse("13:30", "18:30").unwrap();
    assert!(check_booking(&pool_hours(), &proposed, &existing).is_err());

    let free = TimeSlot::parse("09:00", "12:00").unwrap();
    assert!(check_booking(&pool_hours(), &free, &existing).is_ok());
}
