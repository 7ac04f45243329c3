// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking conflict detection.
//!
//! A proposed reservation must fit inside the amenity's operating window
//! and must not overlap any existing reservation for the same amenity and
//! date. Slots are half-open `[start, end)` intervals, so a reservation
//! ending at 11:00 does not conflict with one starting at 11:00.
//!
//! This check produces precise, user-facing errors. It is not the final
//! authority against a concurrent second proposal: the persistence layer
//! runs the same scan again inside a write-serializing transaction before
//! inserting.

use crate::error::CoreError;
use gatehouse_domain::{DomainError, OperatingHours, TimeSlot, find_conflict};

/// Checks a proposed slot against operating hours and existing bookings.
///
/// The `start < end` invariant is already guaranteed by [`TimeSlot`]
/// construction, so the checks here are:
///
/// 1. The slot must fall within `hours` → `OutsideOperatingHours`.
/// 2. No existing slot may overlap it → `SlotOccupied`.
///
/// # Errors
///
/// Returns an error naming the violated rule; `SlotOccupied` carries the
/// conflicting interval so callers can show it.
pub fn check_booking(
    hours: &OperatingHours,
    proposed: &TimeSlot,
    existing: &[TimeSlot],
) -> Result<(), CoreError> {
    if !hours.contains(proposed) {
        return Err(CoreError::DomainViolation(
            DomainError::OutsideOperatingHours {
                start: proposed.start(),
                end: proposed.end(),
                open: hours.open(),
                close: hours.close(),
            },
        ));
    }

    if let Some(conflict) = find_conflict(proposed, existing) {
        return Err(CoreError::DomainViolation(DomainError::SlotOccupied {
            start: proposed.start(),
            end: proposed.end(),
            taken_start: conflict.start(),
            taken_end: conflict.end(),
        }));
    }

    Ok(())
}
