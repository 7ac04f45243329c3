// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! The overlap scan and the insert run inside a single immediate
//! transaction. SQLite serializes writers under `BEGIN IMMEDIATE`, so two
//! concurrent proposals for the same slot cannot both pass the scan: the
//! second one re-runs it after the first commits and observes the new row.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::data_models::{BookingRow, NewBooking};
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;
use crate::queries;
use gatehouse::{CoreError, check_booking};
use gatehouse_domain::{Amenity, Booking};

/// Inserts a booking after re-checking for conflicts inside a
/// write-serializing transaction.
///
/// The API layer has already run the same check as a fast path; this one
/// is the authoritative check.
///
/// # Errors
///
/// Returns `PersistenceError::RuleViolation` if the slot no longer fits
/// (outside operating hours or newly occupied), or another error if the
/// transaction fails.
pub fn create_checked(
    conn: &mut SqliteConnection,
    amenity: &Amenity,
    booking: &Booking,
) -> Result<BookingRow, PersistenceError> {
    let record = NewBooking::from_domain(booking);

    info!(
        building_id = booking.building_id,
        amenity_id = booking.amenity_id,
        date = %record.booking_date,
        slot = %booking.slot,
        "Creating booking"
    );

    conn.immediate_transaction(|conn| {
        let existing = queries::bookings::slots_for_amenity_date(
            conn,
            booking.amenity_id,
            &record.booking_date,
        )?;

        check_booking(&amenity.hours, &booking.slot, &existing).map_err(|e| match e {
            CoreError::DomainViolation(domain_err) => PersistenceError::RuleViolation(domain_err),
        })?;

        diesel::insert_into(bookings::table)
            .values(&record)
            .get_result(conn)
            .map_err(Into::into)
    })
}

/// Deletes a booking.
///
/// Ownership and privilege checks happen in the API layer before this is
/// called.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the booking does not exist in
/// the building.
pub fn delete(
    conn: &mut SqliteConnection,
    building_id: i64,
    booking_id: i64,
) -> Result<(), PersistenceError> {
    info!(building_id, booking_id, "Deleting booking");

    let deleted = diesel::delete(
        bookings::table
            .filter(bookings::booking_id.eq(booking_id))
            .filter(bookings::building_id.eq(building_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Booking {booking_id} not found"
        )));
    }
    Ok(())
}
