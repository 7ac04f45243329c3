// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::BookingRow;
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;
use gatehouse_domain::TimeSlot;

/// Fetches a booking by identifier within a building.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get(
    conn: &mut SqliteConnection,
    building_id: i64,
    booking_id: i64,
) -> Result<Option<BookingRow>, PersistenceError> {
    bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .filter(bookings::building_id.eq(building_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Lists the bookings for an amenity on a date, ordered by start time.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_amenity_date(
    conn: &mut SqliteConnection,
    amenity_id: i64,
    date: &str,
) -> Result<Vec<BookingRow>, PersistenceError> {
    bookings::table
        .filter(bookings::amenity_id.eq(amenity_id))
        .filter(bookings::booking_date.eq(date))
        .order(bookings::start_time.asc())
        .load(conn)
        .map_err(Into::into)
}

/// Loads the reserved slots for an amenity on a date.
///
/// This feeds the overlap scan; a stored slot that no longer parses fails
/// loudly instead of being skipped.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRecord` if a stored slot is
/// malformed, or another error if the query fails.
pub fn slots_for_amenity_date(
    conn: &mut SqliteConnection,
    amenity_id: i64,
    date: &str,
) -> Result<Vec<TimeSlot>, PersistenceError> {
    let rows: Vec<(i64, String, String)> = bookings::table
        .filter(bookings::amenity_id.eq(amenity_id))
        .filter(bookings::booking_date.eq(date))
        .select((
            bookings::booking_id,
            bookings::start_time,
            bookings::end_time,
        ))
        .load(conn)?;

    rows.into_iter()
        .map(|(booking_id, start, end)| {
            TimeSlot::parse(&start, &end).map_err(|e| {
                PersistenceError::CorruptRecord(format!("booking {booking_id}: {e}"))
            })
        })
        .collect()
}

/// Lists a resident's bookings across amenities, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_profile(
    conn: &mut SqliteConnection,
    building_id: i64,
    profile_id: i64,
) -> Result<Vec<BookingRow>, PersistenceError> {
    bookings::table
        .filter(bookings::building_id.eq(building_id))
        .filter(bookings::profile_id.eq(profile_id))
        .order(bookings::booking_date.desc())
        .load(conn)
        .map_err(Into::into)
}
