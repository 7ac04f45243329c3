// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visitor mutations.
//!
//! Status changes are compare-and-swap updates: the `WHERE` clause pins
//! the status the caller observed, and zero updated rows means another
//! actor won the race. Residents, gate staff, and the notification
//! callback may all act on the same record from different processes, so
//! in-process locking would not be sufficient; the guard lives in the
//! database.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::data_models::{NewVisitor, VisitorRow};
use crate::diesel_schema::visitors;
use crate::error::PersistenceError;
use gatehouse_domain::VisitorStatus;

/// Inserts a visitor record.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateInviteCode` if the record carries a
/// pending invite code that collides with another pending pass in the same
/// building (the caller regenerates and retries), or another error if the
/// insert fails.
pub fn insert(conn: &mut SqliteConnection, record: &NewVisitor) -> Result<i64, PersistenceError> {
    info!(
        building_id = record.building_id,
        visitor_type = %record.visitor_type,
        status = %record.status,
        "Inserting visitor record"
    );

    let inserted: VisitorRow = diesel::insert_into(visitors::table)
        .values(record)
        .get_result(conn)
        .map_err(|e| match PersistenceError::from(e) {
            // The only unique index on visitors is the pending-code index
            PersistenceError::UniqueViolation(_) => PersistenceError::DuplicateInviteCode,
            other => other,
        })?;

    Ok(inserted.visitor_id)
}

/// Transitions a visitor's status, guarded on the expected current status.
///
/// Stamps `check_in_at` when the target status is `Entered` and
/// `check_out_at` when it is `Exited`.
///
/// # Errors
///
/// - `PersistenceError::TransitionConflict` if the record exists but is no
///   longer in `expected` (another actor transitioned it first)
/// - `PersistenceError::NotFound` if no such visitor exists in the building
pub fn transition_status(
    conn: &mut SqliteConnection,
    building_id: i64,
    visitor_id: i64,
    expected: VisitorStatus,
    next: VisitorStatus,
    now: &str,
) -> Result<VisitorRow, PersistenceError> {
    debug!(
        visitor_id,
        from = expected.as_str(),
        to = next.as_str(),
        "Attempting guarded status transition"
    );

    let target = visitors::table
        .filter(visitors::visitor_id.eq(visitor_id))
        .filter(visitors::building_id.eq(building_id))
        .filter(visitors::status.eq(expected.as_str()));

    let updated: Option<VisitorRow> = if next.stamps_check_in() {
        diesel::update(target)
            .set((
                visitors::status.eq(next.as_str()),
                visitors::check_in_at.eq(Some(now)),
            ))
            .get_result(conn)
            .optional()?
    } else if next == VisitorStatus::Exited {
        diesel::update(target)
            .set((
                visitors::status.eq(next.as_str()),
                visitors::check_out_at.eq(Some(now)),
            ))
            .get_result(conn)
            .optional()?
    } else {
        diesel::update(target)
            .set(visitors::status.eq(next.as_str()))
            .get_result(conn)
            .optional()?
    };

    updated.map_or_else(
        || {
            // Zero rows: either the guard failed or the record is absent
            let actual: Option<String> = visitors::table
                .filter(visitors::visitor_id.eq(visitor_id))
                .filter(visitors::building_id.eq(building_id))
                .select(visitors::status)
                .first(conn)
                .optional()?;

            match actual {
                Some(actual) => Err(PersistenceError::TransitionConflict {
                    visitor_id,
                    expected: expected.as_str().to_string(),
                    actual,
                }),
                None => Err(PersistenceError::NotFound(format!(
                    "Visitor {visitor_id} not found"
                ))),
            }
        },
        Ok,
    )
}

/// Atomically claims the pending visitor holding an invite code.
///
/// This is the single-use guarantee: the update consumes the pass by
/// moving it to `entered`, so a second attempt with the same code finds
/// nothing. "Never issued" and "already used" are indistinguishable to
/// the caller.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no pending visitor in the
/// building holds this code.
pub fn claim_by_code(
    conn: &mut SqliteConnection,
    building_id: i64,
    code: &str,
    now: &str,
) -> Result<VisitorRow, PersistenceError> {
    debug!(building_id, "Validating invite code at the gate");

    diesel::update(
        visitors::table
            .filter(visitors::building_id.eq(building_id))
            .filter(visitors::invite_code.eq(Some(code)))
            .filter(visitors::status.eq(VisitorStatus::Pending.as_str())),
    )
    .set((
        visitors::status.eq(VisitorStatus::Entered.as_str()),
        visitors::check_in_at.eq(Some(now)),
    ))
    .get_result(conn)
    .optional()?
    .ok_or_else(|| PersistenceError::NotFound("No pending pass matches this code".to_string()))
}
