// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visitor queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::VisitorRow;
use crate::diesel_schema::visitors;
use crate::error::PersistenceError;

/// Fetches a visitor by identifier within a building.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get(
    conn: &mut SqliteConnection,
    building_id: i64,
    visitor_id: i64,
) -> Result<Option<VisitorRow>, PersistenceError> {
    visitors::table
        .filter(visitors::visitor_id.eq(visitor_id))
        .filter(visitors::building_id.eq(building_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Fetches a visitor by identifier alone.
///
/// This is reserved for the notification-callback path, where the inbound
/// payload carries only the visitor identifier; the tenant is read off the
/// record afterwards.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_unscoped(
    conn: &mut SqliteConnection,
    visitor_id: i64,
) -> Result<Option<VisitorRow>, PersistenceError> {
    visitors::table
        .filter(visitors::visitor_id.eq(visitor_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Lists a building's visitors, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list(
    conn: &mut SqliteConnection,
    building_id: i64,
) -> Result<Vec<VisitorRow>, PersistenceError> {
    visitors::table
        .filter(visitors::building_id.eq(building_id))
        .order(visitors::created_at.desc())
        .load(conn)
        .map_err(Into::into)
}

/// Lists the visitors of a single flat, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_flat(
    conn: &mut SqliteConnection,
    building_id: i64,
    wing: &str,
    flat_number: i32,
) -> Result<Vec<VisitorRow>, PersistenceError> {
    visitors::table
        .filter(visitors::building_id.eq(building_id))
        .filter(visitors::wing.eq(wing))
        .filter(visitors::flat_number.eq(flat_number))
        .order(visitors::created_at.desc())
        .load(conn)
        .map_err(Into::into)
}
