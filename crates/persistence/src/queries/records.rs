// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Plain-record queries: buildings, profiles, amenities, notices,
//! chat messages, and achievements.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{
    AchievementRow, AmenityRow, BuildingRow, ChatMessageRow, NoticeRow, ProfileRow,
};
use crate::diesel_schema::{
    achievements, amenities, buildings, chat_messages, notices, profiles,
};
use crate::error::PersistenceError;

/// Fetches a building by identifier.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_building(
    conn: &mut SqliteConnection,
    building_id: i64,
) -> Result<Option<BuildingRow>, PersistenceError> {
    buildings::table
        .filter(buildings::building_id.eq(building_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Lists all buildings, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_buildings(conn: &mut SqliteConnection) -> Result<Vec<BuildingRow>, PersistenceError> {
    buildings::table
        .order(buildings::building_id.asc())
        .load(conn)
        .map_err(Into::into)
}

/// Fetches a profile by identifier within a building.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_profile(
    conn: &mut SqliteConnection,
    building_id: i64,
    profile_id: i64,
) -> Result<Option<ProfileRow>, PersistenceError> {
    profiles::table
        .filter(profiles::profile_id.eq(profile_id))
        .filter(profiles::building_id.eq(building_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Fetches the profile occupying a flat within a building.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_profile_by_flat(
    conn: &mut SqliteConnection,
    building_id: i64,
    wing: &str,
    flat_number: i32,
) -> Result<Option<ProfileRow>, PersistenceError> {
    profiles::table
        .filter(profiles::building_id.eq(building_id))
        .filter(profiles::wing.eq(wing))
        .filter(profiles::flat_number.eq(flat_number))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Lists a building's profiles ordered by flat.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_profiles(
    conn: &mut SqliteConnection,
    building_id: i64,
) -> Result<Vec<ProfileRow>, PersistenceError> {
    profiles::table
        .filter(profiles::building_id.eq(building_id))
        .order((profiles::wing.asc(), profiles::flat_number.asc()))
        .load(conn)
        .map_err(Into::into)
}

/// Fetches an amenity by identifier within a building.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_amenity(
    conn: &mut SqliteConnection,
    building_id: i64,
    amenity_id: i64,
) -> Result<Option<AmenityRow>, PersistenceError> {
    amenities::table
        .filter(amenities::amenity_id.eq(amenity_id))
        .filter(amenities::building_id.eq(building_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Lists a building's amenities by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_amenities(
    conn: &mut SqliteConnection,
    building_id: i64,
) -> Result<Vec<AmenityRow>, PersistenceError> {
    amenities::table
        .filter(amenities::building_id.eq(building_id))
        .order(amenities::name.asc())
        .load(conn)
        .map_err(Into::into)
}

/// Lists a building's notices, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_notices(
    conn: &mut SqliteConnection,
    building_id: i64,
) -> Result<Vec<NoticeRow>, PersistenceError> {
    notices::table
        .filter(notices::building_id.eq(building_id))
        .order(notices::notice_id.desc())
        .load(conn)
        .map_err(Into::into)
}

/// Lists a building's most recent chat messages, oldest of the page first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_chat_messages(
    conn: &mut SqliteConnection,
    building_id: i64,
    limit: i64,
) -> Result<Vec<ChatMessageRow>, PersistenceError> {
    let mut rows: Vec<ChatMessageRow> = chat_messages::table
        .filter(chat_messages::building_id.eq(building_id))
        .order(chat_messages::message_id.desc())
        .limit(limit)
        .load(conn)?;

    rows.reverse();
    Ok(rows)
}

/// Lists achievements for a building, optionally narrowed to one resident.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_achievements(
    conn: &mut SqliteConnection,
    building_id: i64,
    profile_id: Option<i64>,
) -> Result<Vec<AchievementRow>, PersistenceError> {
    let mut query = achievements::table
        .filter(achievements::building_id.eq(building_id))
        .into_boxed();

    if let Some(profile_id) = profile_id {
        query = query.filter(achievements::profile_id.eq(profile_id));
    }

    query
        .order(achievements::achievement_id.desc())
        .load(conn)
        .map_err(Into::into)
}
