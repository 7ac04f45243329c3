// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Plain-record mutations: buildings, profiles, amenities, notices,
//! chat messages, and achievements.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::get_last_insert_rowid;
use crate::data_models::{
    NewAchievement, NewAmenity, NewBuilding, NewChatMessage, NewNotice, NewProfile,
};
use crate::diesel_schema::{
    achievements, amenities, buildings, chat_messages, notices, profiles,
};
use crate::error::PersistenceError;

/// Inserts a building and returns its assigned identifier.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_building(
    conn: &mut SqliteConnection,
    record: &NewBuilding,
) -> Result<i64, PersistenceError> {
    info!(name = %record.name, "Provisioning building");

    diesel::insert_into(buildings::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Inserts a resident profile and returns its assigned identifier.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the flat already has a
/// profile in this building, or another error if the insert fails.
pub fn insert_profile(
    conn: &mut SqliteConnection,
    record: &NewProfile,
) -> Result<i64, PersistenceError> {
    info!(
        building_id = record.building_id,
        wing = %record.wing,
        flat_number = record.flat_number,
        "Registering resident profile"
    );

    diesel::insert_into(profiles::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Marks a resident profile as verified.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the profile does not exist in
/// the building.
pub fn set_profile_verified(
    conn: &mut SqliteConnection,
    building_id: i64,
    profile_id: i64,
) -> Result<(), PersistenceError> {
    info!(building_id, profile_id, "Verifying resident profile");

    let updated = diesel::update(
        profiles::table
            .filter(profiles::profile_id.eq(profile_id))
            .filter(profiles::building_id.eq(building_id)),
    )
    .set(profiles::verified.eq(1))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Profile {profile_id} not found"
        )));
    }
    Ok(())
}

/// Updates a resident's notification destinations.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the profile does not exist in
/// the building.
pub fn update_profile_contact(
    conn: &mut SqliteConnection,
    building_id: i64,
    profile_id: i64,
    telegram_chat_id: Option<&str>,
    push_endpoint: Option<&str>,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(
        profiles::table
            .filter(profiles::profile_id.eq(profile_id))
            .filter(profiles::building_id.eq(building_id)),
    )
    .set((
        profiles::telegram_chat_id.eq(telegram_chat_id),
        profiles::push_endpoint.eq(push_endpoint),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Profile {profile_id} not found"
        )));
    }
    Ok(())
}

/// Inserts an amenity and returns its assigned identifier.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the building already has
/// an amenity with this name, or another error if the insert fails.
pub fn insert_amenity(
    conn: &mut SqliteConnection,
    record: &NewAmenity,
) -> Result<i64, PersistenceError> {
    info!(
        building_id = record.building_id,
        name = %record.name,
        "Creating amenity"
    );

    diesel::insert_into(amenities::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Inserts a notice and returns its assigned identifier.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_notice(
    conn: &mut SqliteConnection,
    record: &NewNotice,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(notices::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Deletes a notice.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the notice does not exist in
/// the building.
pub fn delete_notice(
    conn: &mut SqliteConnection,
    building_id: i64,
    notice_id: i64,
) -> Result<(), PersistenceError> {
    let deleted = diesel::delete(
        notices::table
            .filter(notices::notice_id.eq(notice_id))
            .filter(notices::building_id.eq(building_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Notice {notice_id} not found"
        )));
    }
    Ok(())
}

/// Inserts a chat message and returns its assigned identifier.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_chat_message(
    conn: &mut SqliteConnection,
    record: &NewChatMessage,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(chat_messages::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Inserts an achievement and returns its assigned identifier.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_achievement(
    conn: &mut SqliteConnection,
    record: &NewAchievement,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(achievements::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}
