// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Gatehouse community portal.
//!
//! This crate provides database persistence for buildings, resident
//! profiles, amenities, visitors, bookings, notices, chat, achievements,
//! and the account/session store. It is built on Diesel over `SQLite`.
//!
//! ## Tenant isolation
//!
//! Every record-level query and mutation filters on `building_id`. The
//! only tenant-unscoped surfaces are building provisioning itself,
//! account/session lookups (which key on globally-unique values), and the
//! notification-callback visitor lookup.
//!
//! ## Concurrency
//!
//! Actors race on visitor and booking records from different processes,
//! so the guards live in the database, not in process memory:
//!
//! - Visitor status changes are conditional updates ("set status to X
//!   only where status is Y"); losing a race yields a typed conflict.
//! - Booking creation re-runs the overlap scan inside an immediate
//!   transaction, serializing it against concurrent proposals.
//! - Invite codes carry a partial unique index over pending passes;
//!   collisions surface as a typed error the caller retries on.
//!
//! ## Testing
//!
//! Tests run against in-memory `SQLite` databases. Each test database gets
//! a unique shared-cache name from an atomic counter, so tests are
//! isolated without time-based naming collisions.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use gatehouse_domain::{
    Achievement, Amenity, Booking, Building, ChatMessage, Flat, Notice, Profile, Visitor,
    VisitorStatus,
};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{AccountData, SessionData};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the Gatehouse data model.
///
/// Owns a single `SQLite` connection; the server wraps it in a mutex and
/// hands `&mut` access to one request at a time.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_gatehouse_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn = backend::initialize_database(path_str)?;

        // WAL gives concurrent readers on file databases
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Buildings
    // ========================================================================

    /// Provisions a new building and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_building(
        &mut self,
        name: &str,
        address: &str,
        now: &str,
    ) -> Result<i64, PersistenceError> {
        let record = data_models::NewBuilding {
            name: name.to_string(),
            address: address.to_string(),
            created_at: now.to_string(),
        };
        mutations::records::insert_building(&mut self.conn, &record)
    }

    /// Fetches a building by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_building(&mut self, building_id: i64) -> Result<Option<Building>, PersistenceError> {
        Ok(queries::records::get_building(&mut self.conn, building_id)?
            .map(data_models::BuildingRow::into_domain))
    }

    /// Lists all buildings.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_buildings(&mut self) -> Result<Vec<Building>, PersistenceError> {
        Ok(queries::records::list_buildings(&mut self.conn)?
            .into_iter()
            .map(data_models::BuildingRow::into_domain)
            .collect())
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Registers a resident profile and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the flat already has
    /// a profile, or another error if the insert fails.
    pub fn create_profile(&mut self, profile: &Profile) -> Result<i64, PersistenceError> {
        let record = data_models::NewProfile::from_domain(profile);
        mutations::records::insert_profile(&mut self.conn, &record)
    }

    /// Marks a resident profile as verified.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the profile does not exist.
    pub fn verify_profile(
        &mut self,
        building_id: i64,
        profile_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::records::set_profile_verified(&mut self.conn, building_id, profile_id)
    }

    /// Updates a resident's notification destinations.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the profile does not exist.
    pub fn update_profile_contact(
        &mut self,
        building_id: i64,
        profile_id: i64,
        telegram_chat_id: Option<&str>,
        push_endpoint: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::records::update_profile_contact(
            &mut self.conn,
            building_id,
            profile_id,
            telegram_chat_id,
            push_endpoint,
        )
    }

    /// Fetches a profile by identifier within a building.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_profile(
        &mut self,
        building_id: i64,
        profile_id: i64,
    ) -> Result<Option<Profile>, PersistenceError> {
        queries::records::get_profile(&mut self.conn, building_id, profile_id)?
            .map(data_models::ProfileRow::into_domain)
            .transpose()
    }

    /// Fetches the profile occupying a flat within a building.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_profile_by_flat(
        &mut self,
        building_id: i64,
        flat: &Flat,
    ) -> Result<Option<Profile>, PersistenceError> {
        queries::records::get_profile_by_flat(
            &mut self.conn,
            building_id,
            flat.wing(),
            i32::from(flat.number()),
        )?
        .map(data_models::ProfileRow::into_domain)
        .transpose()
    }

    /// Lists a building's profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_profiles(&mut self, building_id: i64) -> Result<Vec<Profile>, PersistenceError> {
        queries::records::list_profiles(&mut self.conn, building_id)?
            .into_iter()
            .map(data_models::ProfileRow::into_domain)
            .collect()
    }

    // ========================================================================
    // Amenities
    // ========================================================================

    /// Creates an amenity and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the name is taken in
    /// this building, or another error if the insert fails.
    pub fn create_amenity(&mut self, amenity: &Amenity) -> Result<i64, PersistenceError> {
        let record = data_models::NewAmenity::from_domain(amenity);
        mutations::records::insert_amenity(&mut self.conn, &record)
    }

    /// Fetches an amenity by identifier within a building.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_amenity(
        &mut self,
        building_id: i64,
        amenity_id: i64,
    ) -> Result<Option<Amenity>, PersistenceError> {
        queries::records::get_amenity(&mut self.conn, building_id, amenity_id)?
            .map(data_models::AmenityRow::into_domain)
            .transpose()
    }

    /// Lists a building's amenities.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_amenities(&mut self, building_id: i64) -> Result<Vec<Amenity>, PersistenceError> {
        queries::records::list_amenities(&mut self.conn, building_id)?
            .into_iter()
            .map(data_models::AmenityRow::into_domain)
            .collect()
    }

    // ========================================================================
    // Visitors
    // ========================================================================

    /// Inserts a visitor record and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateInviteCode` on a pending-code
    /// collision (the caller regenerates), or another error if the insert
    /// fails.
    pub fn insert_visitor(&mut self, visitor: &Visitor) -> Result<Visitor, PersistenceError> {
        let record = data_models::NewVisitor::from_domain(visitor);
        let visitor_id = mutations::visitors::insert(&mut self.conn, &record)?;

        let mut stored = visitor.clone();
        stored.visitor_id = Some(visitor_id);
        Ok(stored)
    }

    /// Atomically claims the pending visitor holding an invite code,
    /// moving it to `entered`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no pending visitor in the
    /// building holds this code (never issued and already used are
    /// indistinguishable).
    pub fn claim_pending_by_code(
        &mut self,
        building_id: i64,
        code: &str,
        now: &str,
    ) -> Result<Visitor, PersistenceError> {
        mutations::visitors::claim_by_code(&mut self.conn, building_id, code, now)?.into_domain()
    }

    /// Transitions a visitor's status, guarded on the expected current
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::TransitionConflict` if another actor
    /// transitioned the record first, or `PersistenceError::NotFound` if
    /// the visitor does not exist in the building.
    pub fn transition_visitor(
        &mut self,
        building_id: i64,
        visitor_id: i64,
        expected: VisitorStatus,
        next: VisitorStatus,
        now: &str,
    ) -> Result<Visitor, PersistenceError> {
        mutations::visitors::transition_status(
            &mut self.conn,
            building_id,
            visitor_id,
            expected,
            next,
            now,
        )?
        .into_domain()
    }

    /// Fetches a visitor by identifier within a building.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_visitor(
        &mut self,
        building_id: i64,
        visitor_id: i64,
    ) -> Result<Option<Visitor>, PersistenceError> {
        queries::visitors::get(&mut self.conn, building_id, visitor_id)?
            .map(data_models::VisitorRow::into_domain)
            .transpose()
    }

    /// Fetches a visitor by identifier alone (notification-callback path).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_visitor_unscoped(
        &mut self,
        visitor_id: i64,
    ) -> Result<Option<Visitor>, PersistenceError> {
        queries::visitors::get_unscoped(&mut self.conn, visitor_id)?
            .map(data_models::VisitorRow::into_domain)
            .transpose()
    }

    /// Lists a building's visitors, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_visitors(&mut self, building_id: i64) -> Result<Vec<Visitor>, PersistenceError> {
        queries::visitors::list(&mut self.conn, building_id)?
            .into_iter()
            .map(data_models::VisitorRow::into_domain)
            .collect()
    }

    /// Lists the visitors of a single flat, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_visitors_for_flat(
        &mut self,
        building_id: i64,
        flat: &Flat,
    ) -> Result<Vec<Visitor>, PersistenceError> {
        queries::visitors::list_for_flat(
            &mut self.conn,
            building_id,
            flat.wing(),
            i32::from(flat.number()),
        )?
        .into_iter()
        .map(data_models::VisitorRow::into_domain)
        .collect()
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Creates a booking after re-checking for conflicts inside a
    /// write-serializing transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::RuleViolation` if the slot no longer
    /// fits, or another error if the transaction fails.
    pub fn create_booking(
        &mut self,
        amenity: &Amenity,
        booking: &Booking,
    ) -> Result<Booking, PersistenceError> {
        mutations::bookings::create_checked(&mut self.conn, amenity, booking)?.into_domain()
    }

    /// Fetches a booking by identifier within a building.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupt.
    pub fn get_booking(
        &mut self,
        building_id: i64,
        booking_id: i64,
    ) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::get(&mut self.conn, building_id, booking_id)?
            .map(data_models::BookingRow::into_domain)
            .transpose()
    }

    /// Deletes a booking. Authorization happens in the API layer.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the booking does not exist.
    pub fn delete_booking(
        &mut self,
        building_id: i64,
        booking_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::bookings::delete(&mut self.conn, building_id, booking_id)
    }

    /// Lists the bookings for an amenity on a date, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_bookings(
        &mut self,
        amenity_id: i64,
        date: &str,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_for_amenity_date(&mut self.conn, amenity_id, date)?
            .into_iter()
            .map(data_models::BookingRow::into_domain)
            .collect()
    }

    /// Lists a resident's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupt.
    pub fn list_bookings_for_profile(
        &mut self,
        building_id: i64,
        profile_id: i64,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_for_profile(&mut self.conn, building_id, profile_id)?
            .into_iter()
            .map(data_models::BookingRow::into_domain)
            .collect()
    }

    // ========================================================================
    // Notices, chat, achievements
    // ========================================================================

    /// Posts a notice and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn post_notice(&mut self, notice: &Notice) -> Result<i64, PersistenceError> {
        let record = data_models::NewNotice {
            building_id: notice.building_id,
            title: notice.title.clone(),
            body: notice.body.clone(),
            posted_by: notice.posted_by,
            created_at: notice.created_at.clone(),
        };
        mutations::records::insert_notice(&mut self.conn, &record)
    }

    /// Deletes a notice.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the notice does not exist.
    pub fn delete_notice(
        &mut self,
        building_id: i64,
        notice_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::records::delete_notice(&mut self.conn, building_id, notice_id)
    }

    /// Lists a building's notices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notices(&mut self, building_id: i64) -> Result<Vec<Notice>, PersistenceError> {
        Ok(queries::records::list_notices(&mut self.conn, building_id)?
            .into_iter()
            .map(data_models::NoticeRow::into_domain)
            .collect())
    }

    /// Posts a chat message and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn post_chat_message(&mut self, message: &ChatMessage) -> Result<i64, PersistenceError> {
        let record = data_models::NewChatMessage {
            building_id: message.building_id,
            sender_profile_id: message.sender_profile_id,
            sender_name: message.sender_name.clone(),
            body: message.body.clone(),
            created_at: message.created_at.clone(),
        };
        mutations::records::insert_chat_message(&mut self.conn, &record)
    }

    /// Lists a building's most recent chat messages in chronological order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_chat_messages(
        &mut self,
        building_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, PersistenceError> {
        Ok(
            queries::records::list_chat_messages(&mut self.conn, building_id, limit)?
                .into_iter()
                .map(data_models::ChatMessageRow::into_domain)
                .collect(),
        )
    }

    /// Awards an achievement and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn award_achievement(
        &mut self,
        achievement: &Achievement,
    ) -> Result<i64, PersistenceError> {
        let record = data_models::NewAchievement {
            building_id: achievement.building_id,
            profile_id: achievement.profile_id,
            title: achievement.title.clone(),
            description: achievement.description.clone(),
            awarded_at: achievement.awarded_at.clone(),
        };
        mutations::records::insert_achievement(&mut self.conn, &record)
    }

    /// Lists achievements, optionally narrowed to one resident.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_achievements(
        &mut self,
        building_id: i64,
        profile_id: Option<i64>,
    ) -> Result<Vec<Achievement>, PersistenceError> {
        Ok(
            queries::records::list_achievements(&mut self.conn, building_id, profile_id)?
                .into_iter()
                .map(data_models::AchievementRow::into_domain)
                .collect(),
        )
    }

    // ========================================================================
    // Accounts & sessions
    // ========================================================================

    /// Creates a new account with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the login name is
    /// taken, or another error if the insert fails.
    pub fn create_account(
        &mut self,
        login_name: &str,
        password: &str,
        role: &str,
        building_id: Option<i64>,
        profile_id: Option<i64>,
        now: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::accounts::create_account(
            &mut self.conn,
            login_name,
            password,
            role,
            building_id,
            profile_id,
            now,
        )
    }

    /// Disables an account.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::AccountNotFound` if the account does not
    /// exist.
    pub fn disable_account(&mut self, account_id: i64) -> Result<(), PersistenceError> {
        mutations::accounts::disable_account(&mut self.conn, account_id)
    }

    /// Fetches an account by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_account_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_login(&mut self.conn, login_name)
    }

    /// Fetches an account by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_account_by_id(
        &mut self,
        account_id: i64,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_id(&mut self.conn, account_id)
    }

    /// Stores a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(&mut self, session: &SessionData) -> Result<(), PersistenceError> {
        mutations::accounts::create_session(&mut self.conn, session)
    }

    /// Fetches a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session(&mut self, token: &str) -> Result<Option<SessionData>, PersistenceError> {
        queries::accounts::get_session(&mut self.conn, token)
    }

    /// Deletes a session (logout). Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, token: &str) -> Result<(), PersistenceError> {
        mutations::accounts::delete_session(&mut self.conn, token)
    }

    /// Deletes all sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::accounts::delete_expired_sessions(&mut self.conn, now)
    }
}
