// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.
//!
//! Passwords are hashed with bcrypt at insert time; plain-text passwords
//! never touch the database or the logs.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::get_last_insert_rowid;
use crate::data_models::{NewAccount, SessionData};
use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;

/// Creates a new account.
///
/// The `login_name` is normalized to lowercase for case-insensitive
/// uniqueness.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the login name is taken,
/// or another error if the insert fails.
pub fn create_account(
    conn: &mut SqliteConnection,
    login_name: &str,
    password: &str,
    role: &str,
    building_id: Option<i64>,
    profile_id: Option<i64>,
    now: &str,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.to_lowercase();

    info!(login_name = %normalized_login, role, "Creating account");

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    let record = NewAccount {
        login_name: normalized_login,
        password_hash,
        role: role.to_string(),
        building_id,
        profile_id,
        is_disabled: 0,
        created_at: now.to_string(),
    };

    diesel::insert_into(accounts::table)
        .values(&record)
        .execute(conn)?;

    let account_id: i64 = get_last_insert_rowid(conn)?;

    info!(account_id, "Account created successfully");

    Ok(account_id)
}

/// Disables an account, preventing further logins.
///
/// # Errors
///
/// Returns `PersistenceError::AccountNotFound` if the account does not exist.
pub fn disable_account(
    conn: &mut SqliteConnection,
    account_id: i64,
) -> Result<(), PersistenceError> {
    info!(account_id, "Disabling account");

    let updated = diesel::update(accounts::table.filter(accounts::account_id.eq(account_id)))
        .set(accounts::is_disabled.eq(1))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::AccountNotFound(format!(
            "Account {account_id} not found"
        )));
    }
    Ok(())
}

/// Stores a new session.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_session(
    conn: &mut SqliteConnection,
    record: &SessionData,
) -> Result<(), PersistenceError> {
    debug!(account_id = record.account_id, "Storing session");

    diesel::insert_into(sessions::table)
        .values(record)
        .execute(conn)?;
    Ok(())
}

/// Deletes a session (logout).
///
/// Deleting an absent session is not an error; logout is idempotent.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(conn: &mut SqliteConnection, token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(token))).execute(conn)?;
    Ok(())
}

/// Deletes all sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let deleted =
        diesel::delete(sessions::table.filter(sessions::expires_at.lt(now))).execute(conn)?;

    if deleted > 0 {
        debug!(deleted, "Pruned expired sessions");
    }
    Ok(deleted)
}
