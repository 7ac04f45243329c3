// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{AccountData, SessionData};
use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;

/// Fetches an account by login name.
///
/// Login names are stored lowercase; the lookup normalizes the same way.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_account_by_login(
    conn: &mut SqliteConnection,
    login_name: &str,
) -> Result<Option<AccountData>, PersistenceError> {
    accounts::table
        .filter(accounts::login_name.eq(login_name.to_lowercase()))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Fetches an account by identifier.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_account_by_id(
    conn: &mut SqliteConnection,
    account_id: i64,
) -> Result<Option<AccountData>, PersistenceError> {
    accounts::table
        .filter(accounts::account_id.eq(account_id))
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Fetches a session by token.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_session(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    sessions::table
        .filter(sessions::session_token.eq(token))
        .first(conn)
        .optional()
        .map_err(Into::into)
}
