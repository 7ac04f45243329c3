// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use time::{Duration, OffsetDateTime};

use gatehouse_persistence::{AccountData, Persistence, PersistenceError, SessionData};

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Role is parsed from the stored account exactly once, at the session
/// boundary; everything downstream matches on the closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Operates across buildings: provisioning and account management.
    SuperAdmin,
    /// Manages one building: residents, amenities, notices, recognitions.
    Admin,
    /// Lives in one flat: passes, approvals, bookings, chat.
    Resident,
    /// Staffs one gate: walk-ins, code validation, exits.
    Guard,
}

impl Role {
    /// Returns the string representation stored in the accounts table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Resident => "resident",
            Self::Guard => "guard",
        }
    }

    /// Parses a role from its stored representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "resident" => Some(Self::Resident),
            "guard" => Some(Self::Guard),
            _ => None,
        }
    }
}

/// An authenticated actor with an associated role and tenant scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The backing account's identifier.
    pub account_id: i64,
    /// The account's login name.
    pub login_name: String,
    /// The role assigned to this actor.
    pub role: Role,
    /// The building this actor belongs to. Absent for super admins.
    pub building_id: Option<i64>,
    /// The resident profile behind this actor, if the role is Resident.
    pub profile_id: Option<i64>,
}

impl AuthenticatedActor {
    /// Checks that the actor may act within the given building.
    ///
    /// Super admins pass for any building; everyone else must belong to it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the actor belongs to a different
    /// building (or to none).
    pub fn require_building(&self, building_id: i64) -> Result<(), AuthError> {
        if self.role == Role::SuperAdmin || self.building_id == Some(building_id) {
            return Ok(());
        }
        Err(AuthError::Forbidden {
            action: String::from("access_building"),
            reason: format!("actor does not belong to building {building_id}"),
        })
    }
}

/// Authorization service for enforcing role-based access control.
///
/// One function per operation; every role is matched exhaustively so a
/// new role cannot silently inherit permissions.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Only super admins may provision or list buildings.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the `SuperAdmin` role.
    pub fn authorize_provision_building(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::SuperAdmin => Ok(()),
            Role::Admin | Role::Resident | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("provision_building"),
                required_role: String::from("SuperAdmin"),
            }),
        }
    }

    /// Only building admins may register or verify residents.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_residents(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::SuperAdmin | Role::Resident | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("manage_residents"),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Admins and gate staff may browse the resident register.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor holds neither role.
    pub fn authorize_view_residents(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Guard => Ok(()),
            Role::SuperAdmin | Role::Resident => Err(AuthError::Unauthorized {
                action: String::from("view_residents"),
                required_role: String::from("Admin or Guard"),
            }),
        }
    }

    /// Only residents may issue pre-approved passes.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Resident role.
    pub fn authorize_issue_pass(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Resident => Ok(()),
            Role::SuperAdmin | Role::Admin | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("issue_pass"),
                required_role: String::from("Resident"),
            }),
        }
    }

    /// Only gate staff may log walk-ins, validate codes, and record exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Guard role.
    pub fn authorize_gate_entry(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Guard => Ok(()),
            Role::SuperAdmin | Role::Admin | Role::Resident => Err(AuthError::Unauthorized {
                action: String::from("gate_entry"),
                required_role: String::from("Guard"),
            }),
        }
    }

    /// Only residents may approve or deny their own walk-in requests.
    ///
    /// Ownership of the specific visitor is checked separately by the
    /// handler; this gate is role-level only.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Resident role.
    pub fn authorize_decide(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Resident => Ok(()),
            Role::SuperAdmin | Role::Admin | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("decide"),
                required_role: String::from("Resident"),
            }),
        }
    }

    /// Only building admins may create amenities.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_amenities(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::SuperAdmin | Role::Resident | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("manage_amenities"),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Only residents may propose bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Resident role.
    pub fn authorize_propose_booking(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Resident => Ok(()),
            Role::SuperAdmin | Role::Admin | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("propose_booking"),
                required_role: String::from("Resident"),
            }),
        }
    }

    /// The booking owner, a building admin, or a super admin may cancel.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` for anyone else.
    pub fn authorize_cancel_booking(
        actor: &AuthenticatedActor,
        owner_profile_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::SuperAdmin | Role::Admin => Ok(()),
            Role::Resident if actor.profile_id == Some(owner_profile_id) => Ok(()),
            Role::Resident | Role::Guard => Err(AuthError::Forbidden {
                action: String::from("cancel_booking"),
                reason: String::from("not the booking owner and not an admin"),
            }),
        }
    }

    /// Only building admins may post or delete notices.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_post_notice(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::SuperAdmin | Role::Resident | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("post_notice"),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Residents and admins may post to the community chat.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor holds neither role.
    pub fn authorize_post_chat(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Resident | Role::Admin => Ok(()),
            Role::SuperAdmin | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("post_chat"),
                required_role: String::from("Resident or Admin"),
            }),
        }
    }

    /// Only building admins may award achievements.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_award_achievement(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::SuperAdmin | Role::Resident | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("award_achievement"),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Super admins may create any account; building admins may create
    /// resident and guard accounts in their own building.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not create an account with the
    /// target role.
    pub fn authorize_create_account(
        actor: &AuthenticatedActor,
        target_role: Role,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::SuperAdmin => Ok(()),
            Role::Admin => match target_role {
                Role::Resident | Role::Guard => Ok(()),
                Role::SuperAdmin | Role::Admin => Err(AuthError::Unauthorized {
                    action: String::from("create_account"),
                    required_role: String::from("SuperAdmin"),
                }),
            },
            Role::Resident | Role::Guard => Err(AuthError::Unauthorized {
                action: String::from("create_account"),
                required_role: String::from("SuperAdmin or Admin"),
            }),
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Session lifetime. Gate devices re-authenticate daily.
    const SESSION_EXPIRATION: Duration = Duration::hours(24);

    /// Authenticates an account by password and creates a session.
    ///
    /// Unknown logins and wrong passwords produce the same error so the
    /// response does not reveal which logins exist.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `login_name` - The account login name
    /// * `password` - The plain-text password to verify
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `account_data`).
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, AccountData), AuthError> {
        let account: AccountData = persistence
            .get_account_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid login or password"),
            })?;

        if account.disabled() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let password_ok: bool =
            bcrypt::verify(password, &account.password_hash).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Password verification failed: {e}"),
                }
            })?;
        if !password_ok {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Invalid login or password"),
            });
        }

        let actor: AuthenticatedActor = Self::actor_from_account(&account)?;

        let session_token: String = Self::generate_session_token();

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let session = SessionData {
            session_token: session_token.clone(),
            account_id: account.account_id,
            created_at: format_timestamp(now)?,
            expires_at: format_timestamp(now + Self::SESSION_EXPIRATION)?,
        };

        persistence
            .create_session(&session)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        Ok((session_token, actor, account))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `session_token` - The session token to validate
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or expired, or the
    /// backing account is gone or disabled.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, AccountData), AuthError> {
        let session: SessionData = persistence
            .get_session(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(
            &session.expires_at,
            &time::format_description::well_known::Iso8601::DEFAULT,
        )
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to parse session expiration: {e}"),
        })?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let account: AccountData = persistence
            .get_account_by_id(session.account_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        if account.disabled() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let actor: AuthenticatedActor = Self::actor_from_account(&account)?;

        Ok((actor, account))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;

        Ok(())
    }

    /// Builds an actor from a stored account, parsing the role string once.
    fn actor_from_account(account: &AccountData) -> Result<AuthenticatedActor, AuthError> {
        let role: Role =
            Role::parse(&account.role).ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", account.role),
            })?;

        Ok(AuthenticatedActor {
            account_id: account.account_id,
            login_name: account.login_name.clone(),
            role,
            building_id: account.building_id,
            profile_id: account.profile_id,
        })
    }

    /// Generates a session token.
    fn generate_session_token() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let timestamp: u128 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        format!("session_{timestamp}_{:016x}", rand::random::<u64>())
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionExpired(msg) | PersistenceError::SessionNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}

/// Formats a timestamp as ISO 8601.
fn format_timestamp(value: OffsetDateTime) -> Result<String, AuthError> {
    value
        .format(&time::format_description::well_known::Iso8601::DEFAULT)
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to format timestamp: {e}"),
        })
}
