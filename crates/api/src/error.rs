// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use gatehouse::CoreError;
use gatehouse_domain::DomainError;
use gatehouse_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor's role does not permit the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The actor's role permits the action, but not on this record.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why the action was refused.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: cannot '{action}': {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent
/// the API contract. All variants are recoverable, user-facing outcomes:
/// the server surfaces them verbatim and none crash the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role does not permit the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The actor's role permits the action, but not on this record.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why the action was refused.
        reason: String,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A state transition was attempted from a state that forbids it.
    InvalidState {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A time range does not satisfy `start < end`.
    InvalidRange {
        /// A human-readable description of the error.
        message: String,
    },
    /// A booking falls outside the amenity's operating hours.
    OutsideOperatingHours {
        /// A human-readable description of the error.
        message: String,
    },
    /// A booking overlaps an existing reservation.
    SlotOccupied {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: cannot '{action}': {reason}")
            }
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidState { message } => write!(f, "Invalid state: {message}"),
            Self::InvalidRange { message } => write!(f, "Invalid range: {message}"),
            Self::OutsideOperatingHours { message } => write!(f, "{message}"),
            Self::SlotOccupied { message } => write!(f, "{message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::Forbidden { action, reason } => Self::Forbidden { action, reason },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidStatusTransition { from, to, reason } => ApiError::InvalidState {
            message: format!("Cannot transition visitor from '{from}' to '{to}': {reason}"),
        },
        DomainError::InvalidTimeRange { start, end } => ApiError::InvalidRange {
            message: format!("Start time {start} must be before end time {end}"),
        },
        DomainError::OutsideOperatingHours {
            start,
            end,
            open,
            close,
        } => ApiError::OutsideOperatingHours {
            message: format!("Slot {start}-{end} is outside operating hours {open}-{close}"),
        },
        DomainError::SlotOccupied {
            start,
            end,
            taken_start,
            taken_end,
        } => ApiError::SlotOccupied {
            message: format!(
                "Slot {start}-{end} overlaps an existing booking {taken_start}-{taken_end}"
            ),
        },
        DomainError::ResidentNotVerified { flat } => ApiError::Unauthorized {
            action: String::from("request_walk_in_entry"),
            required_role: format!("verified resident in flat {flat}"),
        },
        DomainError::InvalidVisitorStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{status}' is not a visitor status"),
        },
        DomainError::InvalidVisitorType { visitor_type } => ApiError::InvalidInput {
            field: String::from("visitor_type"),
            message: format!("'{visitor_type}' is not a visitor type"),
        },
        DomainError::InvalidInviteCode(msg) => ApiError::InvalidInput {
            field: String::from("invite_code"),
            message: msg,
        },
        DomainError::InvalidFlat(msg) => ApiError::InvalidInput {
            field: String::from("flat"),
            message: msg,
        },
        DomainError::InvalidGuestName(msg) => ApiError::InvalidInput {
            field: String::from("guest_name"),
            message: msg,
        },
        DomainError::InvalidPhone(msg) => ApiError::InvalidInput {
            field: String::from("phone"),
            message: msg,
        },
        DomainError::InvalidPurpose(msg) => ApiError::InvalidInput {
            field: String::from("purpose"),
            message: msg,
        },
        DomainError::InvalidBuildingName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidAmenityName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidNotice(msg) => ApiError::InvalidInput {
            field: String::from("notice"),
            message: msg,
        },
        DomainError::InvalidMessageBody(msg) => ApiError::InvalidInput {
            field: String::from("body"),
            message: msg,
        },
        DomainError::InvalidOperatingHours { open, close } => ApiError::InvalidInput {
            field: String::from("hours"),
            message: format!("Opening time {open} must be before closing time {close}"),
        },
        DomainError::TimeParseError { value } => ApiError::InvalidInput {
            field: String::from("time"),
            message: format!("Failed to parse time '{value}': expected HH:MM"),
        },
        DomainError::DateParseError { value } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{value}': expected YYYY-MM-DD"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Infrastructure failures become `Internal`; the guarded-transition and
/// in-transaction rule failures become their user-facing counterparts.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::NotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::TransitionConflict {
            visitor_id,
            expected,
            actual,
        } => ApiError::InvalidState {
            message: format!(
                "Visitor {visitor_id} is '{actual}', not '{expected}': another actor acted first"
            ),
        },
        PersistenceError::RuleViolation(domain_err) => translate_domain_error(domain_err),
        other => ApiError::Internal {
            message: format!("Persistence error: {other}"),
        },
    }
}
