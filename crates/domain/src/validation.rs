// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field validation for records created at the API boundary.

use crate::error::DomainError;

/// Maximum length for guest and resident names.
const MAX_NAME_LEN: usize = 120;

/// Maximum length for a visit purpose.
const MAX_PURPOSE_LEN: usize = 200;

/// Maximum length for a chat message body.
const MAX_MESSAGE_LEN: usize = 2000;

/// Maximum length for a notice body.
const MAX_NOTICE_BODY_LEN: usize = 5000;

/// Validates a guest name.
///
/// # Errors
///
/// Returns `DomainError::InvalidGuestName` if the name is empty,
/// whitespace-only, or too long.
pub fn validate_guest_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidGuestName(
            "name cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidGuestName(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a phone number.
///
/// Accepts 7-15 digits with an optional leading `+`.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhone` if the value is malformed.
pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidPhone(format!(
            "'{phone}' must be digits with an optional leading '+'"
        )));
    }
    if !(7..=15).contains(&digits.len()) {
        return Err(DomainError::InvalidPhone(format!(
            "'{phone}' must be 7-15 digits"
        )));
    }
    Ok(())
}

/// Validates a visit purpose.
///
/// # Errors
///
/// Returns `DomainError::InvalidPurpose` if the purpose is empty,
/// whitespace-only, or too long.
pub fn validate_purpose(purpose: &str) -> Result<(), DomainError> {
    let trimmed = purpose.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidPurpose(
            "purpose cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_PURPOSE_LEN {
        return Err(DomainError::InvalidPurpose(format!(
            "purpose cannot exceed {MAX_PURPOSE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a building name.
///
/// # Errors
///
/// Returns `DomainError::InvalidBuildingName` if the name is empty,
/// whitespace-only, or too long.
pub fn validate_building_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidBuildingName(
            "name cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidBuildingName(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a notice title and body.
///
/// # Errors
///
/// Returns `DomainError::InvalidNotice` if either part is empty,
/// whitespace-only, or too long.
pub fn validate_notice(title: &str, body: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidNotice("title cannot be empty".to_string()));
    }
    if title.trim().len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidNotice(format!(
            "title cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if body.trim().is_empty() {
        return Err(DomainError::InvalidNotice("body cannot be empty".to_string()));
    }
    if body.trim().len() > MAX_NOTICE_BODY_LEN {
        return Err(DomainError::InvalidNotice(format!(
            "body cannot exceed {MAX_NOTICE_BODY_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a chat message body.
///
/// # Errors
///
/// Returns `DomainError::InvalidMessageBody` if the body is empty,
/// whitespace-only, or too long.
pub fn validate_message_body(body: &str) -> Result<(), DomainError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidMessageBody(
            "message cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_MESSAGE_LEN {
        return Err(DomainError::InvalidMessageBody(format!(
            "message cannot exceed {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}
