// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single-use numeric gate code attached to a pre-approved visitor.
///
/// Codes are six decimal digits in the range 100000-999999. Uniqueness among
/// currently-pending visitors of a building is enforced by the storage layer;
/// this type only guarantees the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteCode {
    /// The six-digit code value.
    value: String,
}

impl InviteCode {
    /// The smallest valid code value.
    pub const MIN: u32 = 100_000;
    /// The largest valid code value.
    pub const MAX: u32 = 999_999;

    /// Creates a new `InviteCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInviteCode` if the string is not exactly
    /// six decimal digits or falls outside 100000-999999.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidInviteCode(format!(
                "'{value}' is not a six-digit decimal string"
            )));
        }

        // Leading zeros fall outside the issued range
        let numeric: u32 = value
            .parse()
            .map_err(|_| DomainError::InvalidInviteCode(format!("'{value}' is not numeric")))?;
        if numeric < Self::MIN {
            return Err(DomainError::InvalidInviteCode(format!(
                "'{value}' is outside the issued range"
            )));
        }

        Ok(Self {
            value: value.to_string(),
        })
    }

    /// Creates an `InviteCode` from a numeric value in the issued range.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInviteCode` if the value falls outside
    /// 100000-999999.
    pub fn from_numeric(value: u32) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::InvalidInviteCode(format!(
                "{value} is outside the issued range"
            )));
        }
        Ok(Self {
            value: value.to_string(),
        })
    }

    /// Returns the code value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for InviteCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code() {
        let code = InviteCode::new("483920").unwrap();
        assert_eq!(code.value(), "483920");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(InviteCode::new("12345").is_err());
        assert!(InviteCode::new("1234567").is_err());
        assert!(InviteCode::new("").is_err());
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(InviteCode::new("12a456").is_err());
        assert!(InviteCode::new("12 456").is_err());
        assert!(InviteCode::new("-12345").is_err());
    }

    #[test]
    fn test_rejects_leading_zero() {
        // 099999 is six digits but below the issued range
        assert!(InviteCode::new("099999").is_err());
    }

    #[test]
    fn test_from_numeric_bounds() {
        assert!(InviteCode::from_numeric(InviteCode::MIN).is_ok());
        assert!(InviteCode::from_numeric(InviteCode::MAX).is_ok());
        assert!(InviteCode::from_numeric(InviteCode::MIN - 1).is_err());
        assert!(InviteCode::from_numeric(InviteCode::MAX + 1).is_err());
    }
}
