// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invite-code generation.
//!
//! Codes are drawn uniformly from 100000-999999. Uniqueness among a
//! building's pending passes is enforced by a storage-level index, not by
//! pre-checking: the issuing operation retries with a fresh code when the
//! insert reports a collision.

use gatehouse_domain::{DomainError, InviteCode};
use rand::RngExt;

/// How many collisions the issuing operation tolerates before giving up.
///
/// With 900,000 possible codes and at most a few hundred pending passes
/// per building, hitting this limit means something is broken, not
/// unlucky.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// Generates a uniform random six-digit invite code.
///
/// # Errors
///
/// Never fails in practice: the sampled value is within the range
/// [`InviteCode`] accepts by construction.
pub fn generate_invite_code() -> Result<InviteCode, DomainError> {
    let value: u32 = rand::rng().random_range(InviteCode::MIN..=InviteCode::MAX);
    InviteCode::from_numeric(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_in_range() {
        for _ in 0..200 {
            let code = generate_invite_code().unwrap();
            let numeric: u32 = code.value().parse().unwrap();
            assert!((InviteCode::MIN..=InviteCode::MAX).contains(&numeric));
            assert_eq!(code.value().len(), 6);
        }
    }
}
