// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visitor status tracking and transition logic.
//!
//! This module defines the visitor lifecycle states and valid transitions.
//! Transitions are actor-initiated only (resident, gate staff, or the
//! notification callback); the system never advances status based on time.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Visitor lifecycle states.
///
/// Status is tracked per visitor, per building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    /// Pre-approved pass issued, invite code not yet used at the gate.
    Pending,
    /// Walk-in logged at the gate, awaiting the resident's decision.
    WaitingApproval,
    /// Visitor is inside the premises.
    Entered,
    /// Visitor has left the premises.
    Exited,
    /// The resident denied entry.
    Rejected,
}

impl VisitorStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WaitingApproval => "waiting_approval",
            Self::Entered => "entered",
            Self::Exited => "exited",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVisitorStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "waiting_approval" => Ok(Self::WaitingApproval),
            "entered" => Ok(Self::Entered),
            "exited" => Ok(Self::Exited),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidVisitorStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited | Self::Rejected)
    }

    /// Returns true if `check_in_at` must be stamped when entering this status.
    #[must_use]
    pub const fn stamps_check_in(&self) -> bool {
        matches!(self, Self::Entered)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        // Terminal states are never resurrected
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            // A pending pass is consumed at the gate
            Self::Pending => matches!(new_status, Self::Entered),
            // A walk-in is approved or denied by the resident
            Self::WaitingApproval => matches!(new_status, Self::Entered | Self::Rejected),
            // A visitor inside can only leave
            Self::Entered => matches!(new_status, Self::Exited),
            Self::Exited | Self::Rejected => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by visitor lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for VisitorStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        let statuses = vec![
            VisitorStatus::Pending,
            VisitorStatus::WaitingApproval,
            VisitorStatus::Entered,
            VisitorStatus::Exited,
            VisitorStatus::Rejected,
        ];

        for status in statuses {
            let s = status.as_str();
            match VisitorStatus::parse_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_status_string() {
        let result = VisitorStatus::parse_str("loitering");
        assert!(result.is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!VisitorStatus::Pending.is_terminal());
        assert!(!VisitorStatus::WaitingApproval.is_terminal());
        assert!(!VisitorStatus::Entered.is_terminal());
        assert!(VisitorStatus::Exited.is_terminal());
        assert!(VisitorStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_pending_only_transitions_to_entered() {
        let current = VisitorStatus::Pending;

        assert!(current.validate_transition(VisitorStatus::Entered).is_ok());
        assert!(
            current
                .validate_transition(VisitorStatus::WaitingApproval)
                .is_err()
        );
        assert!(current.validate_transition(VisitorStatus::Exited).is_err());
        assert!(
            current
                .validate_transition(VisitorStatus::Rejected)
                .is_err()
        );
    }

    #[test]
    fn test_waiting_approval_transitions() {
        let current = VisitorStatus::WaitingApproval;

        assert!(current.validate_transition(VisitorStatus::Entered).is_ok());
        assert!(current.validate_transition(VisitorStatus::Rejected).is_ok());
        assert!(current.validate_transition(VisitorStatus::Exited).is_err());
        assert!(current.validate_transition(VisitorStatus::Pending).is_err());
    }

    #[test]
    fn test_entered_only_transitions_to_exited() {
        let current = VisitorStatus::Entered;

        assert!(current.validate_transition(VisitorStatus::Exited).is_ok());
        assert!(
            current
                .validate_transition(VisitorStatus::Rejected)
                .is_err()
        );
        assert!(current.validate_transition(VisitorStatus::Pending).is_err());
    }

    #[test]
    fn test_no_transitions_from_terminal_states() {
        let terminal_states = vec![VisitorStatus::Exited, VisitorStatus::Rejected];

        for terminal in terminal_states {
            assert!(
                terminal
                    .validate_transition(VisitorStatus::Entered)
                    .is_err()
            );
            assert!(terminal.validate_transition(VisitorStatus::Exited).is_err());
            assert!(
                terminal
                    .validate_transition(VisitorStatus::Pending)
                    .is_err()
            );
        }
    }

    #[test]
    fn test_check_in_stamping() {
        assert!(VisitorStatus::Entered.stamps_check_in());
        assert!(!VisitorStatus::Exited.stamps_check_in());
        assert!(!VisitorStatus::Pending.stamps_check_in());
    }
}
