// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure visitor lifecycle transitions.
//!
//! Every function here either constructs a fresh [`Visitor`] or derives the
//! next value of an existing one. Nothing performs I/O and nothing reads a
//! clock: timestamps are passed in as ISO 8601 strings by the caller.
//!
//! The legality of each transition is decided by
//! [`VisitorStatus::validate_transition`]; the persistence layer enforces
//! the same guard as a conditional write, so a second actor racing on the
//! same record fails with a clean conflict instead of corrupting state.

use crate::error::CoreError;
use gatehouse_domain::{
    Flat, InviteCode, Visitor, VisitorStatus, VisitorType, validate_guest_name, validate_phone,
    validate_purpose,
};

/// The guest details supplied when creating a visitor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestInfo {
    /// The guest's name.
    pub name: String,
    /// The guest's phone number.
    pub phone: String,
    /// The purpose of the visit.
    pub purpose: String,
}

impl GuestInfo {
    /// Validates all guest fields.
    fn validate(&self) -> Result<(), CoreError> {
        validate_guest_name(&self.name)?;
        validate_phone(&self.phone)?;
        validate_purpose(&self.purpose)?;
        Ok(())
    }
}

/// Constructs a pre-approved visitor holding a single-use invite code.
///
/// The resulting visitor is `Pending` until the code is used at the gate.
///
/// # Errors
///
/// Returns an error if any guest field fails validation.
pub fn issue_pass(
    building_id: i64,
    flat: Flat,
    guest: GuestInfo,
    code: InviteCode,
    now: &str,
) -> Result<Visitor, CoreError> {
    guest.validate()?;

    Ok(Visitor {
        visitor_id: None,
        building_id,
        flat,
        guest_name: guest.name,
        phone: guest.phone,
        purpose: guest.purpose,
        visitor_type: VisitorType::PreApproved,
        status: VisitorStatus::Pending,
        invite_code: Some(code),
        check_in_at: None,
        check_out_at: None,
        created_at: now.to_string(),
    })
}

/// Constructs a walk-in visitor awaiting the resident's decision.
///
/// # Errors
///
/// Returns an error if any guest field fails validation.
pub fn receive_walk_in(
    building_id: i64,
    flat: Flat,
    guest: GuestInfo,
    now: &str,
) -> Result<Visitor, CoreError> {
    guest.validate()?;

    Ok(Visitor {
        visitor_id: None,
        building_id,
        flat,
        guest_name: guest.name,
        phone: guest.phone,
        purpose: guest.purpose,
        visitor_type: VisitorType::WalkIn,
        status: VisitorStatus::WaitingApproval,
        invite_code: None,
        check_in_at: None,
        check_out_at: None,
        created_at: now.to_string(),
    })
}

/// Constructs a walk-in visitor cleared directly by gate staff.
///
/// The visitor is created `Entered` with `check_in_at` stamped; no
/// resident decision is involved.
///
/// # Errors
///
/// Returns an error if any guest field fails validation.
pub fn clear_walk_in(
    building_id: i64,
    flat: Flat,
    guest: GuestInfo,
    now: &str,
) -> Result<Visitor, CoreError> {
    guest.validate()?;

    Ok(Visitor {
        visitor_id: None,
        building_id,
        flat,
        guest_name: guest.name,
        phone: guest.phone,
        purpose: guest.purpose,
        visitor_type: VisitorType::WalkIn,
        status: VisitorStatus::Entered,
        invite_code: None,
        check_in_at: Some(now.to_string()),
        check_out_at: None,
        created_at: now.to_string(),
    })
}

/// Admits a visitor through the gate.
///
/// Legal from `Pending` (invite code validated) and from
/// `WaitingApproval` (resident approved). Stamps `check_in_at`.
///
/// # Errors
///
/// Returns an error if the current status does not permit entry.
pub fn admit(visitor: &Visitor, now: &str) -> Result<Visitor, CoreError> {
    visitor
        .status
        .validate_transition(VisitorStatus::Entered)?;

    let mut next = visitor.clone();
    next.status = VisitorStatus::Entered;
    next.check_in_at = Some(now.to_string());
    Ok(next)
}

/// Applies a resident's decision to a walk-in awaiting approval.
///
/// Approval admits the visitor (stamping `check_in_at`); denial moves it
/// to `Rejected`. A second decision on an already-decided visitor fails:
/// callers must treat that as a conflict, never as a no-op.
///
/// # Errors
///
/// Returns an error if the visitor is not `WaitingApproval`.
pub fn decide(visitor: &Visitor, approve: bool, now: &str) -> Result<Visitor, CoreError> {
    let target = if approve {
        VisitorStatus::Entered
    } else {
        VisitorStatus::Rejected
    };

    // Deciding is only meaningful for walk-ins awaiting approval; a pending
    // pre-approved pass is consumed at the gate, never decided.
    if visitor.status != VisitorStatus::WaitingApproval {
        return Err(CoreError::DomainViolation(
            gatehouse_domain::DomainError::InvalidStatusTransition {
                from: visitor.status.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: "only visitors awaiting approval can be decided".to_string(),
            },
        ));
    }
    visitor.status.validate_transition(target)?;

    let mut next = visitor.clone();
    next.status = target;
    if approve {
        next.check_in_at = Some(now.to_string());
    }
    Ok(next)
}

/// Records a visitor leaving the premises.
///
/// Legal only from `Entered`. Stamps `check_out_at`.
///
/// # Errors
///
/// Returns an error if the visitor is not `Entered`.
pub fn record_exit(visitor: &Visitor, now: &str) -> Result<Visitor, CoreError> {
    visitor.status.validate_transition(VisitorStatus::Exited)?;

    let mut next = visitor.clone();
    next.status = VisitorStatus::Exited;
    next.check_out_at = Some(now.to_string());
    Ok(next)
}
