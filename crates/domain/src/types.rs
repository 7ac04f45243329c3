// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::invite_code::InviteCode;
use crate::slot::{OperatingHours, TimeSlot};
use crate::visitor_status::VisitorStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classifies how a visitor arrived at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorType {
    /// Created in advance by a resident, with a single-use invite code.
    PreApproved,
    /// Arrived without a code; needs gate clearance or resident approval.
    WalkIn,
}

impl VisitorType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreApproved => "pre_approved",
            Self::WalkIn => "walk_in",
        }
    }
}

impl FromStr for VisitorType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre_approved" => Ok(Self::PreApproved),
            "walk_in" => Ok(Self::WalkIn),
            _ => Err(DomainError::InvalidVisitorType {
                visitor_type: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for VisitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resident's flat, identified by wing and flat number within a building.
///
/// The canonical text form is `WING-NUMBER`, e.g. `B-404`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flat {
    /// The wing letter(s), normalized to uppercase.
    wing: String,
    /// The flat number within the wing.
    number: u16,
}

impl Flat {
    /// Creates a new `Flat`.
    ///
    /// Wings are normalized to uppercase so `b-404` and `B-404` are the
    /// same flat.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFlat` if the wing is not 1-2 ASCII
    /// letters or the number is zero.
    pub fn new(wing: &str, number: u16) -> Result<Self, DomainError> {
        if wing.is_empty() || wing.len() > 2 || !wing.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidFlat(format!(
                "wing '{wing}' must be 1-2 letters"
            )));
        }
        if number == 0 {
            return Err(DomainError::InvalidFlat(
                "flat number must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            wing: wing.to_uppercase(),
            number,
        })
    }

    /// Returns the wing letter(s).
    #[must_use]
    pub fn wing(&self) -> &str {
        &self.wing
    }

    /// Returns the flat number.
    #[must_use]
    pub const fn number(&self) -> u16 {
        self.number
    }
}

impl FromStr for Flat {
    type Err = DomainError;

    /// Parses the canonical `WING-NUMBER` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (wing, number) = s
            .split_once('-')
            .ok_or_else(|| DomainError::InvalidFlat(format!("'{s}' is not WING-NUMBER")))?;
        let number: u16 = number
            .parse()
            .map_err(|_| DomainError::InvalidFlat(format!("'{s}' has a non-numeric flat number")))?;
        Self::new(wing, number)
    }
}

impl std::fmt::Display for Flat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.wing, self.number)
    }
}

/// A building: the unit of tenancy and data isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the building has not been persisted yet.
    pub building_id: Option<i64>,
    /// The building's display name.
    pub name: String,
    /// The building's street address.
    pub address: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// A resident profile within a building.
///
/// Only verified profiles may receive walk-in approval requests; the
/// `verified` flag is flipped by a building admin after move-in checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The canonical numeric identifier assigned by the database.
    pub profile_id: Option<i64>,
    /// The building this profile belongs to.
    pub building_id: i64,
    /// The resident's flat.
    pub flat: Flat,
    /// The resident's name.
    pub name: String,
    /// The resident's phone number.
    pub phone: String,
    /// Whether a building admin has verified this resident.
    pub verified: bool,
    /// Telegram chat identifier for gate notifications, if registered.
    pub telegram_chat_id: Option<String>,
    /// Web-push endpoint for gate notifications, if registered.
    pub push_endpoint: Option<String>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// A visitor record moving through the gate-pass lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    /// The canonical numeric identifier assigned by the database.
    pub visitor_id: Option<i64>,
    /// The building this visitor belongs to.
    pub building_id: i64,
    /// The flat being visited.
    pub flat: Flat,
    /// The guest's name.
    pub guest_name: String,
    /// The guest's phone number.
    pub phone: String,
    /// The purpose of the visit.
    pub purpose: String,
    /// How the visitor arrived.
    pub visitor_type: VisitorType,
    /// The visitor's current lifecycle status.
    pub status: VisitorStatus,
    /// The single-use invite code, present only for pre-approved visitors.
    pub invite_code: Option<InviteCode>,
    /// When the visitor entered (ISO 8601). Set exactly once, on entry.
    pub check_in_at: Option<String>,
    /// When the visitor left (ISO 8601). Set exactly once, on exit.
    pub check_out_at: Option<String>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// A bookable amenity within a building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amenity {
    /// The canonical numeric identifier assigned by the database.
    pub amenity_id: Option<i64>,
    /// The building this amenity belongs to.
    pub building_id: i64,
    /// The amenity's display name (e.g. "Pool").
    pub name: String,
    /// The daily operating window.
    pub hours: OperatingHours,
}

/// An amenity reservation for a single date and time slot.
///
/// Bookings are never updated in place; cancellation deletes the record
/// and a new proposal creates a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// The canonical numeric identifier assigned by the database.
    pub booking_id: Option<i64>,
    /// The building this booking belongs to.
    pub building_id: i64,
    /// The amenity being reserved.
    pub amenity_id: i64,
    /// The owning resident profile.
    pub profile_id: i64,
    /// The resident's name, denormalized for display.
    pub resident_name: String,
    /// The resident's flat.
    pub flat: Flat,
    /// The calendar date of the reservation.
    pub date: NaiveDate,
    /// The reserved `[start, end)` slot.
    pub slot: TimeSlot,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// A building-wide notice posted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// The canonical numeric identifier assigned by the database.
    pub notice_id: Option<i64>,
    /// The building this notice belongs to.
    pub building_id: i64,
    /// The notice title.
    pub title: String,
    /// The notice body.
    pub body: String,
    /// The posting profile's identifier, if posted by a resident-backed account.
    pub posted_by: Option<i64>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// A message in a building's community chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The canonical numeric identifier assigned by the database.
    pub message_id: Option<i64>,
    /// The building this message belongs to.
    pub building_id: i64,
    /// The sending profile's identifier, if the sender has one.
    pub sender_profile_id: Option<i64>,
    /// The sender's name, denormalized for display.
    pub sender_name: String,
    /// The message body.
    pub body: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// A recognition awarded to a resident by a building admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// The canonical numeric identifier assigned by the database.
    pub achievement_id: Option<i64>,
    /// The building this achievement belongs to.
    pub building_id: i64,
    /// The recognized resident profile.
    pub profile_id: i64,
    /// The achievement title.
    pub title: String,
    /// The achievement description.
    pub description: String,
    /// Award timestamp (ISO 8601).
    pub awarded_at: String,
}

/// Parses a calendar date from its `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is malformed.
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DomainError::DateParseError {
        value: value.to_string(),
    })
}
