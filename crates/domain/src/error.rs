// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveTime;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A visitor status transition is not permitted by the lifecycle rules.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// A visitor status string is not recognized.
    InvalidVisitorStatus {
        /// The unrecognized status string.
        status: String,
    },
    /// A visitor type string is not recognized.
    InvalidVisitorType {
        /// The unrecognized type string.
        visitor_type: String,
    },
    /// An invite code is not a six-digit decimal string.
    InvalidInviteCode(String),
    /// A flat identifier is malformed.
    InvalidFlat(String),
    /// A guest name is empty or invalid.
    InvalidGuestName(String),
    /// A phone number is malformed.
    InvalidPhone(String),
    /// A visit purpose is empty or invalid.
    InvalidPurpose(String),
    /// A building name is empty or invalid.
    InvalidBuildingName(String),
    /// An amenity name is empty or invalid.
    InvalidAmenityName(String),
    /// A notice title or body is empty or invalid.
    InvalidNotice(String),
    /// A chat message body is empty or invalid.
    InvalidMessageBody(String),
    /// A booking interval does not satisfy `start < end`.
    InvalidTimeRange {
        /// The requested start time.
        start: NaiveTime,
        /// The requested end time.
        end: NaiveTime,
    },
    /// A booking interval falls outside the amenity's operating hours.
    OutsideOperatingHours {
        /// The requested start time.
        start: NaiveTime,
        /// The requested end time.
        end: NaiveTime,
        /// The amenity's opening time.
        open: NaiveTime,
        /// The amenity's closing time.
        close: NaiveTime,
    },
    /// A booking interval overlaps an existing reservation.
    SlotOccupied {
        /// The requested start time.
        start: NaiveTime,
        /// The requested end time.
        end: NaiveTime,
        /// The conflicting reservation's start time.
        taken_start: NaiveTime,
        /// The conflicting reservation's end time.
        taken_end: NaiveTime,
    },
    /// Operating hours do not satisfy `open < close`.
    InvalidOperatingHours {
        /// The opening time.
        open: NaiveTime,
        /// The closing time.
        close: NaiveTime,
    },
    /// Failed to parse a wall-clock time from a string.
    TimeParseError {
        /// The invalid time string.
        value: String,
    },
    /// Failed to parse a calendar date from a string.
    DateParseError {
        /// The invalid date string.
        value: String,
    },
    /// The flat does not resolve to a verified resident profile.
    ResidentNotVerified {
        /// The flat identifier.
        flat: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition visitor from '{from}' to '{to}': {reason}")
            }
            Self::InvalidVisitorStatus { status } => {
                write!(f, "Invalid visitor status: '{status}'")
            }
            Self::InvalidVisitorType { visitor_type } => {
                write!(f, "Invalid visitor type: '{visitor_type}'")
            }
            Self::InvalidInviteCode(msg) => write!(f, "Invalid invite code: {msg}"),
            Self::InvalidFlat(msg) => write!(f, "Invalid flat: {msg}"),
            Self::InvalidGuestName(msg) => write!(f, "Invalid guest name: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone number: {msg}"),
            Self::InvalidPurpose(msg) => write!(f, "Invalid purpose: {msg}"),
            Self::InvalidBuildingName(msg) => write!(f, "Invalid building name: {msg}"),
            Self::InvalidAmenityName(msg) => write!(f, "Invalid amenity name: {msg}"),
            Self::InvalidNotice(msg) => write!(f, "Invalid notice: {msg}"),
            Self::InvalidMessageBody(msg) => write!(f, "Invalid message body: {msg}"),
            Self::InvalidTimeRange { start, end } => {
                write!(f, "Invalid time range: start {start} must be before end {end}")
            }
            Self::OutsideOperatingHours {
                start,
                end,
                open,
                close,
            } => {
                write!(
                    f,
                    "Requested slot {start}-{end} is outside operating hours {open}-{close}"
                )
            }
            Self::SlotOccupied {
                start,
                end,
                taken_start,
                taken_end,
            } => {
                write!(
                    f,
                    "Requested slot {start}-{end} overlaps an existing booking {taken_start}-{taken_end}"
                )
            }
            Self::InvalidOperatingHours { open, close } => {
                write!(
                    f,
                    "Invalid operating hours: open {open} must be before close {close}"
                )
            }
            Self::TimeParseError { value } => {
                write!(f, "Failed to parse time '{value}': expected HH:MM")
            }
            Self::DateParseError { value } => {
                write!(f, "Failed to parse date '{value}': expected YYYY-MM-DD")
            }
            Self::ResidentNotVerified { flat } => {
                write!(f, "Flat '{flat}' does not resolve to a verified resident")
            }
        }
    }
}

impl std::error::Error for DomainError {}
