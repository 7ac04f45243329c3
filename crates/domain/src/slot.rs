// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Half-open time slots and amenity operating hours.
//!
//! Bookings reserve a `[start, end)` interval of same-day wall-clock time.
//! The end instant is excluded, so a booking ending at 11:00 and another
//! starting at 11:00 do not conflict.
//!
//! ## Invariants
//!
//! - `start < end` for every slot
//! - `open < close` for every set of operating hours
//! - No timezone modeling: times are naive wall-clock values

use crate::error::DomainError;
use chrono::NaiveTime;

/// A half-open `[start, end)` interval of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    /// Inclusive start time.
    start: NaiveTime,
    /// Exclusive end time.
    end: NaiveTime,
}

impl TimeSlot {
    /// Creates a new `TimeSlot`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if `start >= end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a slot from `HH:MM` (or `HH:MM:SS`) strings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TimeParseError` if either string is malformed,
    /// or `DomainError::InvalidTimeRange` if `start >= end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Self::new(parse_wall_clock(start)?, parse_wall_clock(end)?)
    }

    /// Returns the inclusive start time.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the exclusive end time.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns true if two half-open intervals overlap.
    ///
    /// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
    /// Touching boundaries are not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// An amenity's daily operating window.
///
/// Unlike [`TimeSlot`], the window is treated as inclusive at both ends:
/// a booking may start exactly at `open` and end exactly at `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    /// Opening time.
    open: NaiveTime,
    /// Closing time.
    close: NaiveTime,
}

impl OperatingHours {
    /// Creates new `OperatingHours`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOperatingHours` if `open >= close`.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, DomainError> {
        if open >= close {
            return Err(DomainError::InvalidOperatingHours { open, close });
        }
        Ok(Self { open, close })
    }

    /// Parses operating hours from `HH:MM` (or `HH:MM:SS`) strings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TimeParseError` if either string is malformed,
    /// or `DomainError::InvalidOperatingHours` if `open >= close`.
    pub fn parse(open: &str, close: &str) -> Result<Self, DomainError> {
        Self::new(parse_wall_clock(open)?, parse_wall_clock(close)?)
    }

    /// Returns the opening time.
    #[must_use]
    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    /// Returns the closing time.
    #[must_use]
    pub const fn close(&self) -> NaiveTime {
        self.close
    }

    /// Returns true if the slot falls entirely within the operating window.
    #[must_use]
    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.open <= slot.start() && slot.end() <= self.close
    }
}

impl std::fmt::Display for OperatingHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.open.format("%H:%M"),
            self.close.format("%H:%M")
        )
    }
}

/// Finds the first existing slot that overlaps the proposed slot, if any.
///
/// This is a linear scan; the number of bookings per amenity per day is
/// small enough that nothing cleverer is warranted.
#[must_use]
pub fn find_conflict<'a>(proposed: &TimeSlot, existing: &'a [TimeSlot]) -> Option<&'a TimeSlot> {
    existing.iter().find(|slot| slot.overlaps(proposed))
}

/// Parses a wall-clock time, accepting `HH:MM` and `HH:MM:SS`.
fn parse_wall_clock(value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| DomainError::TimeParseError {
            value: value.to_string(),
        })
}
