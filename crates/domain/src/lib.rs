// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod invite_code;
mod slot;
mod types;
mod validation;
mod visitor_status;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use invite_code::InviteCode;
pub use slot::{OperatingHours, TimeSlot, find_conflict};
pub use types::{
    Achievement, Amenity, Booking, Building, ChatMessage, Flat, Notice, Profile, Visitor,
    VisitorType, parse_date,
};
pub use validation::{
    validate_building_name, validate_guest_name, validate_message_body, validate_notice,
    validate_phone, validate_purpose,
};
pub use visitor_status::VisitorStatus;
