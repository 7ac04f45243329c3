// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and conversions between stored rows and domain types.
//!
//! Rows mirror table column order exactly. Conversions back into domain
//! types re-validate stored strings; a row that no longer parses is
//! reported as `CorruptRecord` rather than silently coerced.

use crate::diesel_schema::{
    accounts, achievements, amenities, bookings, buildings, chat_messages, notices, profiles,
    sessions, visitors,
};
use crate::error::PersistenceError;
use diesel::prelude::*;
use gatehouse_domain::{
    Achievement, Amenity, Booking, Building, ChatMessage, Flat, InviteCode, Notice, OperatingHours,
    Profile, TimeSlot, Visitor, VisitorStatus, VisitorType, parse_date,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Converts a stored `(wing, flat_number)` pair back into a [`Flat`].
fn flat_from_row(wing: &str, flat_number: i32) -> Result<Flat, PersistenceError> {
    let number = u16::try_from(flat_number)
        .map_err(|_| PersistenceError::CorruptRecord(format!("flat number {flat_number}")))?;
    Flat::new(wing, number)
        .map_err(|e| PersistenceError::CorruptRecord(format!("flat {wing}-{flat_number}: {e}")))
}

#[derive(Debug, Clone, Queryable)]
pub struct BuildingRow {
    pub building_id: i64,
    pub name: String,
    pub address: String,
    pub created_at: String,
}

impl BuildingRow {
    pub fn into_domain(self) -> Building {
        Building {
            building_id: Some(self.building_id),
            name: self.name,
            address: self.address,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = buildings)]
pub struct NewBuilding {
    pub name: String,
    pub address: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable)]
pub struct ProfileRow {
    pub profile_id: i64,
    pub building_id: i64,
    pub wing: String,
    pub flat_number: i32,
    pub name: String,
    pub phone: String,
    pub verified: i32,
    pub telegram_chat_id: Option<String>,
    pub push_endpoint: Option<String>,
    pub created_at: String,
}

impl ProfileRow {
    pub fn into_domain(self) -> Result<Profile, PersistenceError> {
        let flat = flat_from_row(&self.wing, self.flat_number)?;
        Ok(Profile {
            profile_id: Some(self.profile_id),
            building_id: self.building_id,
            flat,
            name: self.name,
            phone: self.phone,
            verified: self.verified != 0,
            telegram_chat_id: self.telegram_chat_id,
            push_endpoint: self.push_endpoint,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub building_id: i64,
    pub wing: String,
    pub flat_number: i32,
    pub name: String,
    pub phone: String,
    pub verified: i32,
    pub telegram_chat_id: Option<String>,
    pub push_endpoint: Option<String>,
    pub created_at: String,
}

impl NewProfile {
    pub fn from_domain(profile: &Profile) -> Self {
        Self {
            building_id: profile.building_id,
            wing: profile.flat.wing().to_string(),
            flat_number: i32::from(profile.flat.number()),
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            verified: i32::from(profile.verified),
            telegram_chat_id: profile.telegram_chat_id.clone(),
            push_endpoint: profile.push_endpoint.clone(),
            created_at: profile.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct AmenityRow {
    pub amenity_id: i64,
    pub building_id: i64,
    pub name: String,
    pub open_time: String,
    pub close_time: String,
}

impl AmenityRow {
    pub fn into_domain(self) -> Result<Amenity, PersistenceError> {
        let hours = OperatingHours::parse(&self.open_time, &self.close_time).map_err(|e| {
            PersistenceError::CorruptRecord(format!("amenity {} hours: {e}", self.amenity_id))
        })?;
        Ok(Amenity {
            amenity_id: Some(self.amenity_id),
            building_id: self.building_id,
            name: self.name,
            hours,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = amenities)]
pub struct NewAmenity {
    pub building_id: i64,
    pub name: String,
    pub open_time: String,
    pub close_time: String,
}

impl NewAmenity {
    pub fn from_domain(amenity: &Amenity) -> Self {
        Self {
            building_id: amenity.building_id,
            name: amenity.name.clone(),
            open_time: amenity.hours.open().format("%H:%M").to_string(),
            close_time: amenity.hours.close().format("%H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct VisitorRow {
    pub visitor_id: i64,
    pub building_id: i64,
    pub wing: String,
    pub flat_number: i32,
    pub guest_name: String,
    pub phone: String,
    pub purpose: String,
    pub visitor_type: String,
    pub status: String,
    pub invite_code: Option<String>,
    pub check_in_at: Option<String>,
    pub check_out_at: Option<String>,
    pub created_at: String,
}

impl VisitorRow {
    pub fn into_domain(self) -> Result<Visitor, PersistenceError> {
        let flat = flat_from_row(&self.wing, self.flat_number)?;
        let visitor_type = VisitorType::from_str(&self.visitor_type).map_err(|e| {
            PersistenceError::CorruptRecord(format!("visitor {}: {e}", self.visitor_id))
        })?;
        let status = VisitorStatus::from_str(&self.status).map_err(|e| {
            PersistenceError::CorruptRecord(format!("visitor {}: {e}", self.visitor_id))
        })?;
        let invite_code = self
            .invite_code
            .as_deref()
            .map(InviteCode::new)
            .transpose()
            .map_err(|e| {
                PersistenceError::CorruptRecord(format!("visitor {}: {e}", self.visitor_id))
            })?;

        Ok(Visitor {
            visitor_id: Some(self.visitor_id),
            building_id: self.building_id,
            flat,
            guest_name: self.guest_name,
            phone: self.phone,
            purpose: self.purpose,
            visitor_type,
            status,
            invite_code,
            check_in_at: self.check_in_at,
            check_out_at: self.check_out_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = visitors)]
pub struct NewVisitor {
    pub building_id: i64,
    pub wing: String,
    pub flat_number: i32,
    pub guest_name: String,
    pub phone: String,
    pub purpose: String,
    pub visitor_type: String,
    pub status: String,
    pub invite_code: Option<String>,
    pub check_in_at: Option<String>,
    pub check_out_at: Option<String>,
    pub created_at: String,
}

impl NewVisitor {
    pub fn from_domain(visitor: &Visitor) -> Self {
        Self {
            building_id: visitor.building_id,
            wing: visitor.flat.wing().to_string(),
            flat_number: i32::from(visitor.flat.number()),
            guest_name: visitor.guest_name.clone(),
            phone: visitor.phone.clone(),
            purpose: visitor.purpose.clone(),
            visitor_type: visitor.visitor_type.as_str().to_string(),
            status: visitor.status.as_str().to_string(),
            invite_code: visitor.invite_code.as_ref().map(|c| c.value().to_string()),
            check_in_at: visitor.check_in_at.clone(),
            check_out_at: visitor.check_out_at.clone(),
            created_at: visitor.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct BookingRow {
    pub booking_id: i64,
    pub building_id: i64,
    pub amenity_id: i64,
    pub profile_id: i64,
    pub resident_name: String,
    pub wing: String,
    pub flat_number: i32,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: String,
}

impl BookingRow {
    pub fn into_domain(self) -> Result<Booking, PersistenceError> {
        let flat = flat_from_row(&self.wing, self.flat_number)?;
        let date = parse_date(&self.booking_date).map_err(|e| {
            PersistenceError::CorruptRecord(format!("booking {}: {e}", self.booking_id))
        })?;
        let slot = TimeSlot::parse(&self.start_time, &self.end_time).map_err(|e| {
            PersistenceError::CorruptRecord(format!("booking {}: {e}", self.booking_id))
        })?;
        Ok(Booking {
            booking_id: Some(self.booking_id),
            building_id: self.building_id,
            amenity_id: self.amenity_id,
            profile_id: self.profile_id,
            resident_name: self.resident_name,
            flat,
            date,
            slot,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub building_id: i64,
    pub amenity_id: i64,
    pub profile_id: i64,
    pub resident_name: String,
    pub wing: String,
    pub flat_number: i32,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: String,
}

impl NewBooking {
    pub fn from_domain(booking: &Booking) -> Self {
        Self {
            building_id: booking.building_id,
            amenity_id: booking.amenity_id,
            profile_id: booking.profile_id,
            resident_name: booking.resident_name.clone(),
            wing: booking.flat.wing().to_string(),
            flat_number: i32::from(booking.flat.number()),
            booking_date: booking.date.format("%Y-%m-%d").to_string(),
            start_time: booking.slot.start().format("%H:%M").to_string(),
            end_time: booking.slot.end().format("%H:%M").to_string(),
            created_at: booking.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct NoticeRow {
    pub notice_id: i64,
    pub building_id: i64,
    pub title: String,
    pub body: String,
    pub posted_by: Option<i64>,
    pub created_at: String,
}

impl NoticeRow {
    pub fn into_domain(self) -> Notice {
        Notice {
            notice_id: Some(self.notice_id),
            building_id: self.building_id,
            title: self.title,
            body: self.body,
            posted_by: self.posted_by,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notices)]
pub struct NewNotice {
    pub building_id: i64,
    pub title: String,
    pub body: String,
    pub posted_by: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable)]
pub struct ChatMessageRow {
    pub message_id: i64,
    pub building_id: i64,
    pub sender_profile_id: Option<i64>,
    pub sender_name: String,
    pub body: String,
    pub created_at: String,
}

impl ChatMessageRow {
    pub fn into_domain(self) -> ChatMessage {
        ChatMessage {
            message_id: Some(self.message_id),
            building_id: self.building_id,
            sender_profile_id: self.sender_profile_id,
            sender_name: self.sender_name,
            body: self.body,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub struct NewChatMessage {
    pub building_id: i64,
    pub sender_profile_id: Option<i64>,
    pub sender_name: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable)]
pub struct AchievementRow {
    pub achievement_id: i64,
    pub building_id: i64,
    pub profile_id: i64,
    pub title: String,
    pub description: String,
    pub awarded_at: String,
}

impl AchievementRow {
    pub fn into_domain(self) -> Achievement {
        Achievement {
            achievement_id: Some(self.achievement_id),
            building_id: self.building_id,
            profile_id: self.profile_id,
            title: self.title,
            description: self.description,
            awarded_at: self.awarded_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = achievements)]
pub struct NewAchievement {
    pub building_id: i64,
    pub profile_id: i64,
    pub title: String,
    pub description: String,
    pub awarded_at: String,
}

/// A stored account, exposed to the API layer for authentication.
#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
pub struct AccountData {
    pub account_id: i64,
    pub login_name: String,
    pub password_hash: String,
    pub role: String,
    pub building_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub is_disabled: i32,
    pub created_at: String,
}

impl AccountData {
    /// Returns true if the account has been disabled.
    #[must_use]
    pub const fn disabled(&self) -> bool {
        self.is_disabled != 0
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub login_name: String,
    pub password_hash: String,
    pub role: String,
    pub building_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub is_disabled: i32,
    pub created_at: String,
}

/// A stored session, exposed to the API layer for validation.
#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = sessions)]
pub struct SessionData {
    pub session_token: String,
    pub account_id: i64,
    pub created_at: String,
    pub expires_at: String,
}
