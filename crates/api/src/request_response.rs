// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Typed request and response structs for the API operations.
//!
//! Requests carry only data; the authenticated actor arrives separately.
//! Responses are flat, serializable views of domain records: times render
//! as `HH:MM`, dates as `YYYY-MM-DD`, flats in `WING-NUMBER` form.

use gatehouse_domain::{
    Achievement, Amenity, Booking, Building, ChatMessage, Notice, Profile, Visitor,
};
use gatehouse_notify::{Destination, GateNotification};
use serde::{Deserialize, Serialize};

/// Request to provision a new building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionBuildingRequest {
    /// The building's display name.
    pub name: String,
    /// The building's street address.
    pub address: String,
}

/// Request to register a resident profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResidentRequest {
    /// The building to register in.
    pub building_id: i64,
    /// The resident's flat in `WING-NUMBER` form.
    pub flat: String,
    /// The resident's name.
    pub name: String,
    /// The resident's phone number.
    pub phone: String,
}

/// Request by a resident to update their notification destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterContactRequest {
    /// The building the resident belongs to.
    pub building_id: i64,
    /// Telegram chat identifier, if linking the bot.
    pub telegram_chat_id: Option<String>,
    /// Push-relay endpoint, if registering one.
    pub push_endpoint: Option<String>,
}

/// Request to create an amenity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAmenityRequest {
    /// The building the amenity belongs to.
    pub building_id: i64,
    /// The amenity's display name.
    pub name: String,
    /// Opening time (`HH:MM`).
    pub open_time: String,
    /// Closing time (`HH:MM`).
    pub close_time: String,
}

/// Request by a resident to issue a pre-approved pass for their flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePassRequest {
    /// The building the pass belongs to.
    pub building_id: i64,
    /// The flat being visited in `WING-NUMBER` form.
    pub flat: String,
    /// The guest's name.
    pub guest_name: String,
    /// The guest's phone number.
    pub phone: String,
    /// The purpose of the visit.
    pub purpose: String,
}

/// Request by gate staff to log a walk-in needing resident approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkInRequest {
    /// The building the visitor is at.
    pub building_id: i64,
    /// The flat being visited in `WING-NUMBER` form.
    pub flat: String,
    /// The guest's name.
    pub guest_name: String,
    /// The guest's phone number.
    pub phone: String,
    /// The purpose of the visit.
    pub purpose: String,
}

/// Request by gate staff to admit a walk-in without resident approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearWalkInRequest {
    /// The building the visitor is at.
    pub building_id: i64,
    /// The flat being visited in `WING-NUMBER` form.
    pub flat: String,
    /// The guest's name.
    pub guest_name: String,
    /// The guest's phone number.
    pub phone: String,
    /// The purpose of the visit.
    pub purpose: String,
}

/// Request by gate staff to validate an invite code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateCodeRequest {
    /// The building the code was presented at.
    pub building_id: i64,
    /// The six-digit code as entered.
    pub code: String,
}

/// Request by a resident to approve or deny a waiting visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideRequest {
    /// The building the visitor belongs to.
    pub building_id: i64,
    /// The visitor awaiting a decision.
    pub visitor_id: i64,
    /// True to admit, false to reject.
    pub approve: bool,
}

/// Request to reserve an amenity slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeBookingRequest {
    /// The building the amenity belongs to.
    pub building_id: i64,
    /// The amenity to reserve.
    pub amenity_id: i64,
    /// The reservation date (`YYYY-MM-DD`).
    pub date: String,
    /// Slot start (`HH:MM`, inclusive).
    pub start_time: String,
    /// Slot end (`HH:MM`, exclusive).
    pub end_time: String,
}

/// Request to post a building-wide notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostNoticeRequest {
    /// The building the notice belongs to.
    pub building_id: i64,
    /// The notice title.
    pub title: String,
    /// The notice body.
    pub body: String,
}

/// Request to post a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostChatMessageRequest {
    /// The building chat to post in.
    pub building_id: i64,
    /// The message body.
    pub body: String,
}

/// Request to award an achievement to a resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardAchievementRequest {
    /// The building the resident belongs to.
    pub building_id: i64,
    /// The resident being recognized.
    pub profile_id: i64,
    /// The achievement title.
    pub title: String,
    /// The achievement description.
    pub description: String,
}

/// Request to create an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// The login name.
    pub login_name: String,
    /// The plain-text password (validated against the policy, then hashed).
    pub password: String,
    /// The role string (`super_admin`, `admin`, `resident`, `guard`).
    pub role: String,
    /// The building the account belongs to. Absent for super admins.
    pub building_id: Option<i64>,
    /// The resident profile behind the account, for resident roles.
    pub profile_id: Option<i64>,
}

/// Response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The bearer token for subsequent requests.
    pub session_token: String,
    /// The account's role string.
    pub role: String,
    /// The account's building, if tenant-scoped.
    pub building_id: Option<i64>,
    /// The account's resident profile, if any.
    pub profile_id: Option<i64>,
}

/// Serializable view of a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingResponse {
    /// The building identifier.
    pub building_id: i64,
    /// The building's display name.
    pub name: String,
    /// The building's street address.
    pub address: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

impl BuildingResponse {
    /// Converts a domain building into its response form.
    #[must_use]
    pub fn from_domain(building: &Building) -> Self {
        Self {
            building_id: building.building_id.unwrap_or_default(),
            name: building.name.clone(),
            address: building.address.clone(),
            created_at: building.created_at.clone(),
        }
    }
}

/// Serializable view of a resident profile.
///
/// Notification destinations are intentionally omitted; they are only
/// consumed server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// The profile identifier.
    pub profile_id: i64,
    /// The building the profile belongs to.
    pub building_id: i64,
    /// The resident's flat in `WING-NUMBER` form.
    pub flat: String,
    /// The resident's name.
    pub name: String,
    /// The resident's phone number.
    pub phone: String,
    /// Whether a building admin has verified this resident.
    pub verified: bool,
}

impl ProfileResponse {
    /// Converts a domain profile into its response form.
    #[must_use]
    pub fn from_domain(profile: &Profile) -> Self {
        Self {
            profile_id: profile.profile_id.unwrap_or_default(),
            building_id: profile.building_id,
            flat: profile.flat.to_string(),
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            verified: profile.verified,
        }
    }
}

/// Serializable view of an amenity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmenityResponse {
    /// The amenity identifier.
    pub amenity_id: i64,
    /// The building the amenity belongs to.
    pub building_id: i64,
    /// The amenity's display name.
    pub name: String,
    /// Opening time (`HH:MM`).
    pub open_time: String,
    /// Closing time (`HH:MM`).
    pub close_time: String,
}

impl AmenityResponse {
    /// Converts a domain amenity into its response form.
    #[must_use]
    pub fn from_domain(amenity: &Amenity) -> Self {
        Self {
            amenity_id: amenity.amenity_id.unwrap_or_default(),
            building_id: amenity.building_id,
            name: amenity.name.clone(),
            open_time: amenity.hours.open().format("%H:%M").to_string(),
            close_time: amenity.hours.close().format("%H:%M").to_string(),
        }
    }
}

/// Serializable view of a visitor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorResponse {
    /// The visitor identifier.
    pub visitor_id: i64,
    /// The building the visitor belongs to.
    pub building_id: i64,
    /// The flat being visited in `WING-NUMBER` form.
    pub flat: String,
    /// The guest's name.
    pub guest_name: String,
    /// The guest's phone number.
    pub phone: String,
    /// The purpose of the visit.
    pub purpose: String,
    /// The visitor type string.
    pub visitor_type: String,
    /// The current status string.
    pub status: String,
    /// The invite code, present only for pre-approved visitors.
    pub invite_code: Option<String>,
    /// Check-in timestamp (ISO 8601), if entered.
    pub check_in_at: Option<String>,
    /// Check-out timestamp (ISO 8601), if exited.
    pub check_out_at: Option<String>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

impl VisitorResponse {
    /// Converts a domain visitor into its response form.
    #[must_use]
    pub fn from_domain(visitor: &Visitor) -> Self {
        Self {
            visitor_id: visitor.visitor_id.unwrap_or_default(),
            building_id: visitor.building_id,
            flat: visitor.flat.to_string(),
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

/// Serializable view of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// The building the booking belongs to.
    pub building_id: i64,
    /// The reserved amenity.
    pub amenity_id: i64,
    /// The owning resident profile.
    pub profile_id: i64,
    /// The resident's name.
    pub resident_name: String,
    /// The resident's flat in `WING-NUMBER` form.
    pub flat: String,
    /// The reservation date (`YYYY-MM-DD`).
    pub date: String,
    /// Slot start (`HH:MM`, inclusive).
    pub start_time: String,
    /// Slot end (`HH:MM`, exclusive).
    pub end_time: String,
}

impl BookingResponse {
    /// Converts a domain booking into its response form.
    #[must_use]
    pub fn from_domain(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id.unwrap_or_default(),
            building_id: booking.building_id,
            amenity_id: booking.amenity_id,
            profile_id: booking.profile_id,
            resident_name: booking.resident_name.clone(),
            flat: booking.flat.to_string(),
            date: booking.date.format("%Y-%m-%d").to_string(),
            start_time: booking.slot.start().format("%H:%M").to_string(),
            end_time: booking.slot.end().format("%H:%M").to_string(),
        }
    }
}

/// Serializable view of a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeResponse {
    /// The notice identifier.
    pub notice_id: i64,
    /// The building the notice belongs to.
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

impl NoticeResponse {
    /// Converts a domain notice into its response form.
    #[must_use]
    pub fn from_domain(notice: &Notice) -> Self {
        Self {
            notice_id: notice.notice_id.unwrap_or_default(),
            building_id: notice.building_id,
            title: notice.title.clone(),
            body: notice.body.clone(),
            posted_by: notice.posted_by,
            created_at: notice.created_at.clone(),
        }
    }
}

/// Serializable view of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    /// The message identifier.
    pub message_id: i64,
    /// The building the message belongs to.
    pub building_id: i64,
    /// The sending profile's identifier, if the sender has one.
    pub sender_profile_id: Option<i64>,
    /// The sender's name.
    pub sender_name: String,
    /// The message body.
    pub body: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

impl ChatMessageResponse {
    /// Converts a domain chat message into its response form.
    #[must_use]
    pub fn from_domain(message: &ChatMessage) -> Self {
        Self {
            message_id: message.message_id.unwrap_or_default(),
            building_id: message.building_id,
            sender_profile_id: message.sender_profile_id,
            sender_name: message.sender_name.clone(),
            body: message.body.clone(),
            created_at: message.created_at.clone(),
        }
    }
}

/// Serializable view of an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementResponse {
    /// The achievement identifier.
    pub achievement_id: i64,
    /// The building the achievement belongs to.
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

impl AchievementResponse {
    /// Converts a domain achievement into its response form.
    #[must_use]
    pub fn from_domain(achievement: &Achievement) -> Self {
        Self {
            achievement_id: achievement.achievement_id.unwrap_or_default(),
            building_id: achievement.building_id,
            profile_id: achievement.profile_id,
            title: achievement.title.clone(),
            description: achievement.description.clone(),
            awarded_at: achievement.awarded_at.clone(),
        }
    }
}

/// The full outcome of logging a walk-in that needs resident approval.
///
/// The visitor view goes back to the gate client; the notification and
/// destination go to the dispatcher, fire-and-forget.
#[derive(Debug, Clone)]
pub struct WalkInOutcome {
    /// The created visitor, for the gate client.
    pub visitor: VisitorResponse,
    /// The payload for the notification dispatcher.
    pub notification: GateNotification,
    /// Where the resident can be reached.
    pub destination: Destination,
}
