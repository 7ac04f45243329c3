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
    clippy::all
)]

mod auth;
mod error;
mod handlers;
mod invite;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    award_achievement, cancel_booking, clear_walk_in, create_account, create_amenity, decide,
    decide_from_callback, delete_notice, issue_pre_approved_pass, list_achievements,
    list_amenities, list_bookings, list_buildings, list_chat_messages, list_notices,
    list_residents, list_visitors, post_chat_message, post_notice, propose_booking,
    provision_building, record_exit, register_contact, register_resident, request_walk_in_entry,
    validate_code, verify_resident,
};
pub use invite::{MAX_CODE_ATTEMPTS, generate_invite_code};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AchievementResponse, AmenityResponse, AwardAchievementRequest, BookingResponse,
    BuildingResponse, ChatMessageResponse, ClearWalkInRequest, CreateAccountRequest,
    CreateAmenityRequest, DecideRequest, IssuePassRequest, LoginResponse, NoticeResponse,
    PostChatMessageRequest, PostNoticeRequest, ProfileResponse, ProposeBookingRequest,
    ProvisionBuildingRequest, RegisterContactRequest, RegisterResidentRequest, ValidateCodeRequest,
    VisitorResponse, WalkInOutcome, WalkInRequest,
};
