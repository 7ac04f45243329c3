// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The API operations.
//!
//! Every operation follows the same shape: authorize the actor, validate
//! the request, call the core/persistence layers, translate errors. The
//! persistence handle is passed in explicitly; nothing here reaches for
//! ambient state.

use std::str::FromStr;

use tracing::info;

use gatehouse::{GuestInfo, check_booking};
use gatehouse_domain::{
    Achievement, Booking, ChatMessage, DomainError, Flat, InviteCode, Notice, OperatingHours,
    Profile, TimeSlot, Visitor, VisitorStatus, parse_date, validate_building_name,
    validate_guest_name, validate_message_body, validate_notice, validate_phone,
};
use gatehouse_notify::{Destination, GateDecision, GateNotification};
use gatehouse_persistence::{Persistence, PersistenceError};

use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::error::{ApiError, translate_core_error, translate_domain_error,
    translate_persistence_error};
use crate::invite::{MAX_CODE_ATTEMPTS, generate_invite_code};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AchievementResponse, AmenityResponse, AwardAchievementRequest, BookingResponse,
    BuildingResponse, ChatMessageResponse, ClearWalkInRequest, CreateAccountRequest,
    CreateAmenityRequest, DecideRequest, IssuePassRequest, NoticeResponse, PostChatMessageRequest,
    PostNoticeRequest, ProfileResponse, ProposeBookingRequest, ProvisionBuildingRequest,
    RegisterContactRequest, RegisterResidentRequest, ValidateCodeRequest, VisitorResponse,
    WalkInOutcome, WalkInRequest,
};

/// Default page size for chat history.
const CHAT_PAGE_SIZE: i64 = 50;

/// Returns the current UTC instant as ISO 8601.
fn now_iso() -> Result<String, ApiError> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
}

/// Loads the resident profile behind the actor.
///
/// Only meaningful for Resident actors; anyone else gets `Unauthorized`.
fn resolve_resident_profile(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Profile, ApiError> {
    let (building_id, profile_id) = match (actor.building_id, actor.profile_id) {
        (Some(building_id), Some(profile_id)) => (building_id, profile_id),
        _ => {
            return Err(ApiError::Unauthorized {
                action: String::from("resident_operation"),
                required_role: String::from("Resident with a linked profile"),
            });
        }
    };

    persistence
        .get_profile(building_id, profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Account references missing profile {profile_id}"),
        })
}

// ============================================================================
// Buildings
// ============================================================================

/// Provisions a new building.
///
/// # Errors
///
/// Returns an error if the actor is not a super admin, the name is
/// invalid, or persistence fails.
pub fn provision_building(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ProvisionBuildingRequest,
) -> Result<BuildingResponse, ApiError> {
    AuthorizationService::authorize_provision_building(actor)?;
    validate_building_name(&request.name).map_err(translate_domain_error)?;

    info!(actor = %actor.login_name, name = %request.name, "Provisioning building");

    let now = now_iso()?;
    let building_id = persistence
        .create_building(&request.name, &request.address, &now)
        .map_err(translate_persistence_error)?;

    let building = persistence
        .get_building(building_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Building {building_id} vanished after insert"),
        })?;

    Ok(BuildingResponse::from_domain(&building))
}

/// Lists all buildings.
///
/// # Errors
///
/// Returns an error if the actor is not a super admin or persistence fails.
pub fn list_buildings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<BuildingResponse>, ApiError> {
    AuthorizationService::authorize_provision_building(actor)?;

    let buildings = persistence
        .list_buildings()
        .map_err(translate_persistence_error)?;
    Ok(buildings.iter().map(BuildingResponse::from_domain).collect())
}

// ============================================================================
// Residents
// ============================================================================

/// Registers a resident profile (unverified until an admin confirms).
///
/// # Errors
///
/// Returns an error if the actor may not manage residents here, the
/// fields are invalid, or the flat already has a profile.
pub fn register_resident(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &RegisterResidentRequest,
) -> Result<ProfileResponse, ApiError> {
    AuthorizationService::authorize_manage_residents(actor)?;
    actor.require_building(request.building_id)?;

    let flat = Flat::from_str(&request.flat).map_err(translate_domain_error)?;
    validate_guest_name(&request.name).map_err(translate_domain_error)?;
    validate_phone(&request.phone).map_err(translate_domain_error)?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        flat = %flat,
        "Registering resident"
    );

    let profile = Profile {
        profile_id: None,
        building_id: request.building_id,
        flat,
        name: request.name.clone(),
        phone: request.phone.clone(),
        verified: false,
        telegram_chat_id: None,
        push_endpoint: None,
        created_at: now_iso()?,
    };

    let profile_id = match persistence.create_profile(&profile) {
        Ok(profile_id) => profile_id,
        Err(PersistenceError::UniqueViolation(_)) => {
            return Err(ApiError::InvalidInput {
                field: String::from("flat"),
                message: format!("Flat {} already has a registered profile", request.flat),
            });
        }
        Err(e) => return Err(translate_persistence_error(e)),
    };

    let mut stored = profile;
    stored.profile_id = Some(profile_id);
    Ok(ProfileResponse::from_domain(&stored))
}

/// Marks a resident profile as verified.
///
/// # Errors
///
/// Returns an error if the actor may not manage residents here or the
/// profile does not exist.
pub fn verify_resident(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
    profile_id: i64,
) -> Result<ProfileResponse, ApiError> {
    AuthorizationService::authorize_manage_residents(actor)?;
    actor.require_building(building_id)?;

    info!(actor = %actor.login_name, building_id, profile_id, "Verifying resident");

    persistence
        .verify_profile(building_id, profile_id)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::NotFound {
                resource_type: String::from("Profile"),
                message: format!("Profile {profile_id} does not exist"),
            },
            other => translate_persistence_error(other),
        })?;

    let profile = persistence
        .get_profile(building_id, profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Profile {profile_id} vanished after update"),
        })?;

    Ok(ProfileResponse::from_domain(&profile))
}

/// Lists a building's resident profiles.
///
/// # Errors
///
/// Returns an error if the actor may not view residents here or
/// persistence fails.
pub fn list_residents(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
) -> Result<Vec<ProfileResponse>, ApiError> {
    AuthorizationService::authorize_view_residents(actor)?;
    actor.require_building(building_id)?;

    let profiles = persistence
        .list_profiles(building_id)
        .map_err(translate_persistence_error)?;
    Ok(profiles.iter().map(ProfileResponse::from_domain).collect())
}

/// Updates the actor's own notification destinations.
///
/// # Errors
///
/// Returns an error if the actor is not a resident or persistence fails.
pub fn register_contact(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &RegisterContactRequest,
) -> Result<ProfileResponse, ApiError> {
    actor.require_building(request.building_id)?;
    let profile = resolve_resident_profile(persistence, actor)?;
    let profile_id = profile.profile_id.unwrap_or_default();

    persistence
        .update_profile_contact(
            request.building_id,
            profile_id,
            request.telegram_chat_id.as_deref(),
            request.push_endpoint.as_deref(),
        )
        .map_err(translate_persistence_error)?;

    let updated = persistence
        .get_profile(request.building_id, profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Profile {profile_id} vanished after update"),
        })?;

    Ok(ProfileResponse::from_domain(&updated))
}

// ============================================================================
// Amenities
// ============================================================================

/// Creates an amenity with its operating window.
///
/// # Errors
///
/// Returns an error if the actor may not manage amenities here, the
/// hours are invalid, or the name is taken.
pub fn create_amenity(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateAmenityRequest,
) -> Result<AmenityResponse, ApiError> {
    AuthorizationService::authorize_manage_amenities(actor)?;
    actor.require_building(request.building_id)?;

    if request.name.trim().is_empty() {
        return Err(translate_domain_error(DomainError::InvalidAmenityName(
            String::from("name cannot be empty"),
        )));
    }
    let hours = OperatingHours::parse(&request.open_time, &request.close_time)
        .map_err(translate_domain_error)?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        name = %request.name,
        "Creating amenity"
    );

    let amenity = gatehouse_domain::Amenity {
        amenity_id: None,
        building_id: request.building_id,
        name: request.name.clone(),
        hours,
    };

    let amenity_id = match persistence.create_amenity(&amenity) {
        Ok(amenity_id) => amenity_id,
        Err(PersistenceError::UniqueViolation(_)) => {
            return Err(ApiError::InvalidInput {
                field: String::from("name"),
                message: format!("Amenity '{}' already exists in this building", request.name),
            });
        }
        Err(e) => return Err(translate_persistence_error(e)),
    };

    let mut stored = amenity;
    stored.amenity_id = Some(amenity_id);
    Ok(AmenityResponse::from_domain(&stored))
}

/// Lists a building's amenities.
///
/// # Errors
///
/// Returns an error if the actor does not belong to the building or
/// persistence fails.
pub fn list_amenities(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
) -> Result<Vec<AmenityResponse>, ApiError> {
    actor.require_building(building_id)?;

    let amenities = persistence
        .list_amenities(building_id)
        .map_err(translate_persistence_error)?;
    Ok(amenities.iter().map(AmenityResponse::from_domain).collect())
}

// ============================================================================
// Visitor lifecycle
// ============================================================================

/// Issues a pre-approved pass with a fresh single-use invite code.
///
/// A code colliding with another pending pass is regenerated; the caller
/// never sees the retry.
///
/// # Errors
///
/// Returns an error if the actor is not a resident of the flat, the guest
/// fields are invalid, or persistence fails.
pub fn issue_pre_approved_pass(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &IssuePassRequest,
) -> Result<VisitorResponse, ApiError> {
    AuthorizationService::authorize_issue_pass(actor)?;
    actor.require_building(request.building_id)?;

    let flat = Flat::from_str(&request.flat).map_err(translate_domain_error)?;
    let profile = resolve_resident_profile(persistence, actor)?;
    if profile.flat != flat {
        return Err(ApiError::Forbidden {
            action: String::from("issue_pass"),
            reason: format!("actor's flat is {}, not {}", profile.flat, flat),
        });
    }

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        flat = %flat,
        "Issuing pre-approved pass"
    );

    let guest = GuestInfo {
        name: request.guest_name.clone(),
        phone: request.phone.clone(),
        purpose: request.purpose.clone(),
    };
    let now = now_iso()?;

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_invite_code().map_err(translate_domain_error)?;
        let visitor =
            gatehouse::issue_pass(request.building_id, flat.clone(), guest.clone(), code, &now)
                .map_err(translate_core_error)?;

        match persistence.insert_visitor(&visitor) {
            Ok(stored) => return Ok(VisitorResponse::from_domain(&stored)),
            Err(PersistenceError::DuplicateInviteCode) => {
                info!("Invite code collided with a pending pass, regenerating");
            }
            Err(e) => return Err(translate_persistence_error(e)),
        }
    }

    Err(ApiError::Internal {
        message: format!("Could not find a free invite code in {MAX_CODE_ATTEMPTS} attempts"),
    })
}

/// Logs a walk-in that needs the resident's decision.
///
/// The flat must resolve to a verified resident profile; otherwise no
/// record is created. On success the outcome carries the notification
/// payload for the dispatcher.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the flat is unknown or the
/// resident is unverified, or another error on validation/persistence
/// failure.
pub fn request_walk_in_entry(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &WalkInRequest,
) -> Result<WalkInOutcome, ApiError> {
    AuthorizationService::authorize_gate_entry(actor)?;
    actor.require_building(request.building_id)?;

    let flat = Flat::from_str(&request.flat).map_err(translate_domain_error)?;

    // Unknown flat and unverified resident fail identically, before any
    // record is created
    let profile = persistence
        .get_profile_by_flat(request.building_id, &flat)
        .map_err(translate_persistence_error)?
        .filter(|profile| profile.verified)
        .ok_or_else(|| {
            translate_domain_error(DomainError::ResidentNotVerified {
                flat: flat.to_string(),
            })
        })?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        flat = %flat,
        "Logging walk-in for resident approval"
    );

    let guest = GuestInfo {
        name: request.guest_name.clone(),
        phone: request.phone.clone(),
        purpose: request.purpose.clone(),
    };
    let now = now_iso()?;

    let visitor = gatehouse::receive_walk_in(request.building_id, flat, guest, &now)
        .map_err(translate_core_error)?;
    let stored = persistence
        .insert_visitor(&visitor)
        .map_err(translate_persistence_error)?;

    let notification = GateNotification {
        visitor_id: stored.visitor_id.unwrap_or_default(),
        building_id: stored.building_id,
        flat: stored.flat.to_string(),
        guest_name: stored.guest_name.clone(),
        purpose: stored.purpose.clone(),
    };
    let destination = Destination {
        telegram_chat_id: profile.telegram_chat_id,
        push_endpoint: profile.push_endpoint,
    };

    Ok(WalkInOutcome {
        visitor: VisitorResponse::from_domain(&stored),
        notification,
        destination,
    })
}

/// Logs a walk-in cleared directly by gate staff, skipping approval.
///
/// # Errors
///
/// Returns an error if the actor is not gate staff, the guest fields are
/// invalid, or persistence fails.
pub fn clear_walk_in(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ClearWalkInRequest,
) -> Result<VisitorResponse, ApiError> {
    AuthorizationService::authorize_gate_entry(actor)?;
    actor.require_building(request.building_id)?;

    let flat = Flat::from_str(&request.flat).map_err(translate_domain_error)?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        flat = %flat,
        "Logging walk-in with immediate clearance"
    );

    let guest = GuestInfo {
        name: request.guest_name.clone(),
        phone: request.phone.clone(),
        purpose: request.purpose.clone(),
    };
    let now = now_iso()?;

    let visitor = gatehouse::clear_walk_in(request.building_id, flat, guest, &now)
        .map_err(translate_core_error)?;
    let stored = persistence
        .insert_visitor(&visitor)
        .map_err(translate_persistence_error)?;

    Ok(VisitorResponse::from_domain(&stored))
}

/// Validates an invite code at the gate, admitting its visitor.
///
/// A code that matches no pending pass returns `NotFound`, whether it was
/// never issued or already used; the two are indistinguishable by design.
///
/// # Errors
///
/// Returns an error if the actor is not gate staff, the code is
/// malformed, or no pending pass matches.
pub fn validate_code(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ValidateCodeRequest,
) -> Result<VisitorResponse, ApiError> {
    AuthorizationService::authorize_gate_entry(actor)?;
    actor.require_building(request.building_id)?;

    let code = InviteCode::new(&request.code).map_err(translate_domain_error)?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        "Validating invite code"
    );

    let now = now_iso()?;
    let visitor = persistence
        .claim_pending_by_code(request.building_id, code.value(), &now)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::NotFound {
                resource_type: String::from("Pass"),
                message: String::from("No pending pass matches this code"),
            },
            other => translate_persistence_error(other),
        })?;

    Ok(VisitorResponse::from_domain(&visitor))
}

/// Applies a resident's decision to their waiting visitor.
///
/// The transition is guarded at the storage layer: if the gate or a
/// second session decided first, this call reports the conflict instead
/// of silently succeeding.
///
/// # Errors
///
/// Returns an error if the actor does not own the flat being visited, the
/// visitor is unknown, or the visitor is no longer awaiting a decision.
pub fn decide(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &DecideRequest,
) -> Result<VisitorResponse, ApiError> {
    AuthorizationService::authorize_decide(actor)?;
    actor.require_building(request.building_id)?;

    let profile = resolve_resident_profile(persistence, actor)?;
    let visitor = persistence
        .get_visitor(request.building_id, request.visitor_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("Visitor"),
            message: format!("Visitor {} does not exist", request.visitor_id),
        })?;

    if visitor.flat != profile.flat {
        return Err(ApiError::Forbidden {
            action: String::from("decide"),
            reason: String::from("visitor is not at the actor's flat"),
        });
    }

    info!(
        actor = %actor.login_name,
        visitor_id = request.visitor_id,
        approve = request.approve,
        "Applying resident decision"
    );

    apply_decision(persistence, &visitor, request.approve)
}

/// Applies a decision arriving through the notification gateway callback.
///
/// The gateway already resolved the destination when it delivered the
/// approval request, so this path carries no actor; it still goes through
/// the same guarded transition as an in-app decision.
///
/// # Errors
///
/// Returns an error if the visitor is unknown or no longer awaiting a
/// decision.
pub fn decide_from_callback(
    persistence: &mut Persistence,
    decision: &GateDecision,
) -> Result<VisitorResponse, ApiError> {
    let visitor = persistence
        .get_visitor_unscoped(decision.visitor_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("Visitor"),
            message: format!("Visitor {} does not exist", decision.visitor_id),
        })?;

    info!(
        visitor_id = decision.visitor_id,
        approve = decision.action.is_approval(),
        "Applying gateway callback decision"
    );

    apply_decision(persistence, &visitor, decision.action.is_approval())
}

/// Shared decision path: compute the next state in core, then apply it
/// with the compare-and-swap guard.
fn apply_decision(
    persistence: &mut Persistence,
    visitor: &Visitor,
    approve: bool,
) -> Result<VisitorResponse, ApiError> {
    let now = now_iso()?;

    // Core validates the transition against the observed state
    let next = gatehouse::decide(visitor, approve, &now).map_err(translate_core_error)?;

    // The conditional write enforces it against the current state
    let stored = persistence
        .transition_visitor(
            visitor.building_id,
            visitor.visitor_id.unwrap_or_default(),
            VisitorStatus::WaitingApproval,
            next.status,
            &now,
        )
        .map_err(translate_persistence_error)?;

    Ok(VisitorResponse::from_domain(&stored))
}

/// Records a visitor leaving the premises.
///
/// # Errors
///
/// Returns an error if the actor is not gate staff, the visitor is
/// unknown, or the visitor is not currently inside.
pub fn record_exit(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
    visitor_id: i64,
) -> Result<VisitorResponse, ApiError> {
    AuthorizationService::authorize_gate_entry(actor)?;
    actor.require_building(building_id)?;

    info!(actor = %actor.login_name, building_id, visitor_id, "Recording exit");

    let now = now_iso()?;
    let stored = persistence
        .transition_visitor(
            building_id,
            visitor_id,
            VisitorStatus::Entered,
            VisitorStatus::Exited,
            &now,
        )
        .map_err(translate_persistence_error)?;

    Ok(VisitorResponse::from_domain(&stored))
}

/// Lists visitors visible to the actor.
///
/// Residents see their own flat's visitors; admins and gate staff see the
/// whole building.
///
/// # Errors
///
/// Returns an error if the actor does not belong to the building or
/// persistence fails.
pub fn list_visitors(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
) -> Result<Vec<VisitorResponse>, ApiError> {
    actor.require_building(building_id)?;

    let visitors = match actor.role {
        Role::Resident => {
            let profile = resolve_resident_profile(persistence, actor)?;
            persistence
                .list_visitors_for_flat(building_id, &profile.flat)
                .map_err(translate_persistence_error)?
        }
        Role::SuperAdmin | Role::Admin | Role::Guard => persistence
            .list_visitors(building_id)
            .map_err(translate_persistence_error)?,
    };

    Ok(visitors.iter().map(VisitorResponse::from_domain).collect())
}

// ============================================================================
// Bookings
// ============================================================================

/// Proposes an amenity reservation.
///
/// The scan here is the fast path with precise error messages; the
/// persistence layer repeats it inside a write-serializing transaction
/// before inserting, so two racing proposals cannot both land.
///
/// # Errors
///
/// Returns `InvalidRange`, `OutsideOperatingHours`, or `SlotOccupied` per
/// the conflict rules, `NotFound` for an unknown amenity, or another
/// error on persistence failure.
pub fn propose_booking(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ProposeBookingRequest,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::authorize_propose_booking(actor)?;
    actor.require_building(request.building_id)?;

    let profile = resolve_resident_profile(persistence, actor)?;
    let amenity = persistence
        .get_amenity(request.building_id, request.amenity_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("Amenity"),
            message: format!("Amenity {} does not exist", request.amenity_id),
        })?;

    let date = parse_date(&request.date).map_err(translate_domain_error)?;
    let slot =
        TimeSlot::parse(&request.start_time, &request.end_time).map_err(translate_domain_error)?;

    // Fast-path scan for a good error message before taking the write lock
    let existing: Vec<TimeSlot> = persistence
        .list_bookings(request.amenity_id, &request.date)
        .map_err(translate_persistence_error)?
        .iter()
        .map(|booking| booking.slot)
        .collect();
    check_booking(&amenity.hours, &slot, &existing).map_err(translate_core_error)?;

    info!(
        actor = %actor.login_name,
        amenity_id = request.amenity_id,
        date = %request.date,
        slot = %slot,
        "Proposing booking"
    );

    let booking = Booking {
        booking_id: None,
        building_id: request.building_id,
        amenity_id: request.amenity_id,
        profile_id: profile.profile_id.unwrap_or_default(),
        resident_name: profile.name.clone(),
        flat: profile.flat.clone(),
        date,
        slot,
        created_at: now_iso()?,
    };

    let stored = persistence
        .create_booking(&amenity, &booking)
        .map_err(translate_persistence_error)?;

    Ok(BookingResponse::from_domain(&stored))
}

/// Cancels a booking.
///
/// The owner, a building admin, or a super admin may cancel; anyone else
/// is refused.
///
/// # Errors
///
/// Returns `Forbidden` for non-owners without privilege, `NotFound` for
/// an unknown booking, or another error on persistence failure.
pub fn cancel_booking(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
    booking_id: i64,
) -> Result<BookingResponse, ApiError> {
    actor.require_building(building_id)?;

    let booking = persistence
        .get_booking(building_id, booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        })?;

    AuthorizationService::authorize_cancel_booking(actor, booking.profile_id)?;

    info!(actor = %actor.login_name, building_id, booking_id, "Cancelling booking");

    persistence
        .delete_booking(building_id, booking_id)
        .map_err(translate_persistence_error)?;

    Ok(BookingResponse::from_domain(&booking))
}

/// Lists the bookings for an amenity on a date.
///
/// # Errors
///
/// Returns an error if the actor does not belong to the building, the
/// amenity is unknown, or persistence fails.
pub fn list_bookings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
    amenity_id: i64,
    date: &str,
) -> Result<Vec<BookingResponse>, ApiError> {
    actor.require_building(building_id)?;

    // The amenity lookup doubles as the tenant check for the listing
    persistence
        .get_amenity(building_id, amenity_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("Amenity"),
            message: format!("Amenity {amenity_id} does not exist"),
        })?;
    parse_date(date).map_err(translate_domain_error)?;

    let bookings = persistence
        .list_bookings(amenity_id, date)
        .map_err(translate_persistence_error)?;
    Ok(bookings.iter().map(BookingResponse::from_domain).collect())
}

// ============================================================================
// Notices, chat, achievements
// ============================================================================

/// Posts a building-wide notice.
///
/// # Errors
///
/// Returns an error if the actor may not post notices here or the fields
/// are invalid.
pub fn post_notice(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &PostNoticeRequest,
) -> Result<NoticeResponse, ApiError> {
    AuthorizationService::authorize_post_notice(actor)?;
    actor.require_building(request.building_id)?;
    validate_notice(&request.title, &request.body).map_err(translate_domain_error)?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        title = %request.title,
        "Posting notice"
    );

    let notice = Notice {
        notice_id: None,
        building_id: request.building_id,
        title: request.title.clone(),
        body: request.body.clone(),
        posted_by: actor.profile_id,
        created_at: now_iso()?,
    };

    let notice_id = persistence
        .post_notice(&notice)
        .map_err(translate_persistence_error)?;

    let mut stored = notice;
    stored.notice_id = Some(notice_id);
    Ok(NoticeResponse::from_domain(&stored))
}

/// Lists a building's notices, newest first.
///
/// # Errors
///
/// Returns an error if the actor does not belong to the building or
/// persistence fails.
pub fn list_notices(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
) -> Result<Vec<NoticeResponse>, ApiError> {
    actor.require_building(building_id)?;

    let notices = persistence
        .list_notices(building_id)
        .map_err(translate_persistence_error)?;
    Ok(notices.iter().map(NoticeResponse::from_domain).collect())
}

/// Deletes a notice.
///
/// # Errors
///
/// Returns an error if the actor may not manage notices here or the
/// notice does not exist.
pub fn delete_notice(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
    notice_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_post_notice(actor)?;
    actor.require_building(building_id)?;

    info!(actor = %actor.login_name, building_id, notice_id, "Deleting notice");

    persistence
        .delete_notice(building_id, notice_id)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::NotFound {
                resource_type: String::from("Notice"),
                message: format!("Notice {notice_id} does not exist"),
            },
            other => translate_persistence_error(other),
        })
}

/// Posts a chat message as the actor.
///
/// # Errors
///
/// Returns an error if the actor may not post here or the body is
/// invalid.
pub fn post_chat_message(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &PostChatMessageRequest,
) -> Result<ChatMessageResponse, ApiError> {
    AuthorizationService::authorize_post_chat(actor)?;
    actor.require_building(request.building_id)?;
    validate_message_body(&request.body).map_err(translate_domain_error)?;

    // Residents sign with their profile name; admins with their login
    let (sender_profile_id, sender_name) = if actor.role == Role::Resident {
        let profile = resolve_resident_profile(persistence, actor)?;
        (profile.profile_id, profile.name)
    } else {
        (actor.profile_id, actor.login_name.clone())
    };

    let message = ChatMessage {
        message_id: None,
        building_id: request.building_id,
        sender_profile_id,
        sender_name,
        body: request.body.clone(),
        created_at: now_iso()?,
    };

    let message_id = persistence
        .post_chat_message(&message)
        .map_err(translate_persistence_error)?;

    let mut stored = message;
    stored.message_id = Some(message_id);
    Ok(ChatMessageResponse::from_domain(&stored))
}

/// Lists a building's recent chat messages in chronological order.
///
/// # Errors
///
/// Returns an error if the actor does not belong to the building or
/// persistence fails.
pub fn list_chat_messages(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
) -> Result<Vec<ChatMessageResponse>, ApiError> {
    actor.require_building(building_id)?;

    let messages = persistence
        .list_chat_messages(building_id, CHAT_PAGE_SIZE)
        .map_err(translate_persistence_error)?;
    Ok(messages.iter().map(ChatMessageResponse::from_domain).collect())
}

/// Awards an achievement to a resident.
///
/// # Errors
///
/// Returns an error if the actor may not award achievements here, the
/// resident is unknown, or persistence fails.
pub fn award_achievement(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &AwardAchievementRequest,
) -> Result<AchievementResponse, ApiError> {
    AuthorizationService::authorize_award_achievement(actor)?;
    actor.require_building(request.building_id)?;

    persistence
        .get_profile(request.building_id, request.profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("Profile"),
            message: format!("Profile {} does not exist", request.profile_id),
        })?;

    info!(
        actor = %actor.login_name,
        building_id = request.building_id,
        profile_id = request.profile_id,
        title = %request.title,
        "Awarding achievement"
    );

    let achievement = Achievement {
        achievement_id: None,
        building_id: request.building_id,
        profile_id: request.profile_id,
        title: request.title.clone(),
        description: request.description.clone(),
        awarded_at: now_iso()?,
    };

    let achievement_id = persistence
        .award_achievement(&achievement)
        .map_err(translate_persistence_error)?;

    let mut stored = achievement;
    stored.achievement_id = Some(achievement_id);
    Ok(AchievementResponse::from_domain(&stored))
}

/// Lists achievements, optionally narrowed to one resident.
///
/// # Errors
///
/// Returns an error if the actor does not belong to the building or
/// persistence fails.
pub fn list_achievements(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    building_id: i64,
    profile_id: Option<i64>,
) -> Result<Vec<AchievementResponse>, ApiError> {
    actor.require_building(building_id)?;

    let achievements = persistence
        .list_achievements(building_id, profile_id)
        .map_err(translate_persistence_error)?;
    Ok(achievements.iter().map(AchievementResponse::from_domain).collect())
}

// ============================================================================
// Accounts
// ============================================================================

/// Creates an account, enforcing the password policy and role scoping.
///
/// Super admins may create any account; building admins may create
/// resident and guard accounts in their own building.
///
/// # Errors
///
/// Returns an error if the actor may not create this account, the
/// password fails policy, or the login name is taken.
pub fn create_account(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateAccountRequest,
) -> Result<i64, ApiError> {
    let target_role = Role::parse(&request.role).ok_or_else(|| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!("'{}' is not a role", request.role),
    })?;

    AuthorizationService::authorize_create_account(actor, target_role)?;

    // Tenant scoping: super admins roam, admins stay home
    match target_role {
        Role::SuperAdmin => {}
        Role::Admin | Role::Resident | Role::Guard => {
            let building_id = request.building_id.ok_or_else(|| ApiError::InvalidInput {
                field: String::from("building_id"),
                message: format!("a {} account needs a building", target_role.as_str()),
            })?;
            if actor.role != Role::SuperAdmin {
                actor.require_building(building_id)?;
            }
        }
    }

    // Resident accounts must be backed by a registered profile
    if target_role == Role::Resident {
        let building_id = request.building_id.unwrap_or_default();
        let profile_id = request.profile_id.ok_or_else(|| ApiError::InvalidInput {
            field: String::from("profile_id"),
            message: String::from("a resident account needs a profile"),
        })?;
        persistence
            .get_profile(building_id, profile_id)
            .map_err(translate_persistence_error)?
            .ok_or_else(|| ApiError::NotFound {
                resource_type: String::from("Profile"),
                message: format!("Profile {profile_id} does not exist"),
            })?;
    }

    PasswordPolicy::default().validate(&request.password, &request.login_name)?;

    info!(
        actor = %actor.login_name,
        login_name = %request.login_name,
        role = %request.role,
        "Creating account"
    );

    let now = now_iso()?;
    match persistence.create_account(
        &request.login_name,
        &request.password,
        target_role.as_str(),
        request.building_id,
        request.profile_id,
        &now,
    ) {
        Ok(account_id) => Ok(account_id),
        Err(PersistenceError::UniqueViolation(_)) => Err(ApiError::InvalidInput {
            field: String::from("login_name"),
            message: format!("Login '{}' is already taken", request.login_name),
        }),
        Err(e) => Err(translate_persistence_error(e)),
    }
}
