// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for persistence tests.

use crate::Persistence;
use gatehouse_domain::{Amenity, Flat, OperatingHours, Profile, Visitor, VisitorStatus, VisitorType};

pub const NOW: &str = "2024-06-01T10:00:00Z";

pub fn fresh_db() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// Creates a building and returns its ID.
pub fn seed_building(db: &mut Persistence) -> i64 {
    db.create_building("Sunrise Towers", "12 Lakeshore Road", NOW)
        .unwrap()
}

/// Creates a verified resident profile in flat B-404 and returns its ID.
pub fn seed_profile(db: &mut Persistence, building_id: i64) -> i64 {
    let profile = Profile {
        profile_id: None,
        building_id,
        flat: Flat::new("B", 404).unwrap(),
        name: String::from("Ravi Mehta"),
        phone: String::from("9876543210"),
        verified: false,
        telegram_chat_id: None,
        push_endpoint: None,
        created_at: NOW.to_string(),
    };
    let profile_id = db.create_profile(&profile).unwrap();
    db.verify_profile(building_id, profile_id).unwrap();
    profile_id
}

/// Creates a "Pool" amenity open 06:00-22:00 and returns its ID.
pub fn seed_amenity(db: &mut Persistence, building_id: i64) -> i64 {
    let amenity = Amenity {
        amenity_id: None,
        building_id,
        name: String::from("Pool"),
        hours: OperatingHours::parse("06:00", "22:00").unwrap(),
    };
    db.create_amenity(&amenity).unwrap()
}

/// Builds an unsaved pending visitor carrying `code`.
pub fn pending_visitor(building_id: i64, code: &str) -> Visitor {
    Visitor {
        visitor_id: None,
        building_id,
        flat: Flat::new("B", 404).unwrap(),
        guest_name: String::from("Asha Patel"),
        phone: String::from("9123456780"),
        purpose: String::from("Family visit"),
        visitor_type: VisitorType::PreApproved,
        status: VisitorStatus::Pending,
        invite_code: Some(gatehouse_domain::InviteCode::new(code).unwrap()),
        check_in_at: None,
        check_out_at: None,
        created_at: NOW.to_string(),
    }
}

/// Builds an unsaved walk-in visitor awaiting approval.
pub fn waiting_visitor(building_id: i64) -> Visitor {
    Visitor {
        visitor_id: None,
        building_id,
        flat: Flat::new("B", 404).unwrap(),
        guest_name: String::from("Vikram Singh"),
        phone: String::from("9988776655"),
        purpose: String::from("Courier delivery"),
        visitor_type: VisitorType::WalkIn,
        status: VisitorStatus::WaitingApproval,
        invite_code: None,
        check_in_at: None,
        check_out_at: None,
        created_at: NOW.to_string(),
    }
}
