// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for API tests.
//!
//! Tests construct actors directly instead of walking the login flow;
//! `AuthenticationService` has its own coverage.

use crate::auth::{AuthenticatedActor, Role};
use crate::request_response::{CreateAmenityRequest, RegisterResidentRequest};
use crate::{create_amenity, register_resident, verify_resident};
use gatehouse_persistence::Persistence;

pub fn fresh_db() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn super_admin() -> AuthenticatedActor {
    AuthenticatedActor {
        account_id: 1,
        login_name: String::from("root"),
        role: Role::SuperAdmin,
        building_id: None,
        profile_id: None,
    }
}

pub fn admin(building_id: i64) -> AuthenticatedActor {
    AuthenticatedActor {
        account_id: 2,
        login_name: String::from("admin.one"),
        role: Role::Admin,
        building_id: Some(building_id),
        profile_id: None,
    }
}

pub fn guard(building_id: i64) -> AuthenticatedActor {
    AuthenticatedActor {
        account_id: 3,
        login_name: String::from("guard.one"),
        role: Role::Guard,
        building_id: Some(building_id),
        profile_id: None,
    }
}

pub fn resident(building_id: i64, profile_id: i64) -> AuthenticatedActor {
    AuthenticatedActor {
        account_id: 4,
        login_name: String::from("ravi.mehta"),
        role: Role::Resident,
        building_id: Some(building_id),
        profile_id: Some(profile_id),
    }
}

/// Provisions a building directly through persistence and returns its ID.
pub fn seed_building(db: &mut Persistence) -> i64 {
    db.create_building("Sunrise Towers", "12 Lakeshore Road", "2024-06-01T00:00:00Z")
        .unwrap()
}

/// Registers and verifies a resident in flat B-404; returns the profile ID.
pub fn seed_verified_resident(db: &mut Persistence, building_id: i64) -> i64 {
    let response = register_resident(
        db,
        &admin(building_id),
        &RegisterResidentRequest {
            building_id,
            flat: String::from("B-404"),
            name: String::from("Ravi Mehta"),
            phone: String::from("9876543210"),
        },
    )
    .unwrap();
    verify_resident(db, &admin(building_id), building_id, response.profile_id).unwrap();
    response.profile_id
}

/// Creates a "Pool" amenity open 06:00-22:00; returns the amenity ID.
pub fn seed_pool(db: &mut Persistence, building_id: i64) -> i64 {
    create_amenity(
        db,
        &admin(building_id),
        &CreateAmenityRequest {
            building_id,
            name: String::from("Pool"),
            open_time: String::from("06:00"),
            close_time: String::from("22:00"),
        },
    )
    .unwrap()
    .amenity_id
}
