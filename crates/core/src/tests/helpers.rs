// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for core tests.

use crate::lifecycle::GuestInfo;
use gatehouse_domain::Flat;

pub const NOW: &str = "2024-06-01T10:00:00Z";
pub const LATER: &str = "2024-06-01T18:30:00Z";

pub fn test_flat() -> Flat {
    Flat::new("B", 404).unwrap()
}

pub fn test_guest() -> GuestInfo {
    GuestInfo {
        name: String::from("Asha Patel"),
        phone: String::from("9876543210"),
        purpose: String::from("Family visit"),
    }
}
