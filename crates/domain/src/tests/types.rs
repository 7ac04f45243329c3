// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::types::{Flat, VisitorType, parse_date};
use std::str::FromStr;

#[test]
fn test_flat_normalizes_wing_case() {
    let flat = Flat::new("b", 404).unwrap();
    assert_eq!(flat.wing(), "B");
    assert_eq!(flat.number(), 404);
    assert_eq!(flat.to_string(), "B-404");
}

#[test]
fn test_flat_parses_canonical_form() {
    let flat = Flat::from_str("B-404").unwrap();
    assert_eq!(flat, Flat::new("B", 404).unwrap());
}

#[test]
fn test_flat_parse_and_display_round_trip() {
    let flat = Flat::new("AB", 12).unwrap();
    let parsed = Flat::from_str(&flat.to_string()).unwrap();
    assert_eq!(flat, parsed);
}

#[test]
fn test_flat_rejects_bad_wings() {
    assert!(Flat::new("", 1).is_err());
    assert!(Flat::new("ABC", 1).is_err());
    assert!(Flat::new("1", 1).is_err());
}

#[test]
fn test_flat_rejects_zero_number() {
    assert!(Flat::new("A", 0).is_err());
}

#[test]
fn test_flat_rejects_malformed_strings() {
    assert!(Flat::from_str("B404").is_err());
    assert!(Flat::from_str("B-abc").is_err());
    assert!(Flat::from_str("-404").is_err());
}

#[test]
fn test_visitor_type_round_trip() {
    for vt in [VisitorType::PreApproved, VisitorType::WalkIn] {
        let parsed = VisitorType::from_str(vt.as_str()).unwrap();
        assert_eq!(vt, parsed);
    }
}

#[test]
fn test_visitor_type_rejects_unknown() {
    assert!(VisitorType::from_str("drive_by").is_err());
}

#[test]
fn test_parse_date() {
    let date = parse_date("2024-06-01").unwrap();
    assert_eq!(date.to_string(), "2024-06-01");
    assert!(parse_date("01/06/2024").is_err());
    assert!(parse_date("2024-13-01").is_err());
}
