// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::PersistenceError;
use crate::tests::helpers::{NOW, fresh_db, seed_building, seed_profile};
use gatehouse_domain::{Achievement, ChatMessage, Flat, Notice, Profile};

#[test]
fn test_building_round_trip() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);

    let building = db.get_building(building_id).unwrap().unwrap();
    assert_eq!(building.name, "Sunrise Towers");

    assert_eq!(db.list_buildings().unwrap().len(), 1);
    assert!(db.get_building(999).unwrap().is_none());
}

#[test]
fn test_profile_verification_flow() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);

    let profile = Profile {
        profile_id: None,
        building_id,
        flat: Flat::new("A", 101).unwrap(),
        name: String::from("Meera Iyer"),
        phone: String::from("9012345678"),
        verified: false,
        telegram_chat_id: None,
        push_endpoint: None,
        created_at: NOW.to_string(),
    };
    let profile_id = db.create_profile(&profile).unwrap();

    let stored = db.get_profile(building_id, profile_id).unwrap().unwrap();
    assert!(!stored.verified);

    db.verify_profile(building_id, profile_id).unwrap();
    let verified = db.get_profile(building_id, profile_id).unwrap().unwrap();
    assert!(verified.verified);
}

#[test]
fn test_one_profile_per_flat() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    seed_profile(&mut db, building_id);

    let duplicate = Profile {
        profile_id: None,
        building_id,
        flat: Flat::new("B", 404).unwrap(),
        name: String::from("Someone Else"),
        phone: String::from("9000000000"),
        verified: false,
        telegram_chat_id: None,
        push_endpoint: None,
        created_at: NOW.to_string(),
    };
    let err = db.create_profile(&duplicate).unwrap_err();
    assert!(matches!(err, PersistenceError::UniqueViolation(_)));
}

#[test]
fn test_profile_lookup_by_flat() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_profile(&mut db, building_id);

    let flat = Flat::new("B", 404).unwrap();
    let found = db.get_profile_by_flat(building_id, &flat).unwrap().unwrap();
    assert_eq!(found.profile_id, Some(profile_id));

    let empty_flat = Flat::new("C", 1).unwrap();
    assert!(db.get_profile_by_flat(building_id, &empty_flat).unwrap().is_none());
}

#[test]
fn test_profile_contact_update() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_profile(&mut db, building_id);

    db.update_profile_contact(
        building_id,
        profile_id,
        Some("552341234"),
        Some("https://push.example/sub/abc"),
    )
    .unwrap();

    let profile = db.get_profile(building_id, profile_id).unwrap().unwrap();
    assert_eq!(profile.telegram_chat_id.as_deref(), Some("552341234"));
    assert_eq!(
        profile.push_endpoint.as_deref(),
        Some("https://push.example/sub/abc")
    );
}

#[test]
fn test_notices_newest_first() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_profile(&mut db, building_id);

    for title in ["Water outage", "Diwali party", "Lift maintenance"] {
        let notice = Notice {
            notice_id: None,
            building_id,
            title: title.to_string(),
            body: String::from("Details to follow"),
            posted_by: Some(profile_id),
            created_at: NOW.to_string(),
        };
        db.post_notice(&notice).unwrap();
    }

    let notices = db.list_notices(building_id).unwrap();
    assert_eq!(notices.len(), 3);
    assert_eq!(notices[0].title, "Lift maintenance");
}

#[test]
fn test_notice_delete() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_profile(&mut db, building_id);

    let notice = Notice {
        notice_id: None,
        building_id,
        title: String::from("Old notice"),
        body: String::from("Obsolete"),
        posted_by: Some(profile_id),
        created_at: NOW.to_string(),
    };
    let notice_id = db.post_notice(&notice).unwrap();

    db.delete_notice(building_id, notice_id).unwrap();
    assert!(db.list_notices(building_id).unwrap().is_empty());

    let err = db.delete_notice(building_id, notice_id).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_chat_page_is_chronological() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_profile(&mut db, building_id);

    for i in 1..=5 {
        let message = ChatMessage {
            message_id: None,
            building_id,
            sender_profile_id: Some(profile_id),
            sender_name: String::from("Ravi Mehta"),
            body: format!("message {i}"),
            created_at: NOW.to_string(),
        };
        db.post_chat_message(&message).unwrap();
    }

    // Last 3 messages, oldest of the page first
    let page = db.list_chat_messages(building_id, 3).unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].body, "message 3");
    assert_eq!(page[2].body, "message 5");
}

#[test]
fn test_achievements_filter_by_profile() {
    let mut db = fresh_db();
    let building_id = seed_building(&mut db);
    let profile_id = seed_profile(&mut db, building_id);

    let achievement = Achievement {
        achievement_id: None,
        building_id,
        profile_id,
        title: String::from("Best garden balcony"),
        description: String::from("Community vote, spring 2024"),
        awarded_at: NOW.to_string(),
    };
    db.award_achievement(&achievement).unwrap();

    assert_eq!(db.list_achievements(building_id, None).unwrap().len(), 1);
    assert_eq!(
        db.list_achievements(building_id, Some(profile_id)).unwrap().len(),
        1
    );
    assert!(db.list_achievements(building_id, Some(999)).unwrap().is_empty());
}
