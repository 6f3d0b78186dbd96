// Unit tests for Spar Match

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::collections::HashSet;

use spar_match::core::{exclude_swiped, parse_fight_date, sort_newest_first, CandidateDeck};
use spar_match::models::{Experience, Match, MatchStatus, MatchView, Profile};
use spar_match::services::Filter;

fn create_test_profile(id: &str) -> Profile {
    let now = Utc::now();
    Profile {
        id: id.to_string(),
        email: format!("{}@gym.test", id),
        display_name: format!("Fighter {}", id),
        photo_url: None,
        age: 29,
        bio: String::new(),
        fight_style: "Wrestling".to_string(),
        experience: Experience::Advanced,
        weight: 84,
        height: 183,
        location: "Trabzon".to_string(),
        wins: 7,
        losses: 2,
        created_at: now,
        last_active: now,
    }
}

fn create_test_match(id: &str, a: &str, b: &str, age_days: i64) -> Match {
    Match {
        id: id.to_string(),
        user1_id: a.to_string(),
        user2_id: b.to_string(),
        user1: create_test_profile(a),
        user2: create_test_profile(b),
        created_at: Utc::now() - Duration::days(age_days),
        status: MatchStatus::Pending,
        fight_date: None,
        location: None,
        result: None,
    }
}

#[test]
fn test_exclude_swiped_drops_viewer() {
    let profiles = vec![create_test_profile("me"), create_test_profile("x")];
    let out = exclude_swiped(profiles, "me", &HashSet::new());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "x");
}

#[test]
fn test_exclude_swiped_empty_history_keeps_everyone_else() {
    let profiles: Vec<Profile> = (0..10).map(|i| create_test_profile(&i.to_string())).collect();
    let out = exclude_swiped(profiles, "me", &HashSet::new());
    assert_eq!(out.len(), 10);
}

#[test]
fn test_deck_walks_in_order() {
    let mut deck = CandidateDeck::new(vec![
        create_test_profile("1"),
        create_test_profile("2"),
        create_test_profile("3"),
    ]);

    let mut seen = Vec::new();
    while let Some(current) = deck.current() {
        seen.push(current.id.clone());
        deck.advance();
    }

    assert_eq!(seen, vec!["1", "2", "3"]);
    assert!(deck.is_exhausted());
}

#[test]
fn test_sort_newest_first() {
    let mut matches = vec![
        create_test_match("old", "a", "b", 10),
        create_test_match("new", "a", "c", 0),
        create_test_match("mid", "d", "a", 3),
    ];
    sort_newest_first(&mut matches);

    let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[test]
fn test_match_view_resolves_opponent() {
    let view = MatchView::for_profile(create_test_match("m", "a", "b", 0), "b");
    assert_eq!(view.opponent.id, "a");
    assert_eq!(view.status, MatchStatus::Pending);

    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["match"]["user1Id"], "a");
}

#[test]
fn test_parse_fight_date_local_input() {
    let parsed = parse_fight_date("2025-11-03T20:15").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 11, 3, 20, 15, 0).unwrap());
}

#[test]
fn test_parse_fight_date_rejects_garbage() {
    assert!(parse_fight_date("03/11/2025").is_err());
    assert!(parse_fight_date("").is_err());
}

#[test]
fn test_filter_combination_for_reverse_swipe() {
    let swipe = json!({"swiperId": "b", "swipedUserId": "a", "liked": true});
    let filters = [
        Filter::eq("swiperId", "b"),
        Filter::eq("swipedUserId", "a"),
        Filter::eq("liked", true),
    ];
    assert!(filters.iter().all(|f| f.matches(&swipe)));

    let disliked = json!({"swiperId": "b", "swipedUserId": "a", "liked": false});
    assert!(!filters.iter().all(|f| f.matches(&disliked)));
}
