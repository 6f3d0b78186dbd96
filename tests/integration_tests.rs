// Integration tests for Spar Match

mod common;

use common::TestApp;
use spar_match::core::MatchIds;
use spar_match::models::{MatchStatus, ProfileUpdate, ScheduleRequest};
use spar_match::services::Collection;
use spar_match::SparError;

#[tokio::test]
async fn test_integration_mutual_like_scenario() {
    let app = TestApp::new();
    let (a, _) = app.register("Ayse").await;
    let (b, _) = app.register("Burak").await;

    // A likes B: one swipe, no match
    let mut deck_a = app.swipes.load_deck(&a).await.unwrap();
    assert_eq!(deck_a.current().unwrap().id, b.profile_id);
    let first = app.swipes.swipe(&a, &mut deck_a, true).await.unwrap();
    assert!(first.matched.is_none());
    assert_eq!(app.store.count(Collection::Swipes).await, 1);
    assert_eq!(app.store.count(Collection::Matches).await, 0);

    // B likes A back: a second swipe and exactly one pending match
    let mut deck_b = app.swipes.load_deck(&b).await.unwrap();
    let second = app.swipes.swipe(&b, &mut deck_b, true).await.unwrap();
    let fight = second.matched.expect("mutual like should match");
    assert_eq!(fight.status, MatchStatus::Pending);
    assert_eq!(fight.user1_id, b.profile_id);
    assert_eq!(fight.user2_id, a.profile_id);
    assert_eq!(second.notice.as_deref(), Some("You matched with Ayse! Time to fight!"));
    assert_eq!(app.store.count(Collection::Swipes).await, 2);
    assert_eq!(app.store.count(Collection::Matches).await, 1);

    // Both sides see the same single match
    let for_a = app.matches.list_matches(&a).await.unwrap();
    let for_b = app.matches.list_matches(&b).await.unwrap();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_a[0].id, for_b[0].id);
    assert_eq!(for_a[0].opponent(&a.profile_id).display_name, "Burak");
    assert_eq!(for_b[0].opponent(&b.profile_id).display_name, "Ayse");
}

#[tokio::test]
async fn test_integration_dislike_removes_candidate_after_reset() {
    let app = TestApp::new();
    let (a, _) = app.register("Ayse").await;
    let (b, _) = app.register("Burak").await;

    let mut deck = app.swipes.load_deck(&a).await.unwrap();
    let outcome = app.swipes.swipe(&a, &mut deck, false).await.unwrap();
    assert!(outcome.matched.is_none());
    assert!(!outcome.swipe.liked);
    assert_eq!(app.store.count(Collection::Swipes).await, 1);

    let reset = app.swipes.reset(&a).await.unwrap();
    assert!(reset.candidates().iter().all(|p| p.id != b.profile_id));
    assert!(reset.is_exhausted());
}

#[tokio::test]
async fn test_integration_deck_never_contains_self_or_swiped() {
    let app = TestApp::new();
    let (me, _) = app.register("Mehmet").await;
    let mut others = Vec::new();
    for name in ["Zeynep", "Can", "Ece", "Onur", "Selin"] {
        others.push(app.register(name).await.0);
    }

    app.swipes.record_swipe(&me.profile_id, &others[1].profile_id, true).await.unwrap();
    app.swipes.record_swipe(&me.profile_id, &others[3].profile_id, false).await.unwrap();
    // Someone else's swipe on a candidate must not hide them from me
    app.swipes.record_swipe(&others[0].profile_id, &others[2].profile_id, false).await.unwrap();

    let deck = app.swipes.load_deck(&me).await.unwrap();
    let ids: Vec<&str> = deck.candidates().iter().map(|p| p.id.as_str()).collect();

    assert_eq!(
        ids,
        vec![
            others[0].profile_id.as_str(),
            others[2].profile_id.as_str(),
            others[4].profile_id.as_str(),
        ]
    );
}

#[tokio::test]
async fn test_integration_schedule_then_relist() {
    let app = TestApp::new();
    let (a, _) = app.register("Ayse").await;
    let (b, _) = app.register("Burak").await;

    app.swipes.record_swipe(&a.profile_id, &b.profile_id, true).await.unwrap();
    let mut deck = app.swipes.load_deck(&b).await.unwrap();
    let fight = app.swipes.swipe(&b, &mut deck, true).await.unwrap().matched.unwrap();

    let blank = ScheduleRequest {
        fight_date: String::new(),
        location: "Besiktas MMA".to_string(),
    };
    let err = app.matches.schedule_match(&fight.id, &blank).await.unwrap_err();
    assert!(matches!(err, SparError::Validation(_)));
    assert_eq!(
        app.matches.list_matches(&a).await.unwrap()[0].status,
        MatchStatus::Pending
    );

    let request = ScheduleRequest {
        fight_date: "2025-09-20T17:00".to_string(),
        location: "Besiktas MMA".to_string(),
    };
    app.matches.schedule_match(&fight.id, &request).await.unwrap();

    let listed = app.matches.list_matches(&a).await.unwrap();
    assert_eq!(listed[0].status, MatchStatus::Scheduled);
    assert_eq!(listed[0].location.as_deref(), Some("Besiktas MMA"));
    assert!(listed[0].fight_date.is_some());
    assert!(listed[0].result.is_none());
}

#[tokio::test]
async fn test_integration_match_keeps_profile_snapshot() {
    let app = TestApp::new();
    let (a, _) = app.register("Ayse").await;
    let (b, _) = app.register("Burak").await;

    app.swipes.record_swipe(&a.profile_id, &b.profile_id, true).await.unwrap();
    let mut deck = app.swipes.load_deck(&b).await.unwrap();
    app.swipes.swipe(&b, &mut deck, true).await.unwrap();

    let update = ProfileUpdate {
        display_name: Some("Ayse the Hammer".to_string()),
        ..Default::default()
    };
    app.sessions.update_profile(&a, update).await.unwrap();

    let listed = app.matches.list_matches(&b).await.unwrap();
    assert_eq!(listed[0].opponent(&b.profile_id).display_name, "Ayse");
}

#[tokio::test]
async fn test_integration_unique_pair_ids_single_match() {
    let app = TestApp::with_match_ids(MatchIds::PairUnique);
    let (a, _) = app.register("Ayse").await;
    let (b, _) = app.register("Burak").await;

    // Both sides saw the other's like, as in a lost race
    app.swipes.record_swipe(&a.profile_id, &b.profile_id, true).await.unwrap();
    app.swipes.record_swipe(&b.profile_id, &a.profile_id, true).await.unwrap();

    let mut deck_a = spar_match::CandidateDeck::new(vec![app
        .sessions
        .current_profile(&b)
        .await
        .unwrap()
        .unwrap()]);
    let mut deck_b = spar_match::CandidateDeck::new(vec![app
        .sessions
        .current_profile(&a)
        .await
        .unwrap()
        .unwrap()]);

    let from_a = app.swipes.swipe(&a, &mut deck_a, true).await.unwrap();
    let from_b = app.swipes.swipe(&b, &mut deck_b, true).await.unwrap();

    assert_eq!(from_a.matched.unwrap().id, from_b.matched.unwrap().id);
    assert_eq!(app.store.count(Collection::Matches).await, 1);
    assert_eq!(app.matches.list_matches(&a).await.unwrap().len(), 1);
}
