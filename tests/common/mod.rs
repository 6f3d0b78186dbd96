// Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use spar_match::core::{MatchIds, MatchLifecycle, Session, SessionManager, SwipeEngine};
use spar_match::models::{Experience, Profile, SignUpRequest};
use spar_match::routes::AppState;
use spar_match::services::{CacheManager, MemoryBlobs, MemoryIdentity, MemoryStore};

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<SessionManager>,
    pub swipes: Arc<SwipeEngine>,
    pub matches: Arc<MatchLifecycle>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_match_ids(MatchIds::Random)
    }

    pub fn with_match_ids(match_ids: MatchIds) -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(SessionManager::new(
            Arc::new(MemoryIdentity::new()),
            store.clone(),
            Arc::new(MemoryBlobs::new()),
            "integration-secret",
            3600,
            1000,
        ));

        Self {
            swipes: Arc::new(SwipeEngine::new(store.clone(), match_ids)),
            matches: Arc::new(MatchLifecycle::new(store.clone())),
            store,
            sessions,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            sessions: self.sessions.clone(),
            swipes: self.swipes.clone(),
            matches: self.matches.clone(),
            decks: CacheManager::new(1000, 3600),
        }
    }

    /// Register a fighter and return their session and profile
    pub async fn register(&self, name: &str) -> (Session, Profile) {
        self.sessions
            .sign_up(sign_up_request(name), None)
            .await
            .expect("sign up")
    }
}

pub fn sign_up_request(name: &str) -> SignUpRequest {
    SignUpRequest {
        email: format!("{}@gym.test", name.to_lowercase()),
        password: "secret12".to_string(),
        display_name: name.to_string(),
        age: 28,
        bio: format!("{} trains five days a week", name),
        fight_style: "MMA".to_string(),
        experience: Experience::Intermediate,
        weight: 77,
        height: 180,
        location: "Istanbul".to_string(),
    }
}
