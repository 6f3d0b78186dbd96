use serde::{Deserialize, Serialize};

use crate::models::domain::{Match, MatchStatus, Profile};

/// Response for sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub profile: Option<Profile>,
}

/// Current card of the caller's candidate deck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub candidate: Option<Profile>,
    pub remaining: usize,
}

/// Result of a swipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResponse {
    pub swipe_id: String,
    pub matched: Option<Match>,
    pub notice: Option<String>,
    pub next: Option<Profile>,
    pub remaining: usize,
}

/// A match as seen by one participant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(rename = "match")]
    pub fight: Match,
    pub opponent: Profile,
    pub status: MatchStatus,
}

impl MatchView {
    pub fn for_profile(fight: Match, profile_id: &str) -> Self {
        let opponent = fight.opponent(profile_id).clone();
        let status = fight.status;
        Self {
            fight,
            opponent,
            status,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
