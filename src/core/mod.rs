// Core logic exports
pub mod lifecycle;
pub mod session;
pub mod swipe;

pub use lifecycle::{parse_fight_date, sort_newest_first, MatchLifecycle};
pub use session::{PhotoUpload, Session, SessionManager};
pub use swipe::{exclude_swiped, CandidateDeck, MatchIds, SwipeEngine, SwipeOutcome};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::services::StoreError;

/// Decode a stored document into a model type
pub(crate) fn decode<T: DeserializeOwned>(document: Value) -> Result<T, StoreError> {
    serde_json::from_value(document).map_err(|e| StoreError::Malformed(e.to_string()))
}
