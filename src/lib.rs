//! Spar Match - swipe-to-match service for finding sparring partners
//!
//! Profiles swipe on each other; a mutual like becomes a match, and matched
//! fighters schedule a date and place. Persistence, accounts and photo
//! storage are delegated to a hosted backend (Appwrite) behind the traits in
//! [`services`], with an in-memory backend for development and tests.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    CandidateDeck, MatchIds, MatchLifecycle, Session, SessionManager, SwipeEngine, SwipeOutcome,
};
pub use error::SparError;
pub use models::{Experience, Match, MatchStatus, Profile, Swipe};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let deck = CandidateDeck::default();
        assert!(deck.is_exhausted());
        assert_eq!(MatchStatus::default(), MatchStatus::Pending);
        assert_eq!(MatchIds::default(), MatchIds::Random);
    }
}
