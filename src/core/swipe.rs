use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::decode;
use crate::core::session::Session;
use crate::error::SparError;
use crate::models::{Match, MatchStatus, Profile, Swipe};
use crate::services::{Collection, DocumentStore, Filter, StoreError};

/// How match documents get their ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchIds {
    /// Fresh random id per match. Two racing mutual likes can create two
    /// matches for the same pair.
    #[default]
    Random,
    /// Id derived from the unordered user pair, so the store's id uniqueness
    /// turns a second insert for the same pair into a conflict.
    PairUnique,
}

impl MatchIds {
    fn id_for(&self, a: &str, b: &str) -> String {
        match self {
            MatchIds::Random => Uuid::new_v4().to_string(),
            MatchIds::PairUnique => {
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                let key = format!("{}:{}", low, high);
                Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
            }
        }
    }
}

/// Candidates not yet decided on, in listing order, with a cursor
#[derive(Debug, Clone, Default)]
pub struct CandidateDeck {
    candidates: Vec<Profile>,
    cursor: usize,
}

impl CandidateDeck {
    pub fn new(candidates: Vec<Profile>) -> Self {
        Self {
            candidates,
            cursor: 0,
        }
    }

    pub fn current(&self) -> Option<&Profile> {
        self.candidates.get(self.cursor)
    }

    pub fn advance(&mut self) {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len().saturating_sub(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn candidates(&self) -> &[Profile] {
        &self.candidates
    }
}

/// Result of one swipe
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    pub matched: Option<Match>,
    /// Message for the swiper when a match was made
    pub notice: Option<String>,
}

/// Drop the viewer and everyone already swiped on, keeping listing order
pub fn exclude_swiped(
    profiles: Vec<Profile>,
    viewer_id: &str,
    swiped: &HashSet<String>,
) -> Vec<Profile> {
    profiles
        .into_iter()
        .filter(|p| p.id != viewer_id && !swiped.contains(&p.id))
        .collect()
}

/// Sources candidates, records decisions and turns mutual likes into matches.
///
/// Mutual-like detection is a read followed by a write with no transaction
/// around it. With `MatchIds::Random`, two users liking each other at the
/// same moment may both miss the other's swipe or both create a match.
pub struct SwipeEngine {
    store: Arc<dyn DocumentStore>,
    match_ids: MatchIds,
}

impl SwipeEngine {
    pub fn new(store: Arc<dyn DocumentStore>, match_ids: MatchIds) -> Self {
        Self { store, match_ids }
    }

    /// Everyone except the viewer and profiles they already swiped on
    pub async fn load_deck(&self, session: &Session) -> Result<CandidateDeck, SparError> {
        let me = session.profile_id.as_str();

        let documents = self
            .store
            .query(Collection::Users, &[Filter::ne("id", me)])
            .await?;

        let profiles: Vec<Profile> = documents
            .into_iter()
            .filter_map(|doc| match decode::<Profile>(doc) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping unreadable profile: {}", e);
                    None
                }
            })
            .collect();

        let swiped = self.swiped_ids(me).await?;
        let deck = CandidateDeck::new(exclude_swiped(profiles, me, &swiped));

        tracing::debug!(
            "Loaded {} candidates for {} ({} already swiped)",
            deck.remaining(),
            me,
            swiped.len()
        );

        Ok(deck)
    }

    /// Start over from the first card with a freshly computed exclusion set
    pub async fn reset(&self, session: &Session) -> Result<CandidateDeck, SparError> {
        self.load_deck(session).await
    }

    /// Ids of every profile this user has swiped on, liked or not
    pub async fn swiped_ids(&self, swiper_id: &str) -> Result<HashSet<String>, SparError> {
        let documents = self
            .store
            .query(Collection::Swipes, &[Filter::eq("swiperId", swiper_id)])
            .await?;

        Ok(documents
            .iter()
            .filter_map(|doc| doc.get("swipedUserId").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Append one swipe record. Not deduplicated.
    pub async fn record_swipe(
        &self,
        swiper_id: &str,
        swiped_user_id: &str,
        liked: bool,
    ) -> Result<Swipe, SparError> {
        let swipe = Swipe {
            id: Uuid::new_v4().to_string(),
            swiper_id: swiper_id.to_string(),
            swiped_user_id: swiped_user_id.to_string(),
            liked,
            created_at: Utc::now(),
        };

        self.store
            .insert(Collection::Swipes, &swipe.id, serde_json::to_value(&swipe)?)
            .await?;

        tracing::debug!("Recorded swipe {} -> {} (liked: {})", swiper_id, swiped_user_id, liked);
        Ok(swipe)
    }

    /// Whether `swiper_id` has ever liked `target_id`
    pub async fn has_liked(&self, swiper_id: &str, target_id: &str) -> Result<bool, SparError> {
        let documents = self
            .store
            .query(
                Collection::Swipes,
                &[
                    Filter::eq("swiperId", swiper_id),
                    Filter::eq("swipedUserId", target_id),
                    Filter::eq("liked", true),
                ],
            )
            .await?;
        Ok(!documents.is_empty())
    }

    /// Create a pending match embedding snapshots of both profiles
    pub async fn create_match(&self, user1: &Profile, user2: &Profile) -> Result<Match, SparError> {
        let fight = Match {
            id: self.match_ids.id_for(&user1.id, &user2.id),
            user1_id: user1.id.clone(),
            user2_id: user2.id.clone(),
            user1: user1.clone(),
            user2: user2.clone(),
            created_at: Utc::now(),
            status: MatchStatus::Pending,
            fight_date: None,
            location: None,
            result: None,
        };

        match self
            .store
            .insert(Collection::Matches, &fight.id, serde_json::to_value(&fight)?)
            .await
        {
            Ok(_) => {
                tracing::info!("Match {} created: {} vs {}", fight.id, user1.id, user2.id);
                Ok(fight)
            }
            Err(StoreError::Conflict(detail)) if self.match_ids == MatchIds::PairUnique => {
                tracing::info!("Pair {} / {} already matched ({})", user1.id, user2.id, detail);
                let existing = self
                    .store
                    .get(Collection::Matches, &fight.id)
                    .await?
                    .ok_or(StoreError::Conflict(detail))?;
                Ok(decode(existing)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Decide on the deck's current candidate.
    ///
    /// The cursor only moves once every store call succeeded; on error the
    /// same candidate stays on top.
    pub async fn swipe(
        &self,
        session: &Session,
        deck: &mut CandidateDeck,
        liked: bool,
    ) -> Result<SwipeOutcome, SparError> {
        let candidate = deck.current().cloned().ok_or_else(|| {
            SparError::Validation("No candidates left, reset to start over".to_string())
        })?;
        let me = session.profile_id.as_str();

        let swipe = self.record_swipe(me, &candidate.id, liked).await?;

        let mut matched = None;
        if liked && self.has_liked(&candidate.id, me).await? {
            let own = self
                .store
                .get(Collection::Users, me)
                .await?
                .ok_or_else(|| SparError::NotFound(format!("profile {}", me)))?;
            let own: Profile = decode(own)?;
            matched = Some(self.create_match(&own, &candidate).await?);
        }

        deck.advance();

        let notice = matched.as_ref().map(|_| {
            format!("You matched with {}! Time to fight!", candidate.display_name)
        });

        Ok(SwipeOutcome {
            swipe,
            matched,
            notice,
        })
    }
}
