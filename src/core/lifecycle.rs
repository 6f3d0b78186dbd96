use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::core::decode;
use crate::core::session::Session;
use crate::error::SparError;
use crate::models::{Match, MatchStatus, ScheduleRequest};
use crate::services::{Collection, DocumentStore, Filter};

/// Formats accepted for a fight date besides RFC 3339. The first is what a
/// browser `datetime-local` input submits.
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a submitted fight date. Dates without an offset are taken as UTC.
pub fn parse_fight_date(raw: &str) -> Result<DateTime<Utc>, SparError> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| SparError::Validation(format!("Unrecognised fight date: {}", raw)))
}

/// Most recently created first
pub fn sort_newest_first(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Lists a user's matches and moves them from `pending` to `scheduled`.
///
/// Nothing here produces `accepted` or `completed`, and no fight result is
/// ever written.
pub struct MatchLifecycle {
    store: Arc<dyn DocumentStore>,
}

impl MatchLifecycle {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every match the session holder takes part in, newest first
    pub async fn list_matches(&self, session: &Session) -> Result<Vec<Match>, SparError> {
        let me = session.profile_id.as_str();
        let documents = self
            .store
            .query(
                Collection::Matches,
                &[Filter::or(vec![
                    Filter::eq("user1Id", me),
                    Filter::eq("user2Id", me),
                ])],
            )
            .await?;

        let mut matches = documents
            .into_iter()
            .map(decode::<Match>)
            .collect::<Result<Vec<_>, _>>()?;
        sort_newest_first(&mut matches);

        tracing::debug!("Listed {} matches for {}", matches.len(), me);
        Ok(matches)
    }

    pub async fn get_match(&self, match_id: &str) -> Result<Match, SparError> {
        let document = self
            .store
            .get(Collection::Matches, match_id)
            .await?
            .ok_or_else(|| SparError::NotFound(format!("match {}", match_id)))?;
        Ok(decode(document)?)
    }

    /// Set date and place and mark the match `scheduled`.
    ///
    /// Blank inputs are rejected before the store is touched. The current
    /// status, the caller's participation and clashes with other fights are
    /// not checked.
    pub async fn schedule_match(
        &self,
        match_id: &str,
        request: &ScheduleRequest,
    ) -> Result<Match, SparError> {
        let location = request.location.trim();
        if request.fight_date.trim().is_empty() || location.is_empty() {
            return Err(SparError::Validation(
                "Fight date and location are required".to_string(),
            ));
        }
        let fight_date = parse_fight_date(&request.fight_date)?;

        self.get_match(match_id).await?;

        self.store
            .update(
                Collection::Matches,
                match_id,
                json!({
                    "fightDate": fight_date,
                    "location": location,
                    "status": MatchStatus::Scheduled,
                }),
            )
            .await?;

        tracing::info!("Match {} scheduled for {} at {}", match_id, fight_date, location);

        self.get_match(match_id).await
    }
}
