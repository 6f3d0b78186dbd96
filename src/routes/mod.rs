// Route exports
pub mod auth;
pub mod matches;
pub mod swipes;

use actix_web::{error, http::header, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::{CandidateDeck, MatchLifecycle, Session, SessionManager, SwipeEngine};
use crate::error::SparError;
use crate::models::HealthResponse;
use crate::services::{CacheKey, CacheManager};

/// A session's deck, shared between its concurrent requests
pub type SharedDeck = Arc<Mutex<CandidateDeck>>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub swipes: Arc<SwipeEngine>,
    pub matches: Arc<MatchLifecycle>,
    pub decks: CacheManager<SharedDeck>,
}

impl AppState {
    /// Resolve the bearer token on the request into a live session
    pub async fn authenticate(&self, req: &HttpRequest) -> Result<Session, SparError> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| SparError::Unauthorized("missing bearer token".to_string()))?;

        self.sessions.restore(token.trim()).await
    }

    /// The session's deck, sourcing a fresh one on first use. Concurrent
    /// first requests share one load.
    pub async fn deck(&self, session: &Session) -> Result<SharedDeck, SparError> {
        let key = CacheKey::deck(session.id());
        self.decks
            .get_or_try_insert_with(&key, async {
                let deck = self.swipes.load_deck(session).await?;
                Ok::<_, SparError>(Arc::new(Mutex::new(deck)))
            })
            .await
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(swipes::configure)
            .configure(matches::configure),
    );
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Report malformed JSON bodies in the service's error format
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    SparError::Validation(format!("Invalid JSON: {}", err)).into()
}
