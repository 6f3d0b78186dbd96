use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::SparError;
use crate::models::{CandidateResponse, SwipeRequest, SwipeResponse};
use crate::routes::AppState;
use crate::services::CacheKey;

/// Configure swipe routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swipes/candidate", web::get().to(current_candidate))
        .route("/swipes", web::post().to(swipe))
        .route("/swipes/reset", web::post().to(reset));
}

/// GET /api/v1/swipes/candidate
async fn current_candidate(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;
    let deck = state.deck(&session).await?;
    let deck = deck.lock().await;

    Ok(HttpResponse::Ok().json(CandidateResponse {
        candidate: deck.current().cloned(),
        remaining: deck.remaining(),
    }))
}

/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// { "liked": true }
/// ```
async fn swipe(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;
    let deck = state.deck(&session).await?;
    let mut deck = deck.lock().await;

    let outcome = state.swipes.swipe(&session, &mut deck, req.liked).await?;

    if let Some(notice) = &outcome.notice {
        tracing::info!("{} -> {}", session.profile_id, notice);
    }

    Ok(HttpResponse::Ok().json(SwipeResponse {
        swipe_id: outcome.swipe.id,
        matched: outcome.matched,
        notice: outcome.notice,
        next: deck.current().cloned(),
        remaining: deck.remaining(),
    }))
}

/// POST /api/v1/swipes/reset
async fn reset(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;
    let deck = state.swipes.reset(&session).await?;

    let response = CandidateResponse {
        candidate: deck.current().cloned(),
        remaining: deck.remaining(),
    };
    state
        .decks
        .set(&CacheKey::deck(session.id()), Arc::new(Mutex::new(deck)))
        .await;

    Ok(HttpResponse::Ok().json(response))
}
