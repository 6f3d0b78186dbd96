use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::SparError;
use crate::models::{MatchView, ScheduleRequest};
use crate::routes::AppState;

/// Configure match lifecycle routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches", web::get().to(list_matches))
        .route("/matches/{match_id}/schedule", web::post().to(schedule_match));
}

/// GET /api/v1/matches
///
/// Newest first, each with the opponent's snapshot resolved for the caller.
async fn list_matches(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;
    let matches = state.matches.list_matches(&session).await?;

    let views: Vec<MatchView> = matches
        .into_iter()
        .map(|m| MatchView::for_profile(m, &session.profile_id))
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

/// POST /api/v1/matches/{match_id}/schedule
///
/// Request body:
/// ```json
/// { "fightDate": "2025-06-14T19:30", "location": "string" }
/// ```
async fn schedule_match(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<String>,
    req: web::Json<ScheduleRequest>,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;
    let match_id = path.into_inner();

    let scheduled = state.matches.schedule_match(&match_id, &req).await?;

    Ok(HttpResponse::Ok().json(MatchView::for_profile(scheduled, &session.profile_id)))
}
