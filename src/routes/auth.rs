use actix_web::{http::header, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::core::PhotoUpload;
use crate::error::SparError;
use crate::models::{ProfileUpdate, SessionResponse, SignInRequest, SignUpRequest};
use crate::routes::AppState;
use crate::services::CacheKey;

/// Configure account and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/signup", web::post().to(sign_up))
        .route("/auth/signin", web::post().to(sign_in))
        .route("/auth/signout", web::post().to(sign_out))
        .route("/profile", web::get().to(get_profile))
        .route("/profile", web::patch().to(update_profile))
        .route("/profile/photo", web::put().to(upload_photo));
}

/// POST /api/v1/auth/signup
///
/// Takes the profile as JSON only. A photo chosen during sign-up is sent
/// afterwards with `PUT /api/v1/profile/photo` using the returned token.
async fn sign_up(
    state: web::Data<AppState>,
    req: web::Json<SignUpRequest>,
) -> Result<HttpResponse, SparError> {
    let (session, profile) = state.sessions.sign_up(req.into_inner(), None).await?;

    Ok(HttpResponse::Created().json(SessionResponse {
        token: session.token,
        profile: Some(profile),
    }))
}

/// POST /api/v1/auth/signin
///
/// A signed-in account without a profile document gets `profile: null`.
async fn sign_in(
    state: web::Data<AppState>,
    req: web::Json<SignInRequest>,
) -> Result<HttpResponse, SparError> {
    req.validate()?;

    let session = state.sessions.sign_in(&req.email, &req.password).await?;
    let profile = state.sessions.current_profile(&session).await?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        token: session.token,
        profile,
    }))
}

/// POST /api/v1/auth/signout
async fn sign_out(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;

    state.decks.delete(&CacheKey::deck(session.id())).await;
    state.sessions.sign_out(session).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/profile
async fn get_profile(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;

    let profile = state
        .sessions
        .current_profile(&session)
        .await?
        .ok_or_else(|| SparError::NotFound(format!("profile {}", session.profile_id)))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// PATCH /api/v1/profile
async fn update_profile(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;
    let profile = state
        .sessions
        .update_profile(&session, req.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/v1/profile/photo
///
/// Raw image bytes in the body, type in `Content-Type`.
async fn upload_photo(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, SparError> {
    let session = state.authenticate(&http_req).await?;

    let content_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let photo = PhotoUpload {
        bytes: body.to_vec(),
        content_type,
    };
    let profile = state.sessions.upload_photo(&session, photo).await?;

    Ok(HttpResponse::Ok().json(profile))
}
