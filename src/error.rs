use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::{AuthError, StoreError};

/// Message shown for any backend failure; details only go to the log
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Every failure the service can report
#[derive(Debug, Clone, Error)]
pub enum SparError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for SparError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SparError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for SparError {
    fn from(err: serde_json::Error) -> Self {
        SparError::Internal(format!("serialization failed: {}", err))
    }
}

impl SparError {
    fn code(&self) -> &'static str {
        match self {
            SparError::Auth(_) => "auth_failed",
            SparError::Store(_) => "store_failed",
            SparError::Validation(_) => "validation_failed",
            SparError::NotFound(_) => "not_found",
            SparError::Unauthorized(_) => "unauthorized",
            SparError::Internal(_) => "internal",
        }
    }

    /// Text safe to show to the end user
    pub fn user_message(&self) -> String {
        match self {
            SparError::Store(_) | SparError::Internal(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for SparError {
    fn status_code(&self) -> StatusCode {
        match self {
            SparError::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
            SparError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            SparError::Auth(AuthError::Provider(_)) => StatusCode::BAD_GATEWAY,
            SparError::Store(StoreError::NotFound(_)) | SparError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SparError::Store(_) => StatusCode::BAD_GATEWAY,
            SparError::Validation(_) => StatusCode::BAD_REQUEST,
            SparError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SparError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::info!("Request rejected: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.user_message(),
            status_code: status.as_u16(),
        })
    }
}
