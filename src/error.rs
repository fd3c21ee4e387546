use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{gate::Screen, query::QueryError};

/// ApiError
///
/// Failures a handler or the access gate hands back to the client. Each variant
/// maps to one status code; the body is always `{ "error": ... }`, plus a
/// `redirect` path when access was denied.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    // Query string that could not be deserialized at all (bad number, date, difficulty).
    #[error("{}", .0.body_text())]
    MalformedQuery(#[from] QueryRejection),

    #[error("question '{0}' not found")]
    NotFound(String),

    #[error("access denied")]
    Denied(Screen),

    #[error("session resolution is still pending")]
    SessionPending,

    #[error("invalid payload: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) | ApiError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Denied(Screen::Login) => StatusCode::UNAUTHORIZED,
            ApiError::Denied(Screen::Home) => StatusCode::FORBIDDEN,
            ApiError::SessionPending => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Denied(screen) => json!({
                "error": self.to_string(),
                "redirect": screen.path(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
