//! HTTP error mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clientmap_geocode::{GeocodeError, controller::SEARCH_FAILED_MESSAGE};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Upstream geocoder failed
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("{0}")]
    Internal(String),
}

impl From<clientmap_core::Error> for ApiError {
    fn from(err: clientmap_core::Error) -> Self {
        use clientmap_core::Error;

        let message = err.to_string();
        match err {
            Error::Validation(_) | Error::Serialization(_) => ApiError::BadRequest(message),
            Error::Auth(_) => ApiError::Unauthorized(message),
            Error::RecordNotFound(_) => ApiError::NotFound(message),
            Error::Store(_) | Error::Config(_) | Error::Internal(_) | Error::Io(_) => {
                ApiError::Internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Geocode(err) => {
                warn!("Geocoding request failed: {}", err);
                (StatusCode::BAD_GATEWAY, SEARCH_FAILED_MESSAGE.to_string())
            }
            ApiError::Internal(msg) => {
                warn!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}
