use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::listings::{CreateRejected, ListingServiceError, RepositoryError};
use crate::telemetry::TelemetryError;

/// Process-level failure surfaced by the binaries.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("listing error: {0}")]
    Listing(#[from] ListingServiceError),
    #[error("listing error: {0}")]
    Rejected(#[from] CreateRejected),
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Listing(error) if error.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Listing(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
