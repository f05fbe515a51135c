//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`
//! and every error body is JSON: `{ "error": "<message>" }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use songpin_core::{DisplayNameError, GeoError, ProximityError, SongError, UserIdError};

use crate::db::RepositoryError;
use crate::services::playback::PlaybackError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed validation.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Store operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Playback provider rejected the request or was unreachable.
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Playback is not configured on this server.
    #[error("Playback is not configured")]
    PlaybackUnavailable,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_)
            | Self::Repository(RepositoryError::NotFound | RepositoryError::OwnerNotFound(_))
            | Self::Playback(PlaybackError::TrackNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::Repository(RepositoryError::Conflict(_)) => {
                StatusCode::CONFLICT
            }
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Playback(_) => StatusCode::BAD_GATEWAY,
            Self::PlaybackUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether this error is our fault (or an upstream's) rather than the client's.
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Repository(
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ) | Self::Internal(_)
                | Self::Playback(
                    PlaybackError::Http(_)
                        | PlaybackError::Api { .. }
                        | PlaybackError::Config(_)
                        | PlaybackError::Parse(_)
                )
        )
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::Repository(RepositoryError::OwnerNotFound(_)) => "User not found".to_string(),
            Self::Repository(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Playback(PlaybackError::TrackNotFound(_)) => "No matching track found".to_string(),
            Self::Playback(_) => "Playback service error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

impl From<GeoError> for AppError {
    fn from(err: GeoError) -> Self {
        Self::Validation(format!("invalid coordinate: {err}"))
    }
}

impl From<ProximityError> for AppError {
    fn from(err: ProximityError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<SongError> for AppError {
    fn from(err: SongError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<UserIdError> for AppError {
    fn from(err: UserIdError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DisplayNameError> for AppError {
    fn from(err: DisplayNameError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
