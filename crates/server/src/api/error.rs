//! Mapping of domain errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use mediaforge_core::MediaError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The request body is well-formed JSON but semantically invalid.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// HTTP status for a media error. Merge failures use their cause's status.
fn media_status(err: &MediaError) -> StatusCode {
    match err {
        MediaError::InvalidDuration { .. } | MediaError::InvalidConcatList { .. } => {
            StatusCode::BAD_REQUEST
        }
        MediaError::InputNotFound { .. } => StatusCode::NOT_FOUND,
        MediaError::ToolNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
        MediaError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        MediaError::MergeFailed { source } => media_status(source),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        let status = media_status(&err);
        if status.is_server_error() {
            error!(error = %err, "Media operation failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_media_error_mapping() {
        let cases = [
            (
                MediaError::InvalidDuration {
                    requested_secs: 10.0,
                    total_secs: 5.0,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                MediaError::InputNotFound {
                    path: PathBuf::from("/x"),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                MediaError::ToolNotFound {
                    tool: "ffmpeg",
                    path: PathBuf::from("ffmpeg"),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                MediaError::Timeout { timeout_secs: 1 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                MediaError::external_tool("ffmpeg", Some(1), "boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_merge_failed_uses_cause_status() {
        let err = MediaError::merge_failed(MediaError::InputNotFound {
            path: PathBuf::from("/list.txt"),
        });
        let api = ApiError::from(err);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert!(api.message.starts_with("Error merging videos"));
    }
}
