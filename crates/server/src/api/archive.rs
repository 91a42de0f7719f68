//! Archive API handlers.

use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use mediaforge_core::extract_archive_best_effort;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub archive: PathBuf,
    pub dest: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub entries: Vec<String>,
}

/// POST /api/v1/archive/extract
///
/// Best effort: unreadable or unsupported archives yield an empty list.
pub async fn extract(
    Json(body): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    if body.archive.as_os_str().is_empty() || body.dest.as_os_str().is_empty() {
        return Err(ApiError::invalid_request("archive and dest are required"));
    }

    let entries = tokio::task::spawn_blocking(move || {
        extract_archive_best_effort(&body.archive, &body.dest)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Extraction task failed: {}", e)))?;

    Ok(Json(ExtractResponse { entries }))
}
