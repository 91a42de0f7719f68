//! Media operation API handlers.

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use mediaforge_core::{media::MAX_CRF, ConcatList, MediaError, OperationReport, StreamTitles};

use super::error::ApiError;
use super::ws::WsStatusNotifier;
use crate::metrics::COMPRESSION_JOBS_STARTED;
use crate::state::{AppState, CompressionJob, JobState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripRequest {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub video_title: String,
    pub audio_title: String,
    pub subtitle_title: String,
}

#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub duration_secs: f64,
}

#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    pub input: PathBuf,
    pub attachment: PathBuf,
    pub output: PathBuf,
}

/// Either an existing concat list or the inputs to build one from.
#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub list_file: Option<PathBuf>,
    pub inputs: Option<Vec<PathBuf>>,
    pub output: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct CompressRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Chat the status messages are posted to; defaults to the job id
    pub chat_id: Option<String>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompressAccepted {
    pub job_id: String,
    pub chat_id: String,
}

fn require_path(field: &str, path: &Path) -> Result<(), ApiError> {
    if path.as_os_str().is_empty() {
        return Err(ApiError::invalid_request(format!("{} must not be empty", field)));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/media/strip
pub async fn strip_metadata(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StripRequest>,
) -> Result<Json<OperationReport>, ApiError> {
    require_path("input", &body.input)?;
    require_path("output", &body.output)?;

    let report = state
        .toolkit()
        .strip_metadata(&body.input, &body.output)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/media/metadata
pub async fn rewrite_metadata(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MetadataRequest>,
) -> Result<Json<OperationReport>, ApiError> {
    require_path("input", &body.input)?;
    require_path("output", &body.output)?;

    let titles = StreamTitles::new(body.video_title, body.audio_title, body.subtitle_title);
    let report = state
        .toolkit()
        .rewrite_metadata(&body.input, &titles, &body.output)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/media/sample
pub async fn extract_sample(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SampleRequest>,
) -> Result<Json<OperationReport>, ApiError> {
    require_path("input", &body.input)?;
    require_path("output", &body.output)?;

    let report = state
        .toolkit()
        .extract_sample(&body.input, body.duration_secs, &body.output)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/media/attach
pub async fn attach_file(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AttachRequest>,
) -> Result<Json<OperationReport>, ApiError> {
    require_path("input", &body.input)?;
    require_path("attachment", &body.attachment)?;
    require_path("output", &body.output)?;

    let report = state
        .toolkit()
        .attach_file(&body.input, &body.attachment, &body.output)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/media/merge
///
/// A `list_file` is parsed before ffmpeg runs. With `inputs`, a temporary
/// concat list of absolute paths is written to the tools temp dir and removed
/// afterwards.
pub async fn merge(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MergeRequest>,
) -> Result<Json<OperationReport>, ApiError> {
    require_path("output", &body.output)?;

    match (body.list_file, body.inputs) {
        (Some(list_file), None) => {
            require_path("list_file", &list_file)?;
            ConcatList::read_from(&list_file).await?;
            let report = state.toolkit().merge(&list_file, &body.output).await?;
            Ok(Json(report))
        }
        (None, Some(inputs)) => {
            if inputs.is_empty() {
                return Err(ApiError::invalid_request("inputs must not be empty"));
            }
            for input in &inputs {
                require_path("inputs", input)?;
            }

            // The demuxer resolves relative entries against the list's own directory.
            let inputs = inputs
                .iter()
                .map(std::path::absolute)
                .collect::<Result<Vec<_>, _>>()
                .map_err(MediaError::from)?;
            let list = ConcatList::new(inputs);
            let list_file = state
                .config()
                .tools
                .temp_dir
                .join(format!("concat-{}.txt", Uuid::new_v4()));
            list.write_to(&list_file).await?;

            let result = state.toolkit().merge(&list_file, &body.output).await;

            if let Err(e) = tokio::fs::remove_file(&list_file).await {
                warn!(path = %list_file.display(), error = %e, "Failed to remove concat list");
            }
            Ok(Json(result?))
        }
        _ => Err(ApiError::invalid_request(
            "exactly one of list_file or inputs is required",
        )),
    }
}

/// POST /api/v1/media/compress
///
/// Starts compression in the background. Status messages are published to
/// WebSocket clients and the job can be polled at `/media/jobs/{id}`.
pub async fn compress(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompressRequest>,
) -> Result<(StatusCode, Json<CompressAccepted>), ApiError> {
    require_path("input", &body.input)?;
    require_path("output", &body.output)?;

    let mut params = state.config().compression.clone();
    if let Some(crf) = body.crf {
        if crf > MAX_CRF {
            return Err(ApiError::invalid_request(format!(
                "crf must be between 0 and {}",
                MAX_CRF
            )));
        }
        params.crf = crf;
    }
    if let Some(preset) = body.preset {
        params.preset = preset;
    }

    let job_id = Uuid::new_v4().to_string();
    let chat_id = body.chat_id.unwrap_or_else(|| job_id.clone());

    state
        .insert_job(CompressionJob {
            job_id: job_id.clone(),
            chat_id: chat_id.clone(),
            input: body.input.clone(),
            output: body.output.clone(),
            state: JobState::Running,
            started_at: Utc::now(),
            finished_at: None,
        })
        .await;
    COMPRESSION_JOBS_STARTED.inc();
    info!(job_id = %job_id, chat_id = %chat_id, input = %body.input.display(), "Compression job accepted");

    let task_state = Arc::clone(&state);
    let task_job_id = job_id.clone();
    let task_chat_id = chat_id.clone();
    tokio::spawn(async move {
        let notifier = WsStatusNotifier::new(task_state.ws_broadcaster().clone());
        let result = task_state
            .toolkit()
            .compress(&body.input, &body.output, &params, &notifier, &task_chat_id)
            .await;

        let (job_state, error) = match result {
            Ok(report) => (
                JobState::Completed {
                    output_size_bytes: report.output_size_bytes,
                },
                None,
            ),
            Err(e) => {
                let message = e.to_string();
                (
                    JobState::Failed {
                        error: message.clone(),
                    },
                    Some(message),
                )
            }
        };
        task_state.finish_job(&task_job_id, job_state).await;
        task_state
            .ws_broadcaster()
            .job_finished(&task_job_id, error);
    });

    Ok((StatusCode::ACCEPTED, Json(CompressAccepted { job_id, chat_id })))
}

/// GET /api/v1/media/jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    UrlPath(job_id): UrlPath<String>,
) -> Result<Json<CompressionJob>, ApiError> {
    state
        .job(&job_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Job not found: {}", job_id)))
}
