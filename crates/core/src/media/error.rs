//! Error types for the media module.

use std::path::PathBuf;
use thiserror::Error;

use crate::notify::NotifyError;

/// Errors that can occur while running a media operation.
#[derive(Debug, Error)]
pub enum MediaError {
    /// External binary could not be spawned because it does not exist.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: &'static str, path: PathBuf },

    /// Input (or attachment) file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// External tool exited with a non-zero status.
    #[error("{tool} error: {stderr}")]
    ExternalTool {
        tool: &'static str,
        status: Option<i32>,
        stderr: String,
    },

    /// Requested sample duration is negative, not finite or longer than the source.
    #[error("Requested duration {requested_secs}s is not valid for a source of {total_secs}s")]
    InvalidDuration { requested_secs: f64, total_secs: f64 },

    /// ffprobe produced output that does not contain a duration.
    #[error("Failed to parse probe output: {reason}")]
    ProbeParse { reason: String },

    /// A concat list file could not be parsed.
    #[error("Invalid concat list: {reason}")]
    InvalidConcatList { reason: String },

    /// Concatenation failed; wraps the underlying cause.
    #[error("Error merging videos: {source}")]
    MergeFailed {
        #[source]
        source: Box<MediaError>,
    },

    /// The external tool did not finish in time and was killed.
    #[error("Operation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The status collaborator rejected an update.
    #[error("Status notification failed: {0}")]
    Notify(#[from] NotifyError),

    /// I/O error while spawning or talking to the subprocess.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Creates an external tool error from a finished process.
    pub fn external_tool(tool: &'static str, status: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool,
            status,
            stderr: stderr.into(),
        }
    }

    /// Creates a probe parse error.
    pub fn probe_parse(reason: impl Into<String>) -> Self {
        Self::ProbeParse {
            reason: reason.into(),
        }
    }

    /// Wraps an error as a merge failure.
    pub fn merge_failed(source: MediaError) -> Self {
        Self::MergeFailed {
            source: Box::new(source),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Io(_) => true,
            Self::MergeFailed { source } => source.is_retryable(),
            _ => false,
        }
    }

    /// Short stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToolNotFound { .. } => "tool_not_found",
            Self::InputNotFound { .. } => "input_not_found",
            Self::ExternalTool { .. } => "external_tool",
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::ProbeParse { .. } => "probe_parse",
            Self::InvalidConcatList { .. } => "invalid_concat_list",
            Self::MergeFailed { .. } => "merge_failed",
            Self::Timeout { .. } => "timeout",
            Self::Notify(_) => "notify",
            Self::Io(_) => "io",
        }
    }
}
