//! Types for the media module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// MIME type applied to every attachment stream.
pub const ATTACHMENT_MIME_TYPE: &str = "image/jpeg";

/// Largest CRF accepted by x264/x265.
pub const MAX_CRF: u8 = 51;

/// Identifies a media operation in reports, logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    StripMetadata,
    RewriteMetadata,
    ExtractSample,
    AttachFile,
    Merge,
    Compress,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StripMetadata => "strip_metadata",
            Self::RewriteMetadata => "rewrite_metadata",
            Self::ExtractSample => "extract_sample",
            Self::AttachFile => "attach_file",
            Self::Merge => "merge",
            Self::Compress => "compress",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-stream titles written by metadata rewriting.
///
/// The video title is also written as the container title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTitles {
    pub video: String,
    pub audio: String,
    pub subtitle: String,
}

impl StreamTitles {
    pub fn new(
        video: impl Into<String>,
        audio: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Self {
        Self {
            video: video.into(),
            audio: audio.into(),
            subtitle: subtitle.into(),
        }
    }
}

/// Encoding parameters for compression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionParams {
    /// Encoder preset. Recorded for callers but not passed to ffmpeg.
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Constant Rate Factor (quality, lower = better, 0-51 for x265).
    #[serde(default = "default_crf")]
    pub crf: u8,
    /// Video encoder.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    /// Audio encoder.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_crf() -> u8 {
    27
}

fn default_video_codec() -> String {
    "libx265".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            crf: default_crf(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
        }
    }
}

impl CompressionParams {
    /// Sets the CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Sets the preset.
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }
}

/// Captured result of one subprocess invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Result of a successful media operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation: Operation,
    pub output_path: PathBuf,
    /// Size of the output file, 0 when it could not be read.
    pub output_size_bytes: u64,
    /// Wall time of the operation in milliseconds.
    pub elapsed_ms: u64,
}

/// Progress event emitted while ffmpeg compresses a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionProgress {
    /// Total bytes read from ffmpeg's progress output so far.
    pub bytes_read: u64,
    /// Total lines read so far.
    pub lines_read: u64,
}
