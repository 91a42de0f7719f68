//! Trait definitions for the media module.

use async_trait::async_trait;
use std::path::Path;

use super::error::MediaError;
use super::types::{CompressionParams, OperationReport, StreamTitles};
use crate::notify::StatusNotifier;

/// A toolkit that performs media operations by driving external binaries.
///
/// Every operation returns an explicit `Result`; none of them swallow
/// failures. Compression additionally reports failures through the notifier
/// before returning the error.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Returns the name of this toolkit implementation.
    fn name(&self) -> &str;

    /// Copies every stream of `input` to `output` and drops all metadata.
    async fn strip_metadata(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<OperationReport, MediaError>;

    /// Copies video, audio and subtitle streams and sets their titles.
    ///
    /// Missing stream kinds are tolerated.
    async fn rewrite_metadata(
        &self,
        input: &Path,
        titles: &StreamTitles,
        output: &Path,
    ) -> Result<OperationReport, MediaError>;

    /// Returns the container duration of `input` in seconds.
    async fn probe_duration(&self, input: &Path) -> Result<f64, MediaError>;

    /// Cuts `duration_secs` from the middle of `input` without re-encoding.
    ///
    /// Fails with `InvalidDuration` before running ffmpeg when the request
    /// does not fit in the source.
    async fn extract_sample(
        &self,
        input: &Path,
        duration_secs: f64,
        output: &Path,
    ) -> Result<OperationReport, MediaError>;

    /// Copies `input` and adds `attachment` as an attachment stream.
    async fn attach_file(
        &self,
        input: &Path,
        attachment: &Path,
        output: &Path,
    ) -> Result<OperationReport, MediaError>;

    /// Joins the inputs listed in a concat demuxer manifest.
    ///
    /// Every failure is wrapped in `MediaError::MergeFailed`.
    async fn merge(&self, list_file: &Path, output: &Path) -> Result<OperationReport, MediaError>;

    /// Re-encodes `input` while reporting status to `notifier` in `chat_id`.
    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        params: &CompressionParams,
        notifier: &dyn StatusNotifier,
        chat_id: &str,
    ) -> Result<OperationReport, MediaError>;

    /// Validates that the toolkit is properly configured and ready.
    async fn validate(&self) -> Result<(), MediaError>;
}
