//! Mock media toolkit for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::media::{
    status_failed, CompressionParams, ConcatList, MediaError, MediaToolkit, Operation, OperationReport,
    StreamTitles, STATUS_DONE, STATUS_RUNNING, STATUS_STARTED,
};
use crate::notify::StatusNotifier;

/// Bytes written to outputs when output writing is enabled.
const MOCK_OUTPUT: &[u8] = b"mock media output";

/// A recorded toolkit call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: Operation,
    /// Input paths in argument order (input, attachment or list file).
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Whether the call succeeded.
    pub success: bool,
}

/// Mock implementation of the MediaToolkit trait.
///
/// Provides controllable behavior for testing:
/// - Track calls for assertions
/// - Inject the next error
/// - Control probed durations
/// - Optionally write placeholder output files
#[derive(Debug)]
pub struct MockToolkit {
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    durations: Arc<RwLock<HashMap<PathBuf, f64>>>,
    default_duration_secs: Arc<RwLock<f64>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<MediaError>>>,
    /// Simulated operation time.
    delay_ms: Arc<RwLock<u64>>,
    write_outputs: Arc<RwLock<bool>>,
    /// Concat lists read by `merge`, in call order.
    merge_lists: Arc<RwLock<Vec<ConcatList>>>,
}

impl Default for MockToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolkit {
    /// Create a new mock toolkit.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            durations: Arc::new(RwLock::new(HashMap::new())),
            default_duration_secs: Arc::new(RwLock::new(120.0)),
            next_error: Arc::new(RwLock::new(None)),
            delay_ms: Arc::new(RwLock::new(0)),
            write_outputs: Arc::new(RwLock::new(false)),
            merge_lists: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Set the probed duration for a specific path.
    pub async fn set_duration(&self, path: impl AsRef<Path>, secs: f64) {
        self.durations
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), secs);
    }

    /// Set the duration returned for unknown paths.
    pub async fn set_default_duration(&self, secs: f64) {
        *self.default_duration_secs.write().await = secs;
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: MediaError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated operation duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Write a small placeholder file to every output path.
    pub async fn set_write_outputs(&self, write: bool) {
        *self.write_outputs.write().await = write;
    }

    /// Concat lists seen by `merge`. Unreadable lists are not recorded.
    pub async fn merge_lists(&self) -> Vec<ConcatList> {
        self.merge_lists.read().await.clone()
    }

    async fn take_error(&self) -> Option<MediaError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, operation: Operation, inputs: &[&Path], output: &Path, success: bool) {
        self.calls.write().await.push(RecordedCall {
            operation,
            inputs: inputs.iter().map(|p| p.to_path_buf()).collect(),
            output: output.to_path_buf(),
            success,
        });
    }

    /// Shared body of every file-producing operation.
    async fn run(
        &self,
        operation: Operation,
        inputs: &[&Path],
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        if let Some(err) = self.take_error().await {
            self.record(operation, inputs, output, false).await;
            return Err(err);
        }

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let mut output_size_bytes = 0;
        if *self.write_outputs.read().await {
            tokio::fs::write(output, MOCK_OUTPUT).await?;
            output_size_bytes = MOCK_OUTPUT.len() as u64;
        }

        self.record(operation, inputs, output, true).await;
        Ok(OperationReport {
            operation,
            output_path: output.to_path_buf(),
            output_size_bytes,
            elapsed_ms: delay_ms,
        })
    }
}

#[async_trait]
impl MediaToolkit for MockToolkit {
    fn name(&self) -> &str {
        "mock"
    }

    async fn strip_metadata(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        self.run(Operation::StripMetadata, &[input], output).await
    }

    async fn rewrite_metadata(
        &self,
        input: &Path,
        _titles: &StreamTitles,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        self.run(Operation::RewriteMetadata, &[input], output).await
    }

    async fn probe_duration(&self, input: &Path) -> Result<f64, MediaError> {
        if let Some(secs) = self.durations.read().await.get(input) {
            return Ok(*secs);
        }
        Ok(*self.default_duration_secs.read().await)
    }

    async fn extract_sample(
        &self,
        input: &Path,
        duration_secs: f64,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        let total_secs = self.probe_duration(input).await?;
        if !duration_secs.is_finite() || duration_secs < 0.0 || duration_secs > total_secs {
            self.record(Operation::ExtractSample, &[input], output, false)
                .await;
            return Err(MediaError::InvalidDuration {
                requested_secs: duration_secs,
                total_secs,
            });
        }
        self.run(Operation::ExtractSample, &[input], output).await
    }

    async fn attach_file(
        &self,
        input: &Path,
        attachment: &Path,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        self.run(Operation::AttachFile, &[input, attachment], output)
            .await
    }

    async fn merge(&self, list_file: &Path, output: &Path) -> Result<OperationReport, MediaError> {
        if let Ok(list) = ConcatList::read_from(list_file).await {
            self.merge_lists.write().await.push(list);
        }
        self.run(Operation::Merge, &[list_file], output)
            .await
            .map_err(MediaError::merge_failed)
    }

    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        _params: &CompressionParams,
        notifier: &dyn StatusNotifier,
        chat_id: &str,
    ) -> Result<OperationReport, MediaError> {
        let handle = notifier.send_status(chat_id, STATUS_STARTED).await?;
        // Intermediate edits are best effort, as in the real toolkit.
        let _ = notifier.edit_status(&handle, STATUS_RUNNING).await;

        match self.run(Operation::Compress, &[input], output).await {
            Ok(report) => {
                let _ = notifier.edit_status(&handle, STATUS_DONE).await;
                Ok(report)
            }
            Err(e) => {
                let _ = notifier.edit_status(&handle, &status_failed(&e)).await;
                Err(e)
            }
        }
    }

    async fn validate(&self) -> Result<(), MediaError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(())
    }
}
