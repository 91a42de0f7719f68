//! ffmpeg/ffprobe-backed toolkit implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::ToolsConfig;
use super::error::MediaError;
use super::process::{ensure_success, path_arg, require_file, run_tool, spawn_tool};
use super::progress::{
    collect_output, read_progress, status_failed, ProgressMeter, STATUS_DONE, STATUS_RUNNING,
    STATUS_STARTED,
};
use super::traits::MediaToolkit;
use super::types::{
    CompressionParams, Operation, OperationReport, StreamTitles, ATTACHMENT_MIME_TYPE,
};
use crate::metrics::{record_operation, STATUS_EDITS};
use crate::notify::{StatusHandle, StatusNotifier};

const FFMPEG: &str = "ffmpeg";
const FFPROBE: &str = "ffprobe";

/// Buffered progress snapshots between the monitor task and the operation.
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Media toolkit that shells out to ffmpeg and ffprobe.
pub struct FfmpegToolkit {
    config: ToolsConfig,
}

impl FfmpegToolkit {
    /// Creates a new toolkit with the given configuration.
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    /// Creates a toolkit with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ToolsConfig::default())
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Appends log level, extra args, the output path and optionally `-y`.
    fn finish_args(&self, args: &mut Vec<String>, output: &Path, overwrite: bool) {
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(path_arg(output));
        if overwrite {
            args.push("-y".to_string());
        }
    }

    /// Builds ffmpeg arguments for metadata stripping.
    fn build_strip_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            path_arg(input),
            "-map".to_string(),
            "0".to_string(),
            "-map_metadata".to_string(),
            "-1".to_string(),
            "-c".to_string(),
            "copy".to_string(),
        ];
        self.finish_args(&mut args, output, true);
        args
    }

    /// Builds ffmpeg arguments for title rewriting.
    fn build_metadata_args(&self, input: &Path, titles: &StreamTitles, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            path_arg(input),
            "-metadata".to_string(),
            format!("title={}", titles.video),
            "-metadata:s:v".to_string(),
            format!("title={}", titles.video),
            "-metadata:s:a".to_string(),
            format!("title={}", titles.audio),
            "-metadata:s:s".to_string(),
            format!("title={}", titles.subtitle),
        ];
        args.extend(optional_stream_copy_args());
        self.finish_args(&mut args, output, true);
        args
    }

    /// Builds ffprobe arguments that print only the container duration.
    fn build_probe_args(input: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path_arg(input),
        ]
    }

    /// Builds ffmpeg arguments for a stream-copied sample.
    fn build_sample_args(
        &self,
        input: &Path,
        start_secs: f64,
        duration_secs: f64,
        output: &Path,
    ) -> Vec<String> {
        let mut args = vec![
            "-ss".to_string(),
            format!("{:.3}", start_secs),
            "-i".to_string(),
            path_arg(input),
            "-t".to_string(),
            format!("{:.3}", duration_secs),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
        ];
        self.finish_args(&mut args, output, true);
        args
    }

    /// Builds ffmpeg arguments for attachment embedding.
    fn build_attach_args(&self, input: &Path, attachment: &Path, output: &Path) -> Vec<String> {
        let mut args = vec!["-i".to_string(), path_arg(input)];
        args.extend(optional_stream_copy_args());
        args.extend([
            "-attach".to_string(),
            path_arg(attachment),
            "-metadata:s:t".to_string(),
            format!("mimetype={}", ATTACHMENT_MIME_TYPE),
        ]);
        self.finish_args(&mut args, output, true);
        args
    }

    /// Builds ffmpeg arguments for the concat demuxer.
    fn build_merge_args(&self, list_file: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            path_arg(list_file),
            "-c".to_string(),
            "copy".to_string(),
            "-map".to_string(),
            "0".to_string(),
        ];
        self.finish_args(&mut args, output, false);
        args
    }

    /// Builds ffmpeg arguments for compression.
    ///
    /// `params.preset` is deliberately not passed.
    fn build_compress_args(
        &self,
        input: &Path,
        output: &Path,
        params: &CompressionParams,
    ) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            path_arg(input),
            "-c:v".to_string(),
            params.video_codec.clone(),
            "-crf".to_string(),
            params.crf.to_string(),
            "-c:a".to_string(),
            params.audio_codec.clone(),
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-nostats".to_string(),
        ];
        self.finish_args(&mut args, output, true);
        args
    }

    /// Parses the single value printed by the duration probe.
    fn parse_duration(stdout: &str) -> Result<f64, MediaError> {
        let value = stdout.trim();
        let duration = value.parse::<f64>().map_err(|e| {
            MediaError::probe_parse(format!("expected a duration, got {:?}: {}", value, e))
        })?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(MediaError::probe_parse(format!(
                "duration out of range: {}",
                duration
            )));
        }
        Ok(duration)
    }

    /// Returns the start offset that centres a sample of `duration_secs`.
    fn sample_start(total_secs: f64, duration_secs: f64) -> Result<f64, MediaError> {
        if !duration_secs.is_finite() || duration_secs < 0.0 || duration_secs > total_secs {
            return Err(MediaError::InvalidDuration {
                requested_secs: duration_secs,
                total_secs,
            });
        }
        Ok((total_secs - duration_secs) / 2.0)
    }

    /// Runs ffmpeg to completion, bounded by the configured timeout.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), MediaError> {
        let output = run_tool(
            FFMPEG,
            &self.config.ffmpeg_path,
            args,
            Some(self.config.timeout_secs),
        )
        .await?;
        ensure_success(FFMPEG, output)?;
        Ok(())
    }

    /// Builds the report for a finished operation and records metrics.
    async fn finish(&self, operation: Operation, output: &Path, start: Instant) -> OperationReport {
        let elapsed = start.elapsed();
        let output_size_bytes = match tokio::fs::metadata(output).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(%operation, output = %output.display(), error = %e, "Output not readable after success");
                0
            }
        };
        record_operation(operation.as_str(), "success", elapsed.as_secs_f64());
        info!(
            %operation,
            output = %output.display(),
            output_size_bytes,
            elapsed_ms = elapsed.as_millis() as u64,
            "Media operation completed"
        );
        OperationReport {
            operation,
            output_path: output.to_path_buf(),
            output_size_bytes,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Records a failed operation and hands the error back.
    fn fail(operation: Operation, start: Instant, error: MediaError) -> MediaError {
        record_operation(operation.as_str(), error.kind(), start.elapsed().as_secs_f64());
        warn!(%operation, error = %error, "Media operation failed");
        error
    }

    /// Runs one of the copy-style operations: check inputs, run ffmpeg, report.
    async fn run_copy_operation(
        &self,
        operation: Operation,
        inputs: &[&Path],
        args: Vec<String>,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        let start = Instant::now();
        let result: Result<(), MediaError> = async {
            for input in inputs {
                require_file(input).await?;
            }
            self.run_ffmpeg(&args).await
        }
        .await;

        match result {
            Ok(()) => Ok(self.finish(operation, output, start).await),
            Err(e) => Err(Self::fail(operation, start, e)),
        }
    }

    /// Spawns ffmpeg for compression and drives status updates until it exits.
    async fn monitor_compression(
        &self,
        args: &[String],
        meter: &ProgressMeter,
        notifier: &dyn StatusNotifier,
        handle: &StatusHandle,
    ) -> Result<(), MediaError> {
        let mut child = spawn_tool(FFMPEG, &self.config.ffmpeg_path, args)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stderr was not captured"))?;

        let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let reader = tokio::spawn(read_progress(stdout, progress_tx));
        let stderr_task = tokio::spawn(collect_output(stderr));

        let interval = Duration::from_millis(self.config.progress_interval_ms);
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        let result = timeout(timeout_duration, async {
            let mut last_edit: Option<Instant> = None;

            while let Some(progress) = progress_rx.recv().await {
                meter.update(&progress);

                if last_edit.is_none_or(|t| t.elapsed() >= interval) {
                    match notifier.edit_status(handle, STATUS_RUNNING).await {
                        Ok(()) => STATUS_EDITS.with_label_values(&["ok"]).inc(),
                        Err(e) => {
                            STATUS_EDITS.with_label_values(&["failed"]).inc();
                            warn!(error = %e, "Failed to update compression status");
                        }
                    }
                    last_edit = Some(Instant::now());
                }
            }

            child.wait().await
        })
        .await;

        let status: ExitStatus = match result {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed out ffmpeg");
                }
                reader.abort();
                stderr_task.abort();
                return Err(MediaError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        match reader.await {
            Ok(Ok(total)) => debug!(
                bytes_read = total.bytes_read,
                lines_read = total.lines_read,
                "Progress stream closed"
            ),
            Ok(Err(e)) => warn!(error = %e, "Progress stream read failed"),
            Err(e) => warn!(error = %e, "Progress monitor task failed"),
        }

        if status.success() {
            return Ok(());
        }

        let stderr_text = match stderr_task.await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => format!("<failed to read stderr: {}>", e),
            Err(e) => format!("<stderr task failed: {}>", e),
        };
        Err(MediaError::external_tool(
            FFMPEG,
            status.code(),
            stderr_text.trim_end(),
        ))
    }
}

/// `-map`/`-c` arguments copying video, audio and subtitles when present.
fn optional_stream_copy_args() -> [String; 12] {
    [
        "-map".to_string(),
        "0:v?".to_string(),
        "-map".to_string(),
        "0:a?".to_string(),
        "-map".to_string(),
        "0:s?".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "copy".to_string(),
        "-c:s".to_string(),
        "copy".to_string(),
    ]
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn strip_metadata(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        let args = self.build_strip_args(input, output);
        self.run_copy_operation(Operation::StripMetadata, &[input], args, output)
            .await
    }

    async fn rewrite_metadata(
        &self,
        input: &Path,
        titles: &StreamTitles,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        let args = self.build_metadata_args(input, titles, output);
        self.run_copy_operation(Operation::RewriteMetadata, &[input], args, output)
            .await
    }

    async fn probe_duration(&self, input: &Path) -> Result<f64, MediaError> {
        require_file(input).await?;

        let args = Self::build_probe_args(input);
        let output = run_tool(
            FFPROBE,
            &self.config.ffprobe_path,
            &args,
            Some(self.config.timeout_secs),
        )
        .await?;
        let output = ensure_success(FFPROBE, output)?;

        let duration = Self::parse_duration(&output.stdout)?;
        debug!(input = %input.display(), duration_secs = duration, "Probed duration");
        Ok(duration)
    }

    async fn extract_sample(
        &self,
        input: &Path,
        duration_secs: f64,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        let start = Instant::now();
        let operation = Operation::ExtractSample;

        let result: Result<(), MediaError> = async {
            let total_secs = self.probe_duration(input).await?;
            let start_secs = Self::sample_start(total_secs, duration_secs)?;
            debug!(total_secs, start_secs, duration_secs, "Extracting centred sample");

            let args = self.build_sample_args(input, start_secs, duration_secs, output);
            self.run_ffmpeg(&args).await
        }
        .await;

        match result {
            Ok(()) => Ok(self.finish(operation, output, start).await),
            Err(e) => Err(Self::fail(operation, start, e)),
        }
    }

    async fn attach_file(
        &self,
        input: &Path,
        attachment: &Path,
        output: &Path,
    ) -> Result<OperationReport, MediaError> {
        let args = self.build_attach_args(input, attachment, output);
        self.run_copy_operation(Operation::AttachFile, &[input, attachment], args, output)
            .await
    }

    async fn merge(&self, list_file: &Path, output: &Path) -> Result<OperationReport, MediaError> {
        let start = Instant::now();
        let operation = Operation::Merge;

        let result: Result<(), MediaError> = async {
            require_file(list_file).await?;
            let args = self.build_merge_args(list_file, output);
            self.run_ffmpeg(&args).await
        }
        .await;

        match result {
            Ok(()) => Ok(self.finish(operation, output, start).await),
            Err(e) => Err(Self::fail(operation, start, MediaError::merge_failed(e))),
        }
    }

    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        params: &CompressionParams,
        notifier: &dyn StatusNotifier,
        chat_id: &str,
    ) -> Result<OperationReport, MediaError> {
        let start = Instant::now();
        let operation = Operation::Compress;

        let total_bytes = match tokio::fs::metadata(input).await {
            Ok(meta) => meta.len(),
            Err(_) => {
                let err = MediaError::InputNotFound {
                    path: input.to_path_buf(),
                };
                return Err(Self::fail(operation, start, err));
            }
        };

        // Finished on drop, whichever way this function returns.
        let meter = ProgressMeter::new(total_bytes, self.config.show_progress_bar);

        let handle = match notifier.send_status(chat_id, STATUS_STARTED).await {
            Ok(handle) => handle,
            Err(e) => return Err(Self::fail(operation, start, e.into())),
        };

        let args = self.build_compress_args(input, output, params);
        info!(
            input = %input.display(),
            crf = params.crf,
            preset = %params.preset,
            "Starting compression"
        );

        match self
            .monitor_compression(&args, &meter, notifier, &handle)
            .await
        {
            Ok(()) => {
                if let Err(e) = notifier.edit_status(&handle, STATUS_DONE).await {
                    warn!(error = %e, "Failed to post final compression status");
                }
                Ok(self.finish(operation, output, start).await)
            }
            Err(e) => {
                if let Err(notify_err) = notifier.edit_status(&handle, &status_failed(&e)).await {
                    warn!(error = %notify_err, "Failed to post compression error status");
                }
                Err(Self::fail(operation, start, e))
            }
        }
    }

    async fn validate(&self) -> Result<(), MediaError> {
        let ffmpeg = run_tool(FFMPEG, &self.config.ffmpeg_path, &["-version".to_string()], Some(30))
            .await?;
        ensure_success(FFMPEG, ffmpeg)?;

        let ffprobe = run_tool(
            FFPROBE,
            &self.config.ffprobe_path,
            &["-version".to_string()],
            Some(30),
        )
        .await?;
        ensure_success(FFPROBE, ffprobe)?;

        // Ensure temp dir exists
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;

        Ok(())
    }
}
