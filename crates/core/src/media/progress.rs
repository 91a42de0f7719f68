//! Progress plumbing for compression.
//!
//! ffmpeg is started with `-progress pipe:1`, so its stdout carries a stream of
//! `key=value` lines. A monitor task counts those bytes and forwards cumulative
//! [`CompressionProgress`] snapshots over a channel; the operation task turns
//! them into meter updates and throttled status edits.

use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::trace;

use super::types::CompressionProgress;

/// Status text posted when compression starts.
pub const STATUS_STARTED: &str = "💠 Compressing media... ⚡ 0%";
/// Status text posted while ffmpeg is running. Not a computed percentage.
pub const STATUS_RUNNING: &str = "💠 Compressing media... ⚡ Progress";
/// Status text posted when compression finished successfully.
pub const STATUS_DONE: &str = "💠 Compressing media... ⚡ 100%";

/// Status text posted when compression failed.
pub fn status_failed(reason: &dyn std::fmt::Display) -> String {
    format!("Error compressing media: {}", reason)
}

/// Byte-counting progress indicator.
///
/// Sized to the input file; advanced by the bytes of progress output read
/// from ffmpeg. The bar is finished when the meter is dropped.
pub struct ProgressMeter {
    bar: ProgressBar,
}

impl ProgressMeter {
    pub fn new(total_bytes: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total_bytes)
        } else {
            let bar = ProgressBar::hidden();
            bar.set_length(total_bytes);
            bar
        };
        let style = ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bytes}/{total_bytes} ({bytes_per_sec})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn update(&self, progress: &CompressionProgress) {
        self.bar.set_position(progress.bytes_read);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }
}

impl Drop for ProgressMeter {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Reads progress lines until EOF, sending a cumulative snapshot per line.
///
/// Snapshots are sent with `try_send`: a full channel drops the snapshot,
/// which is harmless because the next one supersedes it. A closed channel
/// stops the reader.
pub(crate) async fn read_progress<R>(
    reader: R,
    tx: mpsc::Sender<CompressionProgress>,
) -> io::Result<CompressionProgress>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut progress = CompressionProgress::default();

    while let Some(line) = lines.next_line().await? {
        trace!(line = %line, "ffmpeg progress");
        progress.bytes_read += line.len() as u64 + 1;
        progress.lines_read += 1;

        if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(progress) {
            break;
        }
    }

    Ok(progress)
}

/// Drains a stream to a lossy UTF-8 string.
pub(crate) async fn collect_output<R>(mut reader: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_progress_counts_lines_and_bytes() {
        let stream = tokio_test::io::Builder::new()
            .read(b"frame=10\nfps=25.0\n")
            .read(b"progress=continue\n")
            .read(b"progress=end\n")
            .build();
        let (tx, mut rx) = mpsc::channel(16);

        let total = read_progress(stream, tx).await.unwrap();

        assert_eq!(total.lines_read, 4);
        assert_eq!(total.bytes_read, (9 + 9 + 18 + 13) as u64);

        let mut last = CompressionProgress::default();
        let mut received = 0;
        while let Some(p) = rx.recv().await {
            assert!(p.bytes_read > last.bytes_read);
            last = p;
            received += 1;
        }
        assert_eq!(received, 4);
        assert_eq!(last, total);
    }

    #[tokio::test]
    async fn test_read_progress_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let input: &[u8] = b"a=1\nb=2\nc=3\n";

        let total = read_progress(input, tx).await.unwrap();
        assert_eq!(total.lines_read, 1);
    }

    #[tokio::test]
    async fn test_collect_output_lossy() {
        let input: &[u8] = b"Error opening input\n\xff";
        let text = collect_output(input).await.unwrap();
        assert!(text.starts_with("Error opening input"));
    }

    #[test]
    fn test_meter_tracks_position_and_finishes_on_drop() {
        let meter = ProgressMeter::new(1_000, false);
        meter.update(&CompressionProgress {
            bytes_read: 250,
            lines_read: 3,
        });
        assert_eq!(meter.position(), 250);

        let bar = meter.bar();
        assert!(!bar.is_finished());
        drop(meter);
        assert!(bar.is_finished());
    }

    #[test]
    fn test_status_failed_text() {
        assert_eq!(status_failed(&"boom"), "Error compressing media: boom");
    }
}
