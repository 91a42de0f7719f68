//! Media module for driving ffmpeg and ffprobe.
//!
//! This module provides the `MediaToolkit` trait and its ffmpeg-backed
//! implementation. Every operation works on files on disk and returns an
//! [`OperationReport`] describing the output.
//!
//! # Features
//!
//! - Metadata stripping and per-stream title rewriting
//! - Centred sample extraction (stream copy)
//! - Attachment embedding (cover images for Matroska)
//! - Concatenation through the concat demuxer
//! - Compression with status updates through a [`crate::notify::StatusNotifier`]
//!
//! # Example
//!
//! ```ignore
//! use mediaforge_core::media::{FfmpegToolkit, MediaToolkit, ConcatList};
//!
//! let toolkit = FfmpegToolkit::with_defaults();
//! toolkit.validate().await?;
//!
//! let total = toolkit.probe_duration(Path::new("/media/film.mkv")).await?;
//! let report = toolkit
//!     .extract_sample(Path::new("/media/film.mkv"), 30.0, Path::new("/tmp/sample.mkv"))
//!     .await?;
//!
//! let list = ConcatList::new(["/media/part1.mp4", "/media/part2.mp4"]);
//! list.write_to(Path::new("/tmp/list.txt")).await?;
//! toolkit.merge(Path::new("/tmp/list.txt"), Path::new("/tmp/full.mp4")).await?;
//! ```

mod concat;
mod config;
mod error;
mod ffmpeg;
mod process;
mod progress;
mod traits;
mod types;

pub use concat::ConcatList;
pub use config::ToolsConfig;
pub use error::MediaError;
pub use ffmpeg::FfmpegToolkit;
pub use progress::{status_failed, ProgressMeter, STATUS_DONE, STATUS_RUNNING, STATUS_STARTED};
pub use traits::MediaToolkit;
pub use types::{
    CompressionParams, CompressionProgress, Operation, OperationReport, StreamTitles, ToolOutput,
    ATTACHMENT_MIME_TYPE, MAX_CRF,
};
