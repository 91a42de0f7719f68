//! Error types for archive extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive file could not be opened.
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive is corrupt or an entry could not be written.
    #[error("Failed to extract archive: {0}")]
    Extract(#[from] zip::result::ZipError),

    /// Filesystem error around the extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
