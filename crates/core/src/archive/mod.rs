//! Archive extraction.
//!
//! Only zip archives are recognised. Paths with any other extension are
//! treated as "nothing to extract" rather than as an error.

mod error;
mod extract;

pub use error::ArchiveError;
pub use extract::{extract_archive, extract_archive_best_effort, ArchiveFormat};
