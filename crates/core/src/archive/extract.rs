use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::error::ArchiveError;
use crate::metrics::{ARCHIVE_ENTRIES, ARCHIVE_EXTRACTIONS};

/// Archive kinds that can be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
}

impl ArchiveFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Extracts `archive` into `dest` and returns the entry names in archive order.
///
/// Unrecognised extensions yield `Ok(vec![])`. Entries whose paths would
/// escape `dest` are rejected by the zip reader.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<Vec<String>, ArchiveError> {
    let Some(format) = ArchiveFormat::from_path(archive) else {
        debug!(archive = %archive.display(), "Not a recognised archive, skipping");
        ARCHIVE_EXTRACTIONS.with_label_values(&["unsupported"]).inc();
        return Ok(Vec::new());
    };

    let result = match format {
        ArchiveFormat::Zip => extract_zip(archive, dest),
    };

    match &result {
        Ok(entries) => {
            ARCHIVE_EXTRACTIONS.with_label_values(&["success"]).inc();
            ARCHIVE_ENTRIES.inc_by(entries.len() as u64);
            info!(
                archive = %archive.display(),
                dest = %dest.display(),
                entries = entries.len(),
                "Archive extracted"
            );
        }
        Err(_) => ARCHIVE_EXTRACTIONS.with_label_values(&["failed"]).inc(),
    }

    result
}

/// Like [`extract_archive`], but logs failures and returns an empty list.
pub fn extract_archive_best_effort(archive: &Path, dest: &Path) -> Vec<String> {
    match extract_archive(archive, dest) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(archive = %archive.display(), error = %e, "Error extracting archive");
            Vec::new()
        }
    }
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file)?;

    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        names.push(zip.by_index(i)?.name().to_string());
    }

    std::fs::create_dir_all(dest)?;
    zip.extract(dest)?;

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/a/b.zip")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/a/B.ZIP")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("/a/b.rar")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("/a/zip")), None);
    }

    #[test]
    fn test_extract_zip_returns_entry_names() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(
            &archive,
            &[("cover.jpg", b"jpeg"), ("subs/en.srt", b"1\n00:00:01,000 --> 00:00:02,000\nhi\n")],
        );
        let dest = dir.path().join("out");

        let entries = extract_archive(&archive, &dest).unwrap();

        assert_eq!(entries, vec!["cover.jpg".to_string(), "subs/en.srt".to_string()]);
        assert_eq!(std::fs::read(dest.join("cover.jpg")).unwrap(), b"jpeg");
        assert!(dest.join("subs").join("en.srt").exists());
    }

    #[test]
    fn test_unsupported_extension_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.rar");
        std::fs::write(&archive, b"Rar!").unwrap();

        assert!(extract_archive(&archive, dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        assert!(matches!(
            extract_archive(&archive, dir.path()),
            Err(ArchiveError::Extract(_))
        ));
        assert!(extract_archive_best_effort(&archive, dir.path()).is_empty());
    }

    #[test]
    fn test_missing_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("missing.zip");

        assert!(matches!(
            extract_archive(&archive, dir.path()),
            Err(ArchiveError::Open { .. })
        ));
        assert!(extract_archive_best_effort(&archive, dir.path()).is_empty());
    }
}
