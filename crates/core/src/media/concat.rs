//! Concat demuxer list files.
//!
//! ffmpeg's concat demuxer reads a manifest with one `file '<path>'` directive
//! per line. Inside the quotes a literal `'` is written as `'\''`.
//! Relative entries are resolved by ffmpeg against the list file's directory.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::{Path, PathBuf};

use super::error::MediaError;

static FILE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^file\s+'((?:[^']|'\\'')*)'$").expect("file directive pattern is valid")
});

/// Directives other than `file` that the concat demuxer accepts. They are
/// tolerated when parsing but not kept.
const OTHER_DIRECTIVES: &[&str] = &[
    "ffconcat",
    "duration",
    "inpoint",
    "outpoint",
    "file_packet_meta",
    "file_packet_metadata",
    "option",
    "stream",
    "exact_stream_id",
    "stream_meta",
    "stream_codec",
    "stream_extradata",
    "chapter",
];

/// Ordered list of inputs for the concat demuxer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcatList {
    entries: Vec<PathBuf>,
}

impl ConcatList {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(path.into());
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the manifest text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let escaped = entry.to_string_lossy().replace('\'', r"'\''");
            out.push_str("file '");
            out.push_str(&escaped);
            out.push_str("'\n");
        }
        out
    }

    /// Writes the manifest to `path`, creating parent directories.
    pub async fn write_to(&self, path: &Path) -> Result<(), MediaError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.render()).await?;
        Ok(())
    }

    /// Parses manifest text.
    ///
    /// Blank lines, `#` comments and the demuxer's other directives are
    /// skipped. Any other line that is not a quoted `file` directive is
    /// rejected.
    pub fn parse(text: &str) -> Result<Self, MediaError> {
        let mut entries = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let keyword = line.split_whitespace().next().unwrap_or_default();
            if OTHER_DIRECTIVES.contains(&keyword) {
                continue;
            }

            let caps = FILE_DIRECTIVE.captures(line).ok_or_else(|| {
                MediaError::InvalidConcatList {
                    reason: format!("line {} is not a file directive: {}", idx + 1, line),
                }
            })?;
            let path = caps[1].replace(r"'\''", "'");
            entries.push(PathBuf::from(path));
        }

        Ok(Self { entries })
    }

    /// Reads and parses a manifest file. A list without any `file` entry is
    /// rejected.
    pub async fn read_from(path: &Path) -> Result<Self, MediaError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::InputNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let list = Self::parse(&text)?;
        if list.is_empty() {
            return Err(MediaError::InvalidConcatList {
                reason: format!("{} has no file entries", path.display()),
            });
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple() {
        let list = ConcatList::new(["/media/a.mp4", "/media/b.mp4"]);
        assert_eq!(
            list.render(),
            "file '/media/a.mp4'\nfile '/media/b.mp4'\n"
        );
    }

    #[test]
    fn test_render_escapes_quotes() {
        let list = ConcatList::new(["/media/it's here.mkv"]);
        assert_eq!(list.render(), "file '/media/it'\\''s here.mkv'\n");
    }

    #[test]
    fn test_parse_reads_back_rendered_list() {
        let list = ConcatList::new(["/a/one.mp4", "/b/it's two.mp4", "relative/three.mp4"]);
        let parsed = ConcatList::parse(&list.render()).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# parts\n\nfile '/x/1.ts'\n  file '/x/2.ts'  \n";
        let parsed = ConcatList::parse(text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.entries()[1], PathBuf::from("/x/2.ts"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = ConcatList::parse("file '/ok.mp4'\nplay it all\n");
        match result {
            Err(MediaError::InvalidConcatList { reason }) => assert!(reason.contains("line 2")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tolerates_demuxer_directives() {
        let text = "ffconcat version 1.0\nfile '/x/1.ts'\nduration 5.0\ninpoint 1\nfile '/x/2.ts'\n";
        let parsed = ConcatList::parse(text).unwrap();
        assert_eq!(parsed, ConcatList::new(["/x/1.ts", "/x/2.ts"]));
    }

    #[tokio::test]
    async fn test_read_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConcatList::read_from(&dir.path().join("absent.txt")).await;
        assert!(matches!(result, Err(MediaError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_from_rejects_list_without_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "# nothing here\n").unwrap();

        let result = ConcatList::read_from(&path).await;
        assert!(matches!(result, Err(MediaError::InvalidConcatList { .. })));
    }

    #[tokio::test]
    async fn test_write_to_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists").join("merge.txt");
        let mut list = ConcatList::default();
        list.push("/v/a.mp4");

        list.write_to(&path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "file '/v/a.mp4'\n");
    }
}
