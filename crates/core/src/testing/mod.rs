//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the toolkit and notifier
//! traits, allowing API and workflow tests without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediaforge_core::testing::{MockNotifier, MockToolkit};
//!
//! let toolkit = MockToolkit::new();
//! toolkit.set_duration("/media/short.mp4", 10.0).await;
//!
//! let notifier = MockNotifier::new();
//! toolkit.compress(input, output, &params, &notifier, "chat").await?;
//! assert_eq!(notifier.texts().await.last().unwrap(), STATUS_DONE);
//! ```

mod mock_notifier;
mod mock_toolkit;

pub use mock_notifier::MockNotifier;
pub use mock_toolkit::{MockToolkit, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::media::ToolsConfig;

    /// Write a shell script standing in for ffmpeg or ffprobe.
    ///
    /// The script receives the same arguments the real binary would.
    #[cfg(unix)]
    pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).expect("create fake tool");
        writeln!(file, "#!/bin/sh").expect("write fake tool");
        file.write_all(body.as_bytes()).expect("write fake tool");
        file.sync_all().expect("sync fake tool");
        drop(file);

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake tool");
        path
    }

    /// Tools config pointing at the given binaries with a short timeout.
    pub fn tools_config(ffmpeg: &Path, ffprobe: &Path, temp_dir: &Path) -> ToolsConfig {
        ToolsConfig::with_paths(ffmpeg.to_path_buf(), ffprobe.to_path_buf())
            .with_temp_dir(temp_dir.to_path_buf())
            .with_timeout(10)
            .with_progress_interval(0)
    }

    /// Create a small placeholder media file.
    pub fn media_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; 4096]).expect("write media file");
        path
    }
}
