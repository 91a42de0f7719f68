pub mod archive;
pub mod config;
pub mod media;
pub mod metrics;
pub mod notify;
pub mod testing;

pub use archive::{extract_archive, extract_archive_best_effort, ArchiveError, ArchiveFormat};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
};
pub use media::{
    CompressionParams, CompressionProgress, ConcatList, FfmpegToolkit, MediaError, MediaToolkit,
    Operation, OperationReport, StreamTitles, ToolsConfig,
};
pub use notify::{
    ChannelNotifier, NotifyError, NullNotifier, StatusEvent, StatusHandle, StatusNotifier,
};
