use super::{types::Config, ConfigError};
use crate::media::MAX_CRF;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - WebSocket channel capacity is not 0
/// - Tool paths are not empty
/// - Tool timeout is not 0
/// - Default CRF is within the encoder range
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.ws_channel_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "server.ws_channel_capacity cannot be 0".to_string(),
        ));
    }

    if config.tools.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "tools.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.tools.ffprobe_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "tools.ffprobe_path cannot be empty".to_string(),
        ));
    }

    if config.tools.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tools.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.compression.crf > MAX_CRF {
        return Err(ConfigError::ValidationError(format!(
            "compression.crf must be between 0 and {}, got {}",
            MAX_CRF, config.compression.crf
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_ws_capacity_fails() {
        let config =
            crate::config::load_config_from_str("[server]\nport = 8080\nws_channel_capacity = 0\n")
                .unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(msg)) if msg.contains("ws_channel_capacity")
        ));
    }

    #[test]
    fn test_validate_empty_ffmpeg_path_fails() {
        let mut config = Config::default();
        config.tools.ffmpeg_path = PathBuf::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(msg)) if msg.contains("ffmpeg_path")
        ));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.tools.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_crf_out_of_range_fails() {
        let mut config = Config::default();
        config.compression.crf = 52;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(msg)) if msg.contains("crf")
        ));

        config.compression.crf = 51;
        assert!(validate_config(&config).is_ok());
    }
}
