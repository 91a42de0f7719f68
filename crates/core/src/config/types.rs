use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::media::{CompressionParams, ToolsConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Defaults applied to compression requests that omit them
    #[serde(default)]
    pub compression: CompressionParams,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Capacity of the WebSocket status broadcast channel
    #[serde(default = "default_ws_capacity")]
    pub ws_channel_capacity: usize,
    /// How long finished compression jobs stay queryable
    #[serde(default = "default_job_retention")]
    pub job_retention_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_channel_capacity: default_ws_capacity(),
            job_retention_secs: default_job_retention(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_ws_capacity() -> usize {
    256
}

fn default_job_retention() -> u64 {
    3600
}
