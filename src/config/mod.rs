//! Configuration
//!
//! Layered with the `config` crate. Precedence, lowest first: built-in
//! defaults, `$XDG_CONFIG_HOME/grove/config.toml`, `./grove.toml`, then
//! `GROVE__SECTION__KEY` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod storage;

pub use crate::logging::LoggingConfig;
pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use storage::{StorageBackend, StorageConfig};

use crate::server::DEFAULT_BASE_PATH;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1:4000";
pub const DEFAULT_CLIENT_TIMEOUT_MS: u64 = 10_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroveConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Route prefix for every explorer endpoint
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_path: default_base_path(),
        }
    }
}

/// Settings for talking to a remote server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL including the route prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    format!("http://{}{}", DEFAULT_BIND, DEFAULT_BASE_PATH)
}

fn default_timeout_ms() -> u64 {
    DEFAULT_CLIENT_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}
