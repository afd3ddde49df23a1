//! Base builder every load starts from.

use crate::config::{DEFAULT_BIND, DEFAULT_CLIENT_TIMEOUT_MS};
use crate::server::DEFAULT_BASE_PATH;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the defaults later sources override key by key.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.bind", DEFAULT_BIND)?
        .set_default("server.base_path", DEFAULT_BASE_PATH)?
        .set_default("storage.backend", "sled")?
        .set_default("client.timeout_ms", DEFAULT_CLIENT_TIMEOUT_MS)?
        .set_default("logging.level", "info")
}
