//! Configuration file loading for quota-gate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `QUOTA_GATE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./quota-gate.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/quota-gate/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApiConfig, FileConfig, FileLoggingConfig, FileOutputConfig,
    FileProtocolConfig, FilePublishConfig, FileStoreConfig,
};
pub use loader::ConfigLoader;
