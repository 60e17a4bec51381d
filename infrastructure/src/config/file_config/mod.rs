//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod api;
mod logging;
mod output;
mod protocol;
mod publish;
mod store;

pub use api::FileApiConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use protocol::FileProtocolConfig;
pub use publish::FilePublishConfig;
pub use store::FileStoreConfig;

use quota_gate_application::{ProtocolParams, PublishParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("api.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("api.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("api.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Survey backend settings
    pub api: FileApiConfig,
    /// Qualification protocol settings
    pub protocol: FileProtocolConfig,
    /// Publish settings
    pub publish: FilePublishConfig,
    /// Event log and diagnostic log locations
    pub logging: FileLoggingConfig,
    /// Key-value store location
    pub store: FileStoreConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Timeout of 0 seconds would fail every remote call
        if self.api.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if let Err(e) = reqwest::Url::parse(base_url) {
            return Err(ConfigValidationError::InvalidBaseUrl(format!(
                "{} ({})",
                base_url, e
            )));
        }

        Ok(())
    }

    pub fn protocol_params(&self) -> ProtocolParams {
        self.protocol.to_params(self.api.timeout_seconds)
    }

    pub fn publish_params(&self) -> PublishParams {
        self.publish.to_params()
    }
}
