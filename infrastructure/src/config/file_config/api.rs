//! API configuration from TOML (`[api]` section)

use serde::{Deserialize, Serialize};

/// Raw survey backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL of the survey backend, including any path prefix
    pub base_url: String,
    /// Hard cutoff for each remote call, in seconds
    pub timeout_seconds: u64,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_seconds: 15,
        }
    }
}
