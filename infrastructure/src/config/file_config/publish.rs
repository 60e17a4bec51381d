//! Publish configuration from TOML (`[publish]` section)

use quota_gate_application::PublishParams;
use quota_gate_application::config::PUBLISHED_STATUS_CODE;
use serde::{Deserialize, Serialize};

/// Raw publish configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePublishConfig {
    /// Base URL for share links built locally when the backend cannot
    pub local_base_url: String,
    /// Vendor job status sent when a survey goes live
    pub published_status_code: u32,
}

impl Default for FilePublishConfig {
    fn default() -> Self {
        Self {
            local_base_url: "http://localhost:3000".to_string(),
            published_status_code: PUBLISHED_STATUS_CODE,
        }
    }
}

impl FilePublishConfig {
    pub fn to_params(&self) -> PublishParams {
        PublishParams {
            local_base_url: self.local_base_url.clone(),
            published_status_code: self.published_status_code,
        }
    }
}
