//! Protocol configuration from TOML (`[protocol]` section)

use quota_gate_application::ProtocolParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw qualification protocol configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProtocolConfig {
    /// Restart after each submission even when the survey does not ask for it
    pub auto_restart: bool,
    /// Delay before a locally forced restart
    pub restart_delay_seconds: u64,
}

impl Default for FileProtocolConfig {
    fn default() -> Self {
        Self {
            auto_restart: false,
            restart_delay_seconds: 5,
        }
    }
}

impl FileProtocolConfig {
    /// Convert to application params, using the API timeout for remote calls
    pub fn to_params(&self, timeout_seconds: u64) -> ProtocolParams {
        ProtocolParams::default()
            .with_request_timeout(Duration::from_secs(timeout_seconds))
            .with_force_auto_restart(self.auto_restart)
            .with_restart_delay(Duration::from_secs(self.restart_delay_seconds))
    }
}
