//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL protocol event log; disabled when unset
    pub event_log: Option<String>,
    /// Directory for rolling diagnostic logs; stderr only when unset
    pub log_dir: Option<String>,
}
