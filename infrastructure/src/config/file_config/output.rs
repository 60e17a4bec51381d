//! `[output]` section: how reports and respondent sessions render

use quota_gate_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Rendering defaults for every command.
///
/// `--format` overrides `format` and `--quiet` overrides `progress`.
/// Colour also honours the `NO_COLOR` convention, see [`Self::color_enabled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `text` reports for people or `json` documents for scripts
    pub format: Option<OutputFormat>,
    pub color: bool,
    /// Spinners while the protocol checks quotas and submits
    pub progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            progress: true,
        }
    }
}

impl FileOutputConfig {
    /// Whether to colour output, given the value of `NO_COLOR`.
    ///
    /// Any non-empty `NO_COLOR` turns colour off.
    pub fn color_enabled(&self, no_color: Option<&str>) -> bool {
        self.color && no_color.is_none_or(str::is_empty)
    }
}
