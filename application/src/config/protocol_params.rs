//! Protocol parameters - qualification flow control.
//!
//! [`ProtocolParams`] groups the static parameters that control the
//! [`QualificationProtocol`](crate::use_cases::qualify_respondent::QualificationProtocol).
//! These are application-layer concerns, not domain policy.

use quota_gate_domain::SurveySettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Qualification flow control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Hard cutoff for each remote call made by the protocol.
    pub request_timeout: Duration,
    /// Restart after every submission even when the survey does not ask for it.
    pub force_auto_restart: bool,
    /// Delay used when the restart is forced locally.
    pub restart_delay: Duration,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            force_auto_restart: false,
            restart_delay: Duration::from_secs(5),
        }
    }
}

impl ProtocolParams {
    // ==================== Builder Methods ====================

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_force_auto_restart(mut self, force: bool) -> Self {
        self.force_auto_restart = force;
        self
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Restart delay for a survey, or `None` when it should not restart.
    ///
    /// The survey's own settings win; the local override only applies when
    /// the survey leaves auto restart off.
    pub fn restart_delay_for(&self, settings: &SurveySettings) -> Option<Duration> {
        if settings.auto_restart {
            Some(Duration::from_secs(settings.restart_delay_seconds))
        } else if self.force_auto_restart {
            Some(self.restart_delay)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ProtocolParams::default();
        assert_eq!(params.request_timeout, Duration::from_secs(15));
        assert!(!params.force_auto_restart);
    }

    #[test]
    fn test_restart_delay_prefers_survey_settings() {
        let params = ProtocolParams::default()
            .with_force_auto_restart(true)
            .with_restart_delay(Duration::from_secs(30));
        let settings = SurveySettings {
            auto_restart: true,
            restart_delay_seconds: 3,
        };
        assert_eq!(
            params.restart_delay_for(&settings),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            params.restart_delay_for(&SurveySettings::default()),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_no_restart_by_default() {
        assert_eq!(
            ProtocolParams::default().restart_delay_for(&SurveySettings::default()),
            None
        );
    }
}
