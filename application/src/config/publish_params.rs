//! Publish parameters.

use serde::{Deserialize, Serialize};

/// Status code sent to the vendor when a survey goes live.
pub const PUBLISHED_STATUS_CODE: u32 = 22;

/// Parameters for [`PublishSurveyUseCase`](crate::use_cases::publish_survey::PublishSurveyUseCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishParams {
    /// Base URL for the fallback share link, e.g. `http://localhost:3000`
    pub local_base_url: String,
    pub published_status_code: u32,
}

impl Default for PublishParams {
    fn default() -> Self {
        Self {
            local_base_url: "http://localhost:3000".to_string(),
            published_status_code: PUBLISHED_STATUS_CODE,
        }
    }
}

impl PublishParams {
    pub fn with_local_base_url(mut self, url: impl Into<String>) -> Self {
        self.local_base_url = url.into();
        self
    }

    /// Share link used when the backend cannot generate one
    pub fn local_link(&self, survey_id: &str) -> String {
        format!(
            "{}/survey/{}",
            self.local_base_url.trim_end_matches('/'),
            survey_id
        )
    }
}
