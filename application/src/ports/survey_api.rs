//! Survey API port
//!
//! Everything the survey backend provides: resolving share links for
//! respondents, storing responses, and persisting an operator's quota.

use async_trait::async_trait;
use quota_gate_domain::{QuotaModel, ScreeningQuestion, SharedSurvey, SurveyAnswer};
use thiserror::Error;

/// Errors that can occur during survey API operations
#[derive(Error, Debug)]
pub enum SurveyApiError {
    /// The share token was already used for a submission
    #[error("A response was already submitted with this link")]
    AlreadySubmitted,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Vendor fields stored alongside a quota
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorContext {
    pub vendor_id: String,
    pub country_code: Option<String>,
    pub language: Option<String>,
}

/// A quota ready to be persisted
#[derive(Debug, Clone)]
pub struct QuotaSaveRequest<'a> {
    pub model: &'a QuotaModel,
    pub vendor: Option<&'a VendorContext>,
}

/// Identifier of a stored response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedResponse {
    pub id: String,
}

/// Gateway to the survey backend
#[async_trait]
pub trait SurveyApi: Send + Sync {
    /// Resolve a share token into the survey, its quota and public settings
    async fn resolve_share_token(&self, token: &str) -> Result<SharedSurvey, SurveyApiError>;

    /// Screening questions stored for a survey; may be empty
    async fn fetch_screening_questions(
        &self,
        survey_id: &str,
    ) -> Result<Vec<ScreeningQuestion>, SurveyApiError>;

    /// Store the respondent's survey answers, keyed by share token
    async fn submit_response(
        &self,
        token: &str,
        answers: &[SurveyAnswer],
    ) -> Result<SubmittedResponse, SurveyApiError>;

    /// Persist a survey's quota configuration
    async fn save_quota(
        &self,
        survey_id: &str,
        request: QuotaSaveRequest<'_>,
    ) -> Result<(), SurveyApiError>;

    /// Generate a public share link for a survey
    async fn create_share_link(&self, survey_id: &str) -> Result<String, SurveyApiError>;
}
