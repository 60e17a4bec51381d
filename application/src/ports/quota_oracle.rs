//! Quota oracle port
//!
//! The oracle is the remote authority on qualification and completion
//! counts. The protocol never decides qualification locally.

use async_trait::async_trait;
use quota_gate_domain::ScreeningAnswer;
use thiserror::Error;

/// Errors that can occur while talking to the quota oracle
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Oracle returned HTTP {0}")]
    Status(u16),

    #[error("Invalid oracle response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Qualification request for one respondent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualificationRequest {
    /// The share token the respondent arrived with
    pub vendor_respondent_id: String,
    pub screening_answers: Vec<ScreeningAnswer>,
}

/// Raw oracle answer, interpreted by
/// [`QualificationVerdict::from_oracle`](quota_gate_domain::QualificationVerdict::from_oracle)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualificationResponse {
    pub qualified: Option<bool>,
    pub respondent_id: Option<String>,
    pub status: Option<String>,
}

/// Gateway to the quota oracle
#[async_trait]
pub trait QuotaOracle: Send + Sync {
    /// Ask whether the screening answers qualify for the survey
    async fn check_qualification(
        &self,
        survey_id: &str,
        request: &QualificationRequest,
    ) -> Result<QualificationResponse, OracleError>;

    /// Record a completed response against the respondent's quota cells
    async fn mark_completed(
        &self,
        survey_id: &str,
        respondent_id: &str,
        response_id: &str,
    ) -> Result<(), OracleError>;
}
