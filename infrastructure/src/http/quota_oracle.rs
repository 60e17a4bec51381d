//! Quota oracle over HTTP

use super::client::ApiClient;
use super::dto::{CheckRequest, CheckResponse, CompleteRequest};
use async_trait::async_trait;
use quota_gate_application::{
    OracleError, QualificationRequest, QualificationResponse, QuotaOracle,
};
use tracing::debug;

/// `POST quotas/{surveyId}/check` and `.../respondents/{id}/complete`
pub struct HttpQuotaOracle {
    client: ApiClient,
}

impl HttpQuotaOracle {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuotaOracle for HttpQuotaOracle {
    async fn check_qualification(
        &self,
        survey_id: &str,
        request: &QualificationRequest,
    ) -> Result<QualificationResponse, OracleError> {
        let url = self.client.endpoint(&["quotas", survey_id, "check"])?;
        debug!(
            "Checking qualification for {} ({} answer(s))",
            survey_id,
            request.screening_answers.len()
        );

        let body = CheckRequest {
            screening_answers: &request.screening_answers,
            vendor_respondent_id: &request.vendor_respondent_id,
        };
        let response: CheckResponse = self.client.post_json(url, &body).await?;
        Ok(response.into())
    }

    async fn mark_completed(
        &self,
        survey_id: &str,
        respondent_id: &str,
        response_id: &str,
    ) -> Result<(), OracleError> {
        let url = self.client.endpoint(&[
            "quotas",
            survey_id,
            "respondents",
            respondent_id,
            "complete",
        ])?;
        self.client
            .post(url, &CompleteRequest { response_id })
            .await?;
        Ok(())
    }
}
