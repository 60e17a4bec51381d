//! Survey backend over HTTP

use super::client::ApiClient;
use super::dto::{
    ScreeningQuestionDto, ShareLinkResponse, ShareResolveResponse, SubmitRequest, SubmitResponse,
};
use crate::persistence::QuotaDocument;
use async_trait::async_trait;
use quota_gate_application::{QuotaSaveRequest, SubmittedResponse, SurveyApi, SurveyApiError};
use quota_gate_domain::{ScreeningQuestion, SharedSurvey, SurveyAnswer};
use tracing::{debug, warn};

pub struct HttpSurveyApi {
    client: ApiClient,
}

impl HttpSurveyApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn into_questions(dtos: Vec<ScreeningQuestionDto>) -> Vec<ScreeningQuestion> {
    dtos.into_iter()
        .filter_map(|dto| {
            let id = dto.id.clone();
            let question = dto.into_question();
            if question.is_none() {
                warn!("Skipping screening question {} with unknown dimension", id);
            }
            question
        })
        .collect()
}

#[async_trait]
impl SurveyApi for HttpSurveyApi {
    async fn resolve_share_token(&self, token: &str) -> Result<SharedSurvey, SurveyApiError> {
        let url = self.client.endpoint(&["surveys", "share", token])?;
        let response: ShareResolveResponse = self.client.get_json(url).await?;

        let quota = response
            .quota
            .map(|doc| doc.into_parts().map(|(model, _)| model))
            .transpose()
            .map_err(|e| SurveyApiError::InvalidResponse(e.to_string()))?;

        let survey = response.survey;
        debug!(
            "Resolved share token to survey {} ({} question(s))",
            survey.id,
            survey.questions.len()
        );
        let mut shared = SharedSurvey::new(survey.id, survey.title)
            .with_questions(survey.questions)
            .with_screening(into_questions(survey.screening_questions))
            .with_settings(response.settings.unwrap_or_default().into());
        shared.quota = quota;
        Ok(shared)
    }

    async fn fetch_screening_questions(
        &self,
        survey_id: &str,
    ) -> Result<Vec<ScreeningQuestion>, SurveyApiError> {
        let url = self
            .client
            .endpoint(&["surveys", survey_id, "screening-questions"])?;
        let dtos: Vec<ScreeningQuestionDto> = self.client.get_json(url).await?;
        Ok(into_questions(dtos))
    }

    async fn submit_response(
        &self,
        token: &str,
        answers: &[SurveyAnswer],
    ) -> Result<SubmittedResponse, SurveyApiError> {
        let url = self
            .client
            .endpoint(&["surveys", "share", token, "responses"])?;
        let response: SubmitResponse = self
            .client
            .post_json(url, &SubmitRequest { answers })
            .await?;
        Ok(SubmittedResponse { id: response.id })
    }

    async fn save_quota(
        &self,
        survey_id: &str,
        request: QuotaSaveRequest<'_>,
    ) -> Result<(), SurveyApiError> {
        let url = self.client.endpoint(&["surveys", survey_id, "quota"])?;
        let document = QuotaDocument::from_model(request.model, request.vendor);
        self.client.put(url, &document).await?;
        Ok(())
    }

    async fn create_share_link(&self, survey_id: &str) -> Result<String, SurveyApiError> {
        let url = self
            .client
            .endpoint(&["surveys", survey_id, "share-links"])?;
        let response: ShareLinkResponse = self
            .client
            .post_json(url, &serde_json::json!({}))
            .await?;
        Ok(response.url)
    }
}
