//! Wire types of the survey backend
//!
//! Field names follow the backend, which mixes camelCase and snake_case.
//! Response types accept the known aliases.

use quota_gate_application::QualificationResponse;
use quota_gate_domain::{
    Dimension, ScreeningAnswer, ScreeningOption, ScreeningQuestion, SurveyAnswer, SurveyQuestion,
    SurveySettings,
};
use serde::{Deserialize, Serialize};

use crate::persistence::QuotaDocument;

// ==================== Quota oracle ====================

#[derive(Debug, Serialize)]
pub struct CheckRequest<'a> {
    #[serde(rename = "screeningAnswers")]
    pub screening_answers: &'a [ScreeningAnswer],
    pub vendor_respondent_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub qualified: Option<bool>,
    #[serde(default, alias = "respondentId")]
    pub respondent_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<CheckResponse> for QualificationResponse {
    fn from(r: CheckResponse) -> Self {
        Self {
            qualified: r.qualified,
            respondent_id: r.respondent_id.filter(|id| !id.is_empty()),
            status: r.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest<'a> {
    pub response_id: &'a str,
}

// ==================== Surveys ====================

#[derive(Debug, Deserialize)]
pub struct ShareResolveResponse {
    pub survey: SurveyDto,
    #[serde(default)]
    pub quota: Option<QuotaDocument>,
    #[serde(default)]
    pub settings: Option<SettingsDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDto {
    #[serde(alias = "surveyId", alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
    #[serde(default)]
    pub screening_questions: Vec<ScreeningQuestionDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDto {
    #[serde(alias = "auto_restart")]
    pub auto_restart: bool,
    #[serde(alias = "restart_delay_seconds")]
    pub restart_delay_seconds: Option<u64>,
}

impl From<SettingsDto> for SurveySettings {
    fn from(dto: SettingsDto) -> Self {
        let defaults = SurveySettings::default();
        Self {
            auto_restart: dto.auto_restart,
            restart_delay_seconds: dto
                .restart_delay_seconds
                .unwrap_or(defaults.restart_delay_seconds),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningQuestionDto {
    pub id: String,
    #[serde(default)]
    pub dimension: Option<Dimension>,
    #[serde(default, alias = "text")]
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<ScreeningOption>,
    #[serde(default)]
    pub required: Option<bool>,
}

impl ScreeningQuestionDto {
    /// Domain question, or `None` when no dimension can be derived
    pub fn into_question(self) -> Option<ScreeningQuestion> {
        let dimension = self
            .dimension
            .or_else(|| Dimension::from_question_id(&self.id))?;
        Some(ScreeningQuestion {
            id: self.id,
            dimension,
            question_text: self.question_text,
            options: self.options,
            required: self.required.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitRequest<'a> {
    pub answers: &'a [SurveyAnswer],
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    #[serde(alias = "_id", alias = "responseId")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareLinkResponse {
    pub url: String,
}

// ==================== Vendors ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status_code: u32,
}
