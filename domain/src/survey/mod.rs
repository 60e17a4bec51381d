//! Survey entities as seen by the qualification protocol
//!
//! Only what the protocol needs: the survey's questions are handed to the
//! respondent after qualification, and its public settings control
//! kiosk-style auto restart.

use crate::quota::model::QuotaModel;
use crate::screening::question::ScreeningQuestion;
use serde::{Deserialize, Serialize};

/// Public settings of a distributed survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveySettings {
    /// Reset after each submission so a shared link serves the next respondent
    pub auto_restart: bool,
    pub restart_delay_seconds: u64,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            auto_restart: false,
            restart_delay_seconds: 5,
        }
    }
}

/// One ordinary survey question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub required: bool,
    /// Fixed choices; empty for free-form answers
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Answer to an ordinary survey question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswer {
    pub question_id: String,
    pub value: String,
}

/// A survey resolved from a share token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedSurvey {
    pub survey_id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
    #[serde(default)]
    pub screening_questions: Vec<ScreeningQuestion>,
    #[serde(default)]
    pub quota: Option<QuotaModel>,
    #[serde(default)]
    pub settings: SurveySettings,
}

impl SharedSurvey {
    pub fn new(survey_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            survey_id: survey_id.into(),
            title: title.into(),
            questions: Vec::new(),
            screening_questions: Vec::new(),
            quota: None,
            settings: SurveySettings::default(),
        }
    }

    pub fn with_questions(mut self, questions: Vec<SurveyQuestion>) -> Self {
        self.questions = questions;
        self
    }

    pub fn with_screening(mut self, questions: Vec<ScreeningQuestion>) -> Self {
        self.screening_questions = questions;
        self
    }

    pub fn with_settings(mut self, settings: SurveySettings) -> Self {
        self.settings = settings;
        self
    }
}
