//! Respondent runtime state

use crate::core::error::DomainError;
use crate::screening::question::ScreeningQuestion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One screening answer as sent to the quota oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningAnswer {
    pub screening_question_id: String,
    pub screening_option_id: String,
    pub answer_value: String,
}

/// One visitor instance of the qualification protocol.
///
/// Not persisted here; `completed` is the only durable effect, and it is
/// recorded by the quota oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respondent {
    /// The share token the visitor arrived with
    pub vendor_respondent_id: String,
    /// question id -> option id
    pub screening_answers: HashMap<String, String>,
    /// `None` until the oracle has answered
    pub qualified: Option<bool>,
    /// Issued by the oracle on qualification
    pub respondent_id: Option<String>,
    pub completed: bool,
}

impl Respondent {
    pub fn new(share_token: impl Into<String>) -> Self {
        Self {
            vendor_respondent_id: share_token.into(),
            screening_answers: HashMap::new(),
            qualified: None,
            respondent_id: None,
            completed: false,
        }
    }

    /// Record an answer, checking that the option belongs to the question
    pub fn answer(
        &mut self,
        question: &ScreeningQuestion,
        option_id: &str,
    ) -> Result<(), DomainError> {
        if question.option(option_id).is_none() {
            return Err(DomainError::UnknownOption {
                question_id: question.id.clone(),
                option_id: option_id.to_string(),
            });
        }
        self.screening_answers
            .insert(question.id.clone(), option_id.to_string());
        Ok(())
    }

    pub fn has_answered(&self, question_id: &str) -> bool {
        self.screening_answers.contains_key(question_id)
    }

    /// Answers in questionnaire order, carrying each option's bucket value
    pub fn answers_for(&self, questions: &[ScreeningQuestion]) -> Vec<ScreeningAnswer> {
        questions
            .iter()
            .filter_map(|question| {
                let option_id = self.screening_answers.get(&question.id)?;
                let option = question.option(option_id)?;
                Some(ScreeningAnswer {
                    screening_question_id: question.id.clone(),
                    screening_option_id: option.id.clone(),
                    answer_value: option.value.clone(),
                })
            })
            .collect()
    }

    /// Forget screening progress, keeping the token
    pub fn reset(&mut self) {
        *self = Respondent::new(std::mem::take(&mut self.vendor_respondent_id));
    }
}
