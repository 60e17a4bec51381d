//! Screening question value objects

use crate::quota::bucket::{BucketKey, Dimension};
use serde::{Deserialize, Serialize};

/// One answer choice; `value` encodes the bucket identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningOption {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl ScreeningOption {
    /// Option for a bucket, with an id derived from the question id and value
    pub fn for_bucket(question_id: &str, bucket: &BucketKey, label: impl Into<String>) -> Self {
        let value = bucket.value();
        Self {
            id: format!("{}:{}", question_id, value),
            label: label.into(),
            value,
        }
    }
}

/// Question derived from an active quota dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub id: String,
    pub dimension: Dimension,
    /// Operator-editable; preserved across re-synthesis
    pub question_text: String,
    pub options: Vec<ScreeningOption>,
    #[serde(default = "required_default")]
    pub required: bool,
}

fn required_default() -> bool {
    true
}

impl ScreeningQuestion {
    pub fn new(dimension: Dimension, options: Vec<ScreeningOption>) -> Self {
        Self {
            id: dimension.question_id(),
            dimension,
            question_text: default_question_text(dimension).to_string(),
            options,
            required: true,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.question_text = text.into();
        self
    }

    pub fn option(&self, option_id: &str) -> Option<&ScreeningOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn option_index(&self, option_id: &str) -> Option<usize> {
        self.options.iter().position(|o| o.id == option_id)
    }
}

/// Text a freshly synthesized question starts with
pub fn default_question_text(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Age => "What is your age?",
        Dimension::Gender => "What is your gender?",
        Dimension::Location => "Where do you live?",
        Dimension::Category => "Which of these best describes your interest?",
    }
}
