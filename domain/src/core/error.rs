//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown quota dimension: {0}")]
    UnknownDimension(String),

    #[error("Invalid bucket value for {dimension}: {value}")]
    InvalidBucket { dimension: String, value: String },

    #[error("Unknown screening option {option_id} for question {question_id}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },

    #[error("Unknown screening question: {0}")]
    UnknownQuestion(String),
}

impl DomainError {
    pub fn invalid_bucket(dimension: impl Into<String>, value: impl Into<String>) -> Self {
        DomainError::InvalidBucket {
            dimension: dimension.into(),
            value: value.into(),
        }
    }

    /// Check if this error came from a respondent answer that does not
    /// resolve against the screening questionnaire.
    pub fn is_answer_error(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownOption { .. } | DomainError::UnknownQuestion(_)
        )
    }
}
