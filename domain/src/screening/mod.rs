//! Screening questionnaire domain
//!
//! - [`question`] - [`ScreeningQuestion`] / [`ScreeningOption`] value objects
//! - [`synthesizer`] - derives questions from a [`crate::quota::QuotaModel`]

pub mod question;
pub mod synthesizer;

pub use question::{ScreeningOption, ScreeningQuestion, default_question_text};
pub use synthesizer::{apply, canonical_options, match_answer, reconcile, synthesize};
