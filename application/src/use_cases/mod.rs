//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod edit_quota;
pub mod publish_survey;
pub mod qualify_respondent;
