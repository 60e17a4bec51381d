//! Domain layer for quota-gate
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Quota
//!
//! A survey's audience targets across independent dimensions (age, gender,
//! location, category). Each dimension sums to the total target on its own.
//!
//! ## Screening
//!
//! One screening question per active dimension, listing every canonical
//! bucket so that screening can tell qualifying respondents from
//! non-qualifying ones.
//!
//! ## Vendor allocation
//!
//! Panel-vendor audiences are targeted per vendor question; desired completes
//! must be split exactly across the selected options, values or ranges.
//!
//! ## Qualification
//!
//! The phases a respondent moves through, and the fail-closed reading of the
//! quota oracle's verdict.

pub mod config;
pub mod core;
pub mod quota;
pub mod respondent;
pub mod screening;
pub mod survey;
pub mod vendor;

// Re-export commonly used types
pub use config::OutputFormat;
pub use crate::core::error::DomainError;
pub use quota::{
    AgeRange, BucketKey, Category, ConversionSnapshot, Dimension, Gender, Location,
    QuotaDimension, QuotaIssue, QuotaIssueCode, QuotaItem, QuotaModel, QuotaTarget, QuotaType,
};
pub use respondent::{QualificationPhase, QualificationVerdict, Respondent, ScreeningAnswer};
pub use screening::{ScreeningOption, ScreeningQuestion};
pub use survey::{SharedSurvey, SurveyAnswer, SurveyQuestion, SurveySettings};
pub use vendor::{
    Allocation, CriteriaMap, VendorQuestion, VendorQuestionKind, VendorScreeningCriteria,
    VendorTargeting,
};
