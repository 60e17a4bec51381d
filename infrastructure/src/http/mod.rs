//! reqwest adapters for the survey backend
//!
//! One [`ApiClient`] is shared by the three port implementations:
//! [`HttpQuotaOracle`], [`HttpSurveyApi`] and [`HttpVendorNotifier`].

mod client;
pub mod dto;
mod error;
mod quota_oracle;
mod survey_api;
mod vendor_notifier;

pub use client::ApiClient;
pub use error::HttpError;
pub use quota_oracle::HttpQuotaOracle;
pub use survey_api::HttpSurveyApi;
pub use vendor_notifier::HttpVendorNotifier;
