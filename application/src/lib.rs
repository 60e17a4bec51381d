//! Application layer for quota-gate
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ProtocolParams, PublishParams};
pub use ports::{
    key_value_store::{InMemoryStore, KeyValueStore, StoreError},
    progress::{NoProgress, QualificationProgress},
    protocol_logger::{NoProtocolLogger, ProtocolEvent, ProtocolEventLogger},
    quota_oracle::{OracleError, QualificationRequest, QualificationResponse, QuotaOracle},
    survey_api::{QuotaSaveRequest, SubmittedResponse, SurveyApi, SurveyApiError, VendorContext},
    vendor_notifier::{BeaconError, NoVendorNotifier, VendorNotifier},
};
pub use use_cases::edit_quota::QuotaEditor;
pub use use_cases::publish_survey::{
    LastPublishedSurvey, PublishError, PublishInput, PublishOutput, PublishSurveyUseCase,
    VendorSelection, take_last_published,
};
pub use use_cases::qualify_respondent::{
    CheckGate, CheckPermit, ProtocolError, QualificationProtocol,
};
