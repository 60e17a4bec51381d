//! Infrastructure layer for quota-gate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the reqwest clients for the survey backend,
//! the persisted quota document, file-backed storage, the JSONL event log
//! and configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod persistence;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileApiConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileProtocolConfig, FilePublishConfig, FileStoreConfig,
};
pub use http::{ApiClient, HttpError, HttpQuotaOracle, HttpSurveyApi, HttpVendorNotifier};
pub use logging::JsonlProtocolLogger;
pub use persistence::{FileKeyValueStore, QuotaDocument};
