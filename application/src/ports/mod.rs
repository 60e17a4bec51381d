//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod key_value_store;
pub mod progress;
pub mod protocol_logger;
pub mod quota_oracle;
pub mod survey_api;
pub mod vendor_notifier;
