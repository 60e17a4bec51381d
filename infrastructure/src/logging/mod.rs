//! Logging infrastructure: structured protocol event logging.
//!
//! Provides [`JsonlProtocolLogger`], a JSONL file writer that implements
//! the [`ProtocolEventLogger`](quota_gate_application::ProtocolEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlProtocolLogger;
