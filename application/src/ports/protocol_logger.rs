//! Port for structured protocol event logging.
//!
//! Defines the [`ProtocolEventLogger`] trait for recording qualification
//! events (phase transitions, oracle verdicts, beacons, completion marking)
//! to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures each
//! respondent's path in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured protocol event for logging.
pub struct ProtocolEvent {
    /// Event type identifier (e.g., "phase_changed", "verdict", "beacon").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ProtocolEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging protocol events to a structured log.
///
/// `log` is synchronous and infallible; logging failures never reach the
/// protocol.
pub trait ProtocolEventLogger: Send + Sync {
    fn log(&self, event: ProtocolEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoProtocolLogger;

impl ProtocolEventLogger for NoProtocolLogger {
    fn log(&self, _event: ProtocolEvent) {}
}
