//! Progress notification port
//!
//! Defines the interface for reporting progress while a respondent moves
//! through the qualification protocol.

use quota_gate_domain::{QualificationPhase, QualificationVerdict};

/// Callback for progress updates during qualification
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console spinner, web UI, etc.)
pub trait QualificationProgress: Send + Sync {
    /// Called after every phase transition
    fn on_phase_change(&self, from: QualificationPhase, to: QualificationPhase);

    /// Called when the oracle check starts
    fn on_check_start(&self) {}

    /// Called when the oracle check has produced a verdict
    fn on_check_complete(&self, _verdict: &QualificationVerdict) {}

    /// Called when a restart has been scheduled
    fn on_restart_scheduled(&self, _delay_seconds: u64) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl QualificationProgress for NoProgress {
    fn on_phase_change(&self, _from: QualificationPhase, _to: QualificationPhase) {}
}
