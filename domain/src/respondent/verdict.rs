//! Interpreting the quota oracle's answer
//!
//! Qualification is fail-closed: anything short of an explicit
//! `qualified = true` is treated as not qualifying. `QUOTA_FULL` is the one
//! failure reason that is told apart.

use super::phase::QualificationPhase;
use serde::{Deserialize, Serialize};

/// Status literal the oracle uses for a full quota
pub const QUOTA_FULL_STATUS: &str = "QUOTA_FULL";

/// Outcome of a qualification check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum QualificationVerdict {
    Qualified {
        /// Oracle-issued id, needed for the completion call
        respondent_id: Option<String>,
    },
    QuotaFull,
    NotQualified {
        reason: String,
    },
}

impl QualificationVerdict {
    /// Interpret raw oracle fields
    pub fn from_oracle(
        qualified: Option<bool>,
        respondent_id: Option<String>,
        status: Option<&str>,
    ) -> Self {
        if status.is_some_and(|s| s.eq_ignore_ascii_case(QUOTA_FULL_STATUS)) {
            return QualificationVerdict::QuotaFull;
        }
        match qualified {
            Some(true) => QualificationVerdict::Qualified {
                respondent_id: respondent_id.filter(|id| !id.trim().is_empty()),
            },
            Some(false) => QualificationVerdict::NotQualified {
                reason: "declined by quota oracle".to_string(),
            },
            None => QualificationVerdict::NotQualified {
                reason: "oracle response had no verdict".to_string(),
            },
        }
    }

    /// Collapse a failed check (transport, timeout, parse) into a verdict
    pub fn failed(reason: impl Into<String>) -> Self {
        QualificationVerdict::NotQualified {
            reason: reason.into(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, QualificationVerdict::Qualified { .. })
    }

    /// Phase the protocol moves to on this verdict
    pub fn phase(&self) -> QualificationPhase {
        match self {
            QualificationVerdict::Qualified { .. } => QualificationPhase::Qualified,
            QualificationVerdict::QuotaFull => QualificationPhase::QuotaFull,
            QualificationVerdict::NotQualified { .. } => QualificationPhase::NotQualified,
        }
    }
}
