//! Consistency checks for a [`QuotaModel`].
//!
//! Each dimension is validated on its own; dimensions with no active item
//! never produce an issue. The checks are pure and cheap enough to run on
//! every edit.
//!
//! # Examples
//!
//! ```
//! use quota_gate_domain::quota::{can_proceed, validate, QuotaModel};
//!
//! let model = QuotaModel::new().with_total_target(100);
//! assert!(validate(&model).is_empty());
//! assert!(can_proceed(&model));
//! ```

use super::bucket::Dimension;
use super::model::{QuotaDimension, QuotaModel};
use serde::Serialize;

/// Identifies a specific quota configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaIssueCode {
    /// Quotas are enabled but no total target is set.
    TotalTargetRequired,
    /// Active COUNT targets do not add up to the total target.
    CountSumMismatch,
    /// Active PERCENTAGE targets do not add up to 100.
    PercentageSumMismatch,
}

/// A violated quota invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaIssue {
    pub code: QuotaIssueCode,
    /// Dimension the issue belongs to; `None` for model-wide issues
    pub dimension: Option<Dimension>,
    pub message: String,
}

impl std::fmt::Display for QuotaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validate a quota model, returning every violated invariant.
pub fn validate(model: &QuotaModel) -> Vec<QuotaIssue> {
    let mut issues = Vec::new();

    if model.enabled && model.total_target == 0 {
        issues.push(QuotaIssue {
            code: QuotaIssueCode::TotalTargetRequired,
            dimension: None,
            message: "total target required".to_string(),
        });
    }

    for dimension in model.dimensions() {
        issues.extend(validate_dimension(dimension, model.total_target));
    }

    issues
}

/// The "continue/save" gate: no issue among active quotas.
pub fn can_proceed(model: &QuotaModel) -> bool {
    validate(model).is_empty()
}

fn validate_dimension(dimension: &QuotaDimension, total_target: u32) -> Vec<QuotaIssue> {
    // Categories may legitimately carry no quota at all; the fixed
    // dimensions reach the same outcome through zero sums.
    if !dimension.is_active() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let name = dimension.kind.display_name();

    let count_sum = dimension.count_sum();
    if count_sum != 0 && count_sum != u64::from(total_target) {
        issues.push(QuotaIssue {
            code: QuotaIssueCode::CountSumMismatch,
            dimension: Some(dimension.kind),
            message: format!(
                "{} count sum ({}) must equal total ({})",
                name, count_sum, total_target
            ),
        });
    }

    let percentage_sum = dimension.percentage_sum();
    if percentage_sum != 0 && percentage_sum != 100 {
        issues.push(QuotaIssue {
            code: QuotaIssueCode::PercentageSumMismatch,
            dimension: Some(dimension.kind),
            message: format!("{} percentage sum ({}%) must equal 100%", name, percentage_sum),
        });
    }

    issues
}
