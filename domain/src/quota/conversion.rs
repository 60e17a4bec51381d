//! COUNT ⇄ PERCENTAGE conversion for whole dimensions
//!
//! Conversion uses the model's total target as the fixed basis and rounds
//! half up, so it is lossy: a COUNT→PERCENTAGE→COUNT round trip may drift by
//! rounding error. Callers that need exact round trips keep the unconverted
//! targets and restore them (see [`ConversionSnapshot`]).

use super::bucket::BucketKey;
use super::model::{QuotaDimension, QuotaTarget, QuotaType};
use serde::{Deserialize, Serialize};

/// `round(numerator / denominator)` with halves rounded up. Zero denominator yields 0.
pub fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder >= denominator - remainder {
        quotient + 1
    } else {
        quotient
    }
}

/// Narrow to `u32`, saturating at `u32::MAX`
pub fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Convert a single target to `to`, using `total_target` as the basis
pub fn convert_target(target: QuotaTarget, to: QuotaType, total_target: u32) -> QuotaTarget {
    let total = u64::from(total_target);
    match (target, to) {
        (QuotaTarget::Count(n), QuotaType::Percentage) => {
            QuotaTarget::Percentage(saturating_u32(round_half_up(u64::from(n) * 100, total)))
        }
        (QuotaTarget::Percentage(p), QuotaType::Count) => {
            QuotaTarget::Count(saturating_u32(round_half_up(u64::from(p) * total, 100)))
        }
        (unchanged, _) => unchanged,
    }
}

/// Convert every item of a dimension to `to`
pub fn convert_dimension(dimension: &mut QuotaDimension, to: QuotaType, total_target: u32) {
    for item in &mut dimension.items {
        item.target = convert_target(item.target, to, total_target);
    }
}

/// Authoritative targets of a dimension captured before its first conversion.
///
/// Converting back to the snapshot's type with the same total restores the
/// captured targets instead of re-deriving them from rounded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSnapshot {
    pub quota_type: QuotaType,
    pub total_target: u32,
    pub targets: Vec<(BucketKey, QuotaTarget)>,
}

impl ConversionSnapshot {
    pub fn capture(dimension: &QuotaDimension, total_target: u32) -> Self {
        Self {
            quota_type: dimension.quota_type(),
            total_target,
            targets: dimension
                .items
                .iter()
                .map(|i| (i.bucket.clone(), i.target))
                .collect(),
        }
    }

    /// Whether converting to `to` at `total_target` returns to this snapshot
    pub fn restores(&self, to: QuotaType, total_target: u32) -> bool {
        self.quota_type == to && self.total_target == total_target
    }

    /// Write the captured targets back. Buckets added since capture keep
    /// their converted values.
    pub fn apply(&self, dimension: &mut QuotaDimension) {
        for (bucket, target) in &self.targets {
            if let Some(item) = dimension.item_mut(bucket) {
                item.target = *target;
            }
        }
    }
}
