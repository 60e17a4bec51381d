//! Quota model entities

use super::bucket::{BucketKey, Category, Dimension, Location};
use super::conversion::{round_half_up, saturating_u32};
use crate::screening::question::ScreeningQuestion;
use serde::{Deserialize, Serialize};

/// How a quota item expresses its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuotaType {
    #[default]
    Count,
    Percentage,
}

impl QuotaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaType::Count => "count",
            QuotaType::Percentage => "percentage",
        }
    }
}

impl std::fmt::Display for QuotaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuotaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(QuotaType::Count),
            "percentage" | "percent" | "%" => Ok(QuotaType::Percentage),
            other => Err(format!(
                "Unknown quota type: {}. Valid: count, percentage",
                other
            )),
        }
    }
}

/// Target of a single quota item
///
/// Exactly one of count or percentage exists; switching type replaces the
/// variant, so the previous value is gone rather than ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "quota_type", content = "target", rename_all = "UPPERCASE")]
pub enum QuotaTarget {
    Count(u32),
    Percentage(u32),
}

impl QuotaTarget {
    pub fn zero(quota_type: QuotaType) -> Self {
        match quota_type {
            QuotaType::Count => QuotaTarget::Count(0),
            QuotaType::Percentage => QuotaTarget::Percentage(0),
        }
    }

    pub fn of(quota_type: QuotaType, value: u32) -> Self {
        match quota_type {
            QuotaType::Count => QuotaTarget::Count(value),
            QuotaType::Percentage => QuotaTarget::Percentage(value),
        }
    }

    pub fn quota_type(&self) -> QuotaType {
        match self {
            QuotaTarget::Count(_) => QuotaType::Count,
            QuotaTarget::Percentage(_) => QuotaType::Percentage,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            QuotaTarget::Count(n) | QuotaTarget::Percentage(n) => *n,
        }
    }

    pub fn is_active(&self) -> bool {
        self.value() > 0
    }

    /// Target as a respondent count against `total_target`
    pub fn resolved_count(&self, total_target: u32) -> u32 {
        match self {
            QuotaTarget::Count(n) => *n,
            QuotaTarget::Percentage(p) => {
                saturating_u32(round_half_up(u64::from(*p) * u64::from(total_target), 100))
            }
        }
    }
}

impl Default for QuotaTarget {
    fn default() -> Self {
        QuotaTarget::Count(0)
    }
}

impl std::fmt::Display for QuotaTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaTarget::Count(n) => write!(f, "{}", n),
            QuotaTarget::Percentage(p) => write!(f, "{}%", p),
        }
    }
}

/// One bucket's quota within a dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaItem {
    pub bucket: BucketKey,
    #[serde(flatten)]
    pub target: QuotaTarget,
    /// Completes recorded so far, as last reported by the quota ledger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_count: Option<u32>,
}

impl QuotaItem {
    pub fn new(bucket: BucketKey, target: QuotaTarget) -> Self {
        Self {
            bucket,
            target,
            current_count: None,
        }
    }

    pub fn empty(bucket: BucketKey) -> Self {
        Self::new(bucket, QuotaTarget::default())
    }

    pub fn with_current_count(mut self, count: u32) -> Self {
        self.current_count = Some(count);
        self
    }

    pub fn is_active(&self) -> bool {
        self.target.is_active()
    }

    /// Completes still needed before this bucket fills
    pub fn remaining(&self, total_target: u32) -> u32 {
        self.target
            .resolved_count(total_target)
            .saturating_sub(self.current_count.unwrap_or(0))
    }
}

/// Ordered items sharing one bucket taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDimension {
    pub kind: Dimension,
    pub items: Vec<QuotaItem>,
}

impl QuotaDimension {
    pub fn new(kind: Dimension) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Dimension pre-filled with every canonical bucket at zero
    pub fn canonical(kind: Dimension) -> Self {
        Self {
            kind,
            items: BucketKey::canonical(kind)
                .into_iter()
                .map(QuotaItem::empty)
                .collect(),
        }
    }

    /// A dimension is active iff at least one item has a positive target
    pub fn is_active(&self) -> bool {
        self.items.iter().any(QuotaItem::is_active)
    }

    /// Quota type of the dimension, taken from its first active item
    pub fn quota_type(&self) -> QuotaType {
        self.items
            .iter()
            .find(|i| i.is_active())
            .or(self.items.first())
            .map(|i| i.target.quota_type())
            .unwrap_or_default()
    }

    /// Sum of positive COUNT targets, widened so large targets cannot overflow
    pub fn count_sum(&self) -> u64 {
        self.sum_of(QuotaType::Count)
    }

    /// Sum of positive PERCENTAGE targets
    pub fn percentage_sum(&self) -> u64 {
        self.sum_of(QuotaType::Percentage)
    }

    fn sum_of(&self, quota_type: QuotaType) -> u64 {
        self.items
            .iter()
            .filter(|i| i.target.quota_type() == quota_type && i.is_active())
            .map(|i| u64::from(i.target.value()))
            .sum()
    }

    pub fn item(&self, bucket: &BucketKey) -> Option<&QuotaItem> {
        self.items.iter().find(|i| &i.bucket == bucket)
    }

    pub fn item_mut(&mut self, bucket: &BucketKey) -> Option<&mut QuotaItem> {
        self.items.iter_mut().find(|i| &i.bucket == bucket)
    }

    pub fn active_items(&self) -> impl Iterator<Item = &QuotaItem> {
        self.items.iter().filter(|i| i.is_active())
    }
}

/// One survey's quota configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaModel {
    pub enabled: bool,
    pub total_target: u32,
    pub age: QuotaDimension,
    pub gender: QuotaDimension,
    pub location: QuotaDimension,
    pub category: QuotaDimension,
    #[serde(default)]
    pub screening_questions: Vec<ScreeningQuestion>,
}

impl Default for QuotaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl QuotaModel {
    /// Empty model as created when an operator opens quota setup
    pub fn new() -> Self {
        Self {
            enabled: false,
            total_target: 0,
            age: QuotaDimension::canonical(Dimension::Age),
            gender: QuotaDimension::canonical(Dimension::Gender),
            location: QuotaDimension::new(Dimension::Location),
            category: QuotaDimension::new(Dimension::Category),
            screening_questions: Vec::new(),
        }
    }

    pub fn with_total_target(mut self, total: u32) -> Self {
        self.enabled = true;
        self.total_target = total;
        self
    }

    pub fn with_target(mut self, bucket: BucketKey, target: QuotaTarget) -> Self {
        self.set_target(bucket, target);
        self
    }

    pub fn dimension(&self, kind: Dimension) -> &QuotaDimension {
        match kind {
            Dimension::Age => &self.age,
            Dimension::Gender => &self.gender,
            Dimension::Location => &self.location,
            Dimension::Category => &self.category,
        }
    }

    pub fn dimension_mut(&mut self, kind: Dimension) -> &mut QuotaDimension {
        match kind {
            Dimension::Age => &mut self.age,
            Dimension::Gender => &mut self.gender,
            Dimension::Location => &mut self.location,
            Dimension::Category => &mut self.category,
        }
    }

    /// Dimensions in screening order
    pub fn dimensions(&self) -> impl Iterator<Item = &QuotaDimension> {
        [&self.age, &self.gender, &self.location, &self.category].into_iter()
    }

    pub fn active_dimensions(&self) -> impl Iterator<Item = &QuotaDimension> {
        self.dimensions().filter(|d| d.is_active())
    }

    /// Set the target of one bucket, adding the bucket if it is not present
    pub fn set_target(&mut self, bucket: BucketKey, target: QuotaTarget) {
        let dimension = self.dimension_mut(bucket.dimension());
        match dimension.item_mut(&bucket) {
            Some(item) => item.target = target,
            None => dimension.items.push(QuotaItem::new(bucket, target)),
        }
    }

    pub fn set_total_target(&mut self, total: u32) {
        self.total_target = total;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Add a location row with an empty target. Returns `false` for duplicates.
    pub fn add_location(&mut self, location: Location) -> bool {
        let bucket = BucketKey::Location(location);
        if self.location.item(&bucket).is_some() {
            return false;
        }
        let quota_type = self.location.quota_type();
        self.location
            .items
            .push(QuotaItem::new(bucket, QuotaTarget::zero(quota_type)));
        true
    }

    pub fn remove_location(&mut self, location: &Location) -> bool {
        let before = self.location.items.len();
        self.location
            .items
            .retain(|i| !matches!(&i.bucket, BucketKey::Location(l) if l == location));
        self.location.items.len() != before
    }

    /// Re-align every dimension with its canonical bucket list.
    ///
    /// Age and gender end up with exactly their fixed buckets in canonical
    /// order; with a catalog, category ends up with one item per catalog
    /// entry. Existing targets are carried over; missing buckets get a zero
    /// target of the dimension's type. Location rows are kept as configured,
    /// and so are category rows when no catalog is known.
    pub fn normalize(&mut self, categories: Option<&[Category]>) {
        for kind in [Dimension::Age, Dimension::Gender] {
            let canonical = BucketKey::canonical(kind);
            Self::realign(self.dimension_mut(kind), canonical);
        }

        if let Some(categories) = categories {
            let catalog = categories
                .iter()
                .map(|c| BucketKey::Category(c.id.clone()))
                .collect();
            Self::realign(&mut self.category, catalog);
        }

        let mut seen = std::collections::HashSet::new();
        self.location.items.retain(|i| seen.insert(i.bucket.clone()));
    }

    fn realign(dimension: &mut QuotaDimension, buckets: Vec<BucketKey>) {
        let quota_type = dimension.quota_type();
        let previous = std::mem::take(&mut dimension.items);
        dimension.items = buckets
            .into_iter()
            .map(|bucket| {
                previous
                    .iter()
                    .find(|i| i.bucket == bucket)
                    .cloned()
                    .unwrap_or_else(|| QuotaItem::new(bucket, QuotaTarget::zero(quota_type)))
            })
            .collect();
    }
}
