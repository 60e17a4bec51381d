//! Bucket taxonomies for each quota dimension
//!
//! Every quota dimension has its own bucket vocabulary:
//!
//! | Dimension | Bucket | Canonical universe |
//! |-----------|--------|--------------------|
//! | Age | `[min, max)` range | six fixed brackets |
//! | Gender | enum literal | four fixed values |
//! | Location | country/state/city tuple | the configured rows |
//! | Category | category id | the category catalog |
//!
//! A bucket's [`BucketKey::value`] is the string that screening options
//! carry, which is how a respondent answer is matched back to a quota item.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// An independent audience axis with its own bucket taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Age,
    Gender,
    Location,
    Category,
}

impl Dimension {
    /// All dimensions in screening order
    pub const ALL: [Dimension; 4] = [
        Dimension::Age,
        Dimension::Gender,
        Dimension::Location,
        Dimension::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Age => "age",
            Dimension::Gender => "gender",
            Dimension::Location => "location",
            Dimension::Category => "category",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Age => "Age",
            Dimension::Gender => "Gender",
            Dimension::Location => "Location",
            Dimension::Category => "Category",
        }
    }

    /// Deterministic screening question id for this dimension
    pub fn question_id(&self) -> String {
        format!("screening_{}", self.as_str())
    }

    /// Inverse of [`Dimension::question_id`]; bare dimension names are accepted too
    pub fn from_question_id(id: &str) -> Option<Dimension> {
        id.strip_prefix("screening_").unwrap_or(id).parse().ok()
    }

    /// Whether the dimension has a fixed bucket universe
    pub fn has_fixed_taxonomy(&self) -> bool {
        matches!(self, Dimension::Age | Dimension::Gender)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "age" => Ok(Dimension::Age),
            "gender" => Ok(Dimension::Gender),
            "location" => Ok(Dimension::Location),
            "category" | "categories" => Ok(Dimension::Category),
            other => Err(DomainError::UnknownDimension(other.to_string())),
        }
    }
}

/// Half-open age range `[min, max)`; `max = None` is open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl AgeRange {
    /// The six canonical age brackets
    pub const BRACKETS: [AgeRange; 6] = [
        AgeRange::new(18, Some(25)),
        AgeRange::new(25, Some(35)),
        AgeRange::new(35, Some(45)),
        AgeRange::new(45, Some(55)),
        AgeRange::new(55, Some(65)),
        AgeRange::new(65, None),
    ];

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && self.max.is_none_or(|max| age < max)
    }

    /// Inclusive label, e.g. `25-34` or `65+`
    pub fn label(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{}", self.min, max.saturating_sub(1)),
            None => format!("{}+", self.min),
        }
    }

    /// Canonical bracket containing `age`, if any
    pub fn bracket_for(age: u32) -> Option<AgeRange> {
        Self::BRACKETS.iter().copied().find(|r| r.contains(age))
    }
}

impl std::str::FromStr for AgeRange {
    type Err = DomainError;

    /// Parses the inclusive label form (`25-34`, `65+`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_bucket("age", s);
        let s = s.trim();

        if let Some(min) = s.strip_suffix('+') {
            let min: u32 = min.trim().parse().map_err(|_| invalid())?;
            return Ok(AgeRange::new(min, None));
        }

        let (lo, hi) = s.split_once('-').ok_or_else(invalid)?;
        let lo: u32 = lo.trim().parse().map_err(|_| invalid())?;
        let hi: u32 = hi.trim().parse().map_err(|_| invalid())?;
        if hi < lo {
            return Err(invalid());
        }
        let max = hi.checked_add(1).ok_or_else(invalid)?;
        Ok(AgeRange::new(lo, Some(max)))
    }
}

/// Canonical gender values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::NonBinary,
        Gender::PreferNotToSay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::NonBinary => "Non-binary",
            Gender::PreferNotToSay => "Prefer not to say",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "non_binary" | "nonbinary" => Ok(Gender::NonBinary),
            "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            _ => Err(DomainError::invalid_bucket("gender", s)),
        }
    }
}

/// A configured location row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Location {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            state: None,
            city: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Serialized triple `country|state|city` (empty segments for unset parts)
    pub fn value(&self) -> String {
        format!(
            "{}|{}|{}",
            self.country,
            self.state.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or("")
        )
    }

    /// Most specific first, e.g. `Austin, Texas, US`
    pub fn label(&self) -> String {
        [self.city.as_deref(), self.state.as_deref(), Some(self.country.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::str::FromStr for Location {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('|');
        let country = parts.next().unwrap_or("").trim();
        if country.is_empty() {
            return Err(DomainError::invalid_bucket("location", s));
        }
        let non_empty = |p: Option<&str>| {
            p.map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
        };
        Ok(Location {
            country: country.to_string(),
            state: non_empty(parts.next()),
            city: non_empty(parts.next()),
        })
    }
}

/// Entry in the survey category catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Identity of one bucket within one dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "bucket", rename_all = "lowercase")]
pub enum BucketKey {
    Age(AgeRange),
    Gender(Gender),
    Location(Location),
    Category(String),
}

impl BucketKey {
    pub fn dimension(&self) -> Dimension {
        match self {
            BucketKey::Age(_) => Dimension::Age,
            BucketKey::Gender(_) => Dimension::Gender,
            BucketKey::Location(_) => Dimension::Location,
            BucketKey::Category(_) => Dimension::Category,
        }
    }

    /// The option value that encodes this bucket
    pub fn value(&self) -> String {
        match self {
            BucketKey::Age(range) => range.label(),
            BucketKey::Gender(gender) => gender.as_str().to_string(),
            BucketKey::Location(location) => location.value(),
            BucketKey::Category(id) => id.clone(),
        }
    }

    /// Parse an option value back into a bucket of the given dimension
    pub fn parse(dimension: Dimension, value: &str) -> Result<Self, DomainError> {
        match dimension {
            Dimension::Age => value.parse().map(BucketKey::Age),
            Dimension::Gender => value.parse().map(BucketKey::Gender),
            Dimension::Location => value.parse().map(BucketKey::Location),
            Dimension::Category => {
                let id = value.trim();
                if id.is_empty() {
                    Err(DomainError::invalid_bucket("category", value))
                } else {
                    Ok(BucketKey::Category(id.to_string()))
                }
            }
        }
    }

    /// Canonical buckets of a fixed-taxonomy dimension; empty otherwise
    pub fn canonical(dimension: Dimension) -> Vec<BucketKey> {
        match dimension {
            Dimension::Age => AgeRange::BRACKETS.iter().copied().map(BucketKey::Age).collect(),
            Dimension::Gender => Gender::ALL.iter().copied().map(BucketKey::Gender).collect(),
            Dimension::Location | Dimension::Category => Vec::new(),
        }
    }
}
