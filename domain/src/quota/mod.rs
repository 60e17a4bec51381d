//! Quota definition domain
//!
//! A [`QuotaModel`] holds one survey's targets across four independent
//! dimensions. Each dimension is checked on its own; there are no joint
//! (cross-tabulated) quotas.
//!
//! ```text
//! QuotaModel
//! ├── total_target
//! ├── age       ─┐
//! ├── gender     │  QuotaDimension: Vec<QuotaItem { bucket, target }>
//! ├── location   │
//! └── category  ─┘
//! ```

pub mod bucket;
pub mod conversion;
pub mod model;
pub mod validation;

pub use bucket::{AgeRange, BucketKey, Category, Dimension, Gender, Location};
pub use conversion::{ConversionSnapshot, convert_dimension, convert_target, round_half_up};
pub use model::{QuotaDimension, QuotaItem, QuotaModel, QuotaTarget, QuotaType};
pub use validation::{QuotaIssue, QuotaIssueCode, can_proceed, validate};
