//! Respondent qualification domain
//!
//! Pure pieces of the qualification protocol: the [`Respondent`] record,
//! the [`QualificationPhase`] state graph and how an oracle answer becomes a
//! [`QualificationVerdict`]. The driving state machine lives in the
//! application layer.

pub mod entities;
pub mod phase;
pub mod verdict;

pub use entities::{Respondent, ScreeningAnswer};
pub use phase::QualificationPhase;
pub use verdict::{QUOTA_FULL_STATUS, QualificationVerdict};
