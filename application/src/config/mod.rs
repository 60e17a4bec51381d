//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ProtocolParams`]: request timeouts and restart policy for the
//!   qualification flow
//! - [`PublishParams`]: fallback link base and vendor status code for publishing

pub mod protocol_params;
pub mod publish_params;

pub use protocol_params::ProtocolParams;
pub use publish_params::{PUBLISHED_STATUS_CODE, PublishParams};
