//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - domain-level errors
//! - [`string`] - truncation and signed numbers for console output

pub mod error;
pub mod string;
