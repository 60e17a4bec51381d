//! Presentation layer for quota-gate
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporters, operator input files and the interactive respondent session.

pub mod cli;
pub mod config;
pub mod input;
pub mod output;
pub mod progress;
pub mod respondent;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, DimensionArg, OutputFormat, QuotaTypeArg};
pub use config::OutputConfig;
pub use input::{VendorCriteriaFile, VendorQuestionReport};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use respondent::{RespondentRunner, RunnerError};
