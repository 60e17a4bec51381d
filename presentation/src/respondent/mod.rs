//! Interactive respondent session

mod runner;

pub use runner::{RespondentRunner, RunnerError};
