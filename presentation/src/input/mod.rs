//! Operator input files read by the CLI

mod vendor_file;

pub use vendor_file::{VendorCriteriaFile, VendorQuestionReport};
