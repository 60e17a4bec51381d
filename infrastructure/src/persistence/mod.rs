//! Durable state: the persisted quota document and the file-backed store

mod file_store;
mod quota_document;

pub use file_store::FileKeyValueStore;
pub use quota_document::{
    BucketDocument, BucketOperator, BucketValue, OptionTarget, QuestionDocument, QuotaDocument,
};
