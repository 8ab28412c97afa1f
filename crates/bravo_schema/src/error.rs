use alloc::string::String;

use thiserror::Error;

/// Errors raised while building a [`RecordSchema`](crate::RecordSchema).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("record schema name must not be empty")]
    EmptyRecordName,

    #[error("field at position {pos} of record `{record}` has an empty name")]
    EmptyFieldName { record: String, pos: usize },

    #[error("record `{record}` declares field `{field}` more than once")]
    DuplicateField { record: String, field: String },
}
