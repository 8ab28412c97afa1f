use alloc::boxed::Box;
use alloc::string::String;

use thiserror::Error;

/// Errors raised by reflective field access.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReflectError {
    /// The schema names a field the in-memory record type does not have.
    ///
    /// This is the fault the override layer normalizes to a null value.
    #[error("record `{record}` has no field named `{field}`")]
    MissingField { record: &'static str, field: Box<str> },

    /// A schema position beyond the record state built for that schema.
    #[error("schema position {pos} is out of range for a record state of {len} fields")]
    PositionOutOfRange { pos: usize, len: usize },

    /// A native field index beyond the record's field list.
    #[error("field index {index} is out of range for record `{record}` with {len} fields")]
    IndexOutOfRange {
        record: &'static str,
        index: usize,
        len: usize,
    },

    #[error("cannot convert a `{found}` value into `{expected}`")]
    MismatchedValue {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected a record of type `{expected}`, found `{found}`")]
    MismatchedRecord {
        expected: &'static str,
        found: &'static str,
    },

    /// Wraps an error raised while converting the value of a named field.
    #[error("field `{field}` of record `{record}`: {source}")]
    InField {
        record: &'static str,
        field: &'static str,
        source: Box<ReflectError>,
    },

    #[error("{0}")]
    Custom(String),
}

impl ReflectError {
    /// Attach the record and field a conversion error happened in.
    #[cold]
    pub fn in_field(self, record: &'static str, field: &'static str) -> Self {
        ReflectError::InField {
            record,
            field,
            source: Box::new(self),
        }
    }

    /// Creates a [`ReflectError::Custom`].
    #[cold]
    pub fn custom(msg: impl Into<String>) -> Self {
        ReflectError::Custom(msg.into())
    }

    /// Returns `true` for [`ReflectError::MissingField`].
    #[inline]
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, ReflectError::MissingField { .. })
    }
}
