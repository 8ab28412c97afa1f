//! Per-field overrides for the reflective data model of `bravo`.
//!
//! [`BravoData`] reads and writes records reflectively, except for the
//! fields an [`OverrideResolver`] hands a [`FieldAccessor`] for. Typical
//! overrides are computed fields (totals, timestamps), flattened nested
//! structures and renamed fields, all without touching the record type or
//! the schema.
//!
//! Overrides are resolved once per (record type, record schema) pair into an
//! [`AccessorTable`] and cached in a [`StateCache`] owned by the
//! [`BravoData`] instance. [`BravoWriter`] and [`BravoReader`] apply them
//! while encoding to a `serde` serializer or decoding from a deserializer.
//!
//! # Examples
//!
//! ```
//! use bravo_data::{BravoData, FieldOverrides};
//! use bravo_data::accessor::read_only;
//! use bravo_reflect::{Value, impl_record};
//! use bravo_schema::RecordSchema;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Scores {
//!     math: i32,
//!     java: i32,
//! }
//!
//! impl_record!(Scores { math, java });
//!
//! #[derive(Default)]
//! struct Student {
//!     name: String,
//!     scores: Scores,
//! }
//!
//! impl_record!(Student { name, scores });
//!
//! // The schema is flat, the record is not.
//! let data = BravoData::with_overrides(
//!     FieldOverrides::new()
//!         .name("mathScore", read_only(|s: &Student| Value::Int(s.scores.math)))
//!         .name("javaScore", read_only(|s: &Student| Value::Int(s.scores.java))),
//! );
//!
//! let schema = RecordSchema::builder("Student")
//!     .required_string("name")
//!     .required_int("mathScore")
//!     .required_int("javaScore")
//!     .build()
//!     .unwrap();
//! let writer = data.create_writer(Arc::new(schema));
//!
//! let student = Student {
//!     name: "dancer".into(),
//!     scores: Scores { math: 35, java: 30 },
//! };
//! let json = serde_json::to_string(&writer.serializable(&student)).unwrap();
//! assert_eq!(json, r#"{"name":"dancer","mathScore":35,"javaScore":30}"#);
//! ```

// -----------------------------------------------------------------------------
// No STD Support

#![no_std]

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

pub mod accessor;

mod cache;
mod data;
mod error;
mod reader;
mod resolver;
mod state;
mod table;
mod writer;

// -----------------------------------------------------------------------------
// Top-level exports

pub use accessor::{FieldAccessor, SharedAccessor};
pub use cache::StateCache;
pub use data::{BravoData, BravoDataBuilder};
pub use error::BuildError;
pub use reader::BravoReader;
pub use resolver::{
    ByField, ByName, FieldContext, FieldOverrides, NoOverrides, OverrideResolver, RecordType,
    by_field, by_name, from_fn,
};
pub use state::RecordState;
pub use table::AccessorTable;
pub use writer::BravoWriter;
