//! Schema model for `bravo`.
//!
//! A [`Schema`] describes a value; a [`RecordSchema`] is an ordered list of
//! [`Field`]s, each with a stable position. Schemas are immutable once built
//! and are shared through `Arc`.
//!
//! The model is intentionally small: it carries exactly what the reflective
//! writer and the override layer need (names, positions, nesting, structural
//! identity). Parsing schema documents is left to callers.

// -----------------------------------------------------------------------------
// No STD Support

#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod error;
mod hasher;
mod record;
mod schema;

// -----------------------------------------------------------------------------
// Top-level exports

pub use builder::RecordSchemaBuilder;
pub use error::SchemaError;
pub use hasher::{FixedHashState, FixedHasher};
pub use record::{Field, RecordSchema};
pub use schema::Schema;
