//! Schema-directed serialization of records.
//!
//! The entry point is a [`DatumWrite`] implementation such as
//! [`ReflectDatumWriter`]; [`RecordSerializer`] and [`DatumSerializer`]
//! carry the per-type write logic any hook can reuse.

mod datum_serializer;
mod error_utils;
mod record_serializer;
mod writer;

pub use datum_serializer::DatumSerializer;
pub use error_utils::make_custom_error;
pub use record_serializer::RecordSerializer;
pub use writer::{DatumWrite, ReflectDatumWriter, write_field_value};

pub(crate) use datum_serializer::resolve_union;
