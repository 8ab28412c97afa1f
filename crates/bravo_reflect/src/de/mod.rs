//! Schema-directed deserialization into existing records.
//!
//! [`ReflectDatumReader`] is the default [`DatumRead`] hook. [`RecordSeed`]
//! and [`ValueSeed`] are the building blocks any hook can reuse.

mod field_key;
mod reader;
mod record_seed;
mod value_seed;

pub use reader::{DatumRead, ReflectDatumReader, read_field_value};
pub use record_seed::RecordSeed;
pub use value_seed::ValueSeed;
