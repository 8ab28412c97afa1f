//! Reflective record access and schema-directed serde plumbing for `bravo`.
//!
//! - [`Record`]: runtime introspection of an in-memory record.
//! - [`Value`]: the dynamic value moved between records and the wire.
//! - [`RecordData`]: the pluggable data model, with [`ReflectData`] as the
//!   default reflective implementation.
//! - [`ser`] and [`de`]: write a record to any `serde` serializer according to
//!   a [`RecordSchema`], and read one back into an existing record.
//!
//! Record types are usually wired up with [`impl_record!`].
//!
//! # Examples
//!
//! ```
//! use bravo_reflect::impl_record;
//! use bravo_reflect::ser::ReflectDatumWriter;
//! use bravo_schema::RecordSchema;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Scores {
//!     math_score: i32,
//!     java_score: i32,
//! }
//!
//! impl_record!(Scores {
//!     math_score as "mathScore",
//!     java_score as "javaScore",
//! });
//!
//! let schema = Arc::new(
//!     RecordSchema::builder("Scores")
//!         .required_int("mathScore")
//!         .required_int("javaScore")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let scores = Scores { math_score: 35, java_score: 30 };
//! let writer = ReflectDatumWriter::new(schema);
//! let json = serde_json::to_string(&writer.serializable(&scores)).unwrap();
//! assert_eq!(json, r#"{"mathScore":35,"javaScore":30}"#);
//! ```

#![no_std]

// -----------------------------------------------------------------------------
// Compilation config

/// Some macros used for compilation control.
pub(crate) mod cfg {
    /// Expands its input only when schema stacks are tracked for error
    /// messages (`std` + `debug` features in a debug build).
    macro_rules! debug {
        (if { $($then:tt)* } else { $($otherwise:tt)* }) => {{
            #[cfg(all(feature = "std", feature = "debug", debug_assertions))]
            let value = { $($then)* };
            #[cfg(not(all(feature = "std", feature = "debug", debug_assertions)))]
            let value = { $($otherwise)* };
            value
        }};
        ($($item:tt)*) => {
            #[cfg(all(feature = "std", feature = "debug", debug_assertions))]
            $($item)*
        };
    }

    pub(crate) use debug;
}

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod data;
mod error;
mod field_value;
mod macros;
mod record;
mod value;

pub mod de;
pub mod ser;

// -----------------------------------------------------------------------------
// Top-level exports

pub use data::{RecordData, ReflectData, ReflectState};
pub use error::ReflectError;
pub use field_value::FieldValue;
pub use record::{Record, apply_fields};
pub use value::Value;

pub use bravo_schema as schema;
