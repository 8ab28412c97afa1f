use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::RecordSchema;

// -----------------------------------------------------------------------------
// Schema

/// The structural description of a value.
///
/// Record schemas are shared through [`Arc`] so that nested records and the
/// caches keyed by them never copy the field list.
///
/// Equality is structural. Two record schemas built separately with the same
/// name and fields are equal and hash the same.
#[derive(Clone, PartialEq, Eq)]
pub enum Schema {
    Null,
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    Bytes,
    String,
    /// A sequence of items sharing one schema.
    Array(Box<Schema>),
    /// A map with string keys and values sharing one schema.
    Map(Box<Schema>),
    /// One of several branches, resolved against the value at write time.
    Union(Vec<Schema>),
    Record(Arc<RecordSchema>),
}

impl Schema {
    /// Creates the union `[null, inner]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bravo_schema::Schema;
    ///
    /// let schema = Schema::nullable(Schema::Int);
    /// assert!(schema.is_nullable());
    /// assert_eq!(schema.non_null_branch(), Some(&Schema::Int));
    /// ```
    pub fn nullable(inner: Schema) -> Self {
        Schema::Union(alloc::vec![Schema::Null, inner])
    }

    /// Creates an array schema.
    #[inline]
    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    /// Creates a map schema.
    #[inline]
    pub fn map(values: Schema) -> Self {
        Schema::Map(Box::new(values))
    }

    /// Returns the lowercase kind name, as used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Schema::Null => "null",
            Schema::Boolean => "boolean",
            Schema::Int => "int",
            Schema::Long => "long",
            Schema::Float => "float",
            Schema::Double => "double",
            Schema::Bytes => "bytes",
            Schema::String => "string",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            Schema::Union(_) => "union",
            Schema::Record(_) => "record",
        }
    }

    /// Returns `true` for `Null` and for unions containing a `Null` branch.
    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::Null => true,
            Schema::Union(branches) => branches.iter().any(|b| matches!(b, Schema::Null)),
            _ => false,
        }
    }

    /// For a two-branch union with one `Null` branch, returns the other branch.
    pub fn non_null_branch(&self) -> Option<&Schema> {
        match self {
            Schema::Union(branches) if branches.len() == 2 => {
                match (&branches[0], &branches[1]) {
                    (Schema::Null, other) | (other, Schema::Null) if !matches!(other, Schema::Null) => {
                        Some(other)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Returns `true` for `Int`, `Long`, `Float` and `Double`.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Schema::Int | Schema::Long | Schema::Float | Schema::Double)
    }

    #[inline]
    pub fn as_record(&self) -> Option<&Arc<RecordSchema>> {
        match self {
            Schema::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the branches of a union, or `None` for any other kind.
    #[inline]
    pub fn branches(&self) -> Option<&[Schema]> {
        match self {
            Schema::Union(branches) => Some(branches),
            _ => None,
        }
    }
}

impl From<RecordSchema> for Schema {
    #[inline]
    fn from(value: RecordSchema) -> Self {
        Schema::Record(Arc::new(value))
    }
}

impl From<Arc<RecordSchema>> for Schema {
    #[inline]
    fn from(value: Arc<RecordSchema>) -> Self {
        Schema::Record(value)
    }
}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Schema::Array(items) => items.hash(state),
            Schema::Map(values) => values.hash(state),
            Schema::Union(branches) => branches.hash(state),
            // Precomputed at build time, nested records are not walked again.
            Schema::Record(record) => state.write_u64(record.fingerprint()),
            _ => {}
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Schema::Map(values) => f.debug_tuple("Map").field(values).finish(),
            Schema::Union(branches) => f.debug_tuple("Union").field(branches).finish(),
            Schema::Record(record) => fmt::Debug::fmt(record, f),
            other => f.write_str(other.kind()),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Array(items) => write!(f, "array<{items}>"),
            Schema::Map(values) => write!(f, "map<{values}>"),
            Schema::Union(branches) => {
                f.write_str("[")?;
                for (idx, branch) in branches.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{branch}")?;
                }
                f.write_str("]")
            }
            Schema::Record(record) => write!(f, "record `{}`", record.name()),
            other => f.write_str(other.kind()),
        }
    }
}
