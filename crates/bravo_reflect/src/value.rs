use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::Record;

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value moved between records, accessors and writers.
///
/// `Value` borrows from the record it was read from wherever it can: strings
/// and bytes are [`Cow`]s, and a nested in-memory record is carried as
/// [`Value::Record`] so the writer can descend into it with its own record
/// state. [`Value::Fields`] is the owned form of a record, produced by
/// decoding or built by hand in an accessor.
///
/// # Examples
///
/// ```
/// use bravo_reflect::Value;
///
/// let v = Value::from(35);
/// assert_eq!(v.kind(), "int");
/// assert_eq!(v.as_i64(), Some(35));
///
/// let name = String::from("dancer");
/// let v = Value::from(name.as_str());
/// assert_eq!(v.as_str(), Some("dancer"));
/// ```
#[derive(Clone, Default)]
pub enum Value<'a> {
    #[default]
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Cow<'a, [u8]>),
    String(Cow<'a, str>),
    Array(Vec<Value<'a>>),
    /// String-keyed entries, in insertion order.
    Map(Vec<(Cow<'a, str>, Value<'a>)>),
    /// A borrowed in-memory record.
    Record(&'a dyn Record),
    /// A generic record: named field values.
    Fields(Vec<(Cow<'a, str>, Value<'a>)>),
}

impl<'a> Value<'a> {
    /// Returns the lowercase kind name, as used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) | Value::Fields(_) => "record",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `Int` and `Long` values widened to `i64`.
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any numeric value as `f64`.
    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match self {
            Value::Record(v) => Some(*v),
            _ => None,
        }
    }

    /// Looks up a named field of a record value, either form.
    ///
    /// Returns `None` for non-record values and unknown names.
    pub fn get(&self, name: &str) -> Option<Value<'_>> {
        match self {
            Value::Record(record) => record.index_of(name).and_then(|idx| record.field_at(idx)),
            Value::Fields(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// Detaches the value from everything it borrows.
    ///
    /// A borrowed [`Value::Record`] is snapshotted into [`Value::Fields`],
    /// keyed by the record's native field names.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(v) => Value::Boolean(v),
            Value::Int(v) => Value::Int(v),
            Value::Long(v) => Value::Long(v),
            Value::Float(v) => Value::Float(v),
            Value::Double(v) => Value::Double(v),
            Value::Bytes(v) => Value::Bytes(Cow::Owned(v.into_owned())),
            Value::String(v) => Value::String(Cow::Owned(v.into_owned())),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_owned).collect()),
            Value::Map(entries) => Value::Map(own_entries(entries)),
            Value::Fields(fields) => Value::Fields(own_entries(fields)),
            Value::Record(record) => Value::Fields(
                record
                    .field_names()
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, name)| {
                        let value = record.field_at(idx)?;
                        Some((Cow::Borrowed(*name), value.into_owned()))
                    })
                    .collect(),
            ),
        }
    }
}

fn own_entries(entries: Vec<(Cow<'_, str>, Value<'_>)>) -> Vec<(Cow<'static, str>, Value<'static>)> {
    entries
        .into_iter()
        .map(|(key, value)| (Cow::Owned(key.into_owned()), value.into_owned()))
        .collect()
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value<'_> {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Boolean,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl From<u32> for Value<'_> {
    #[inline]
    fn from(value: u32) -> Self {
        Value::Long(i64::from(value))
    }
}

impl<'a> From<&'a str> for Value<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        Value::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(Cow::Owned(value))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    #[inline]
    fn from(value: &'a [u8]) -> Self {
        Value::Bytes(Cow::Borrowed(value))
    }
}

impl From<Vec<u8>> for Value<'_> {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(value))
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Traits

impl PartialEq for Value<'_> {
    /// Structural equality. Two [`Value::Record`]s are equal only when they
    /// point at the same record.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Fields(a), Value::Fields(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => core::ptr::addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Long(v) => f.debug_tuple("Long").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Value::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Value::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Value::Fields(v) => f.debug_tuple("Fields").field(v).finish(),
            Value::Record(v) => write!(f, "Record({})", v.type_name()),
        }
    }
}
