use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::type_name;

use crate::{Record, ReflectError, Value};

// -----------------------------------------------------------------------------
// FieldValue

/// Conversion between a Rust field type and [`Value`].
///
/// Implemented for the primitive field types, `String`, `Option<T>`,
/// `Vec<T>` and `BTreeMap<String, T>`; [`impl_record!`](crate::impl_record)
/// implements it for record types.
pub trait FieldValue: Send + Sync + 'static {
    /// Borrows the field as a [`Value`].
    fn to_value(&self) -> Value<'_>;

    /// Converts a value into the field type.
    ///
    /// Integers widen and narrow losslessly; anything else must match.
    fn from_value(value: Value<'_>) -> Result<Self, ReflectError>
    where
        Self: Sized;

    /// Returns the field as a record, if it is one.
    #[inline]
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }
}

#[cold]
#[inline(never)]
fn mismatch<T>(value: &Value<'_>) -> ReflectError {
    ReflectError::MismatchedValue {
        expected: type_name::<T>(),
        found: value.kind(),
    }
}

// -----------------------------------------------------------------------------
// Primitives

impl FieldValue for bool {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Boolean(*self)
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(&value))
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                #[inline]
                fn to_value(&self) -> Value<'_> {
                    Value::$variant((*self).into())
                }

                fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
                    value
                        .as_i64()
                        .and_then(|v| <$ty>::try_from(v).ok())
                        .ok_or_else(|| mismatch::<Self>(&value))
                }
            }
        )*
    };
}

impl_integer! {
    i32 => Int,
    i64 => Long,
    u32 => Long,
}

impl FieldValue for f32 {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self)
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f32),
            Value::Long(v) => Ok(v as f32),
            // Decoders report every float as a double.
            Value::Double(v) => Ok(v as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldValue for f64 {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::Double(*self)
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        value.as_f64().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FieldValue for String {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        match value {
            Value::String(v) => Ok(v.into_owned()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

// -----------------------------------------------------------------------------
// Containers

impl<T: FieldValue> FieldValue for Option<T> {
    #[inline]
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    #[inline]
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        self.as_mut().and_then(T::as_record_mut)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(key, value)| (Cow::Borrowed(key.as_str()), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value<'_>) -> Result<Self, ReflectError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| Ok::<_, ReflectError>((key.into_owned(), T::from_value(value)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
