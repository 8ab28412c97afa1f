use core::any::{Any, TypeId};

use crate::{ReflectError, Value};

// -----------------------------------------------------------------------------
// Record

/// Runtime introspection of an in-memory record.
///
/// Fields are addressed by their native index, the order of
/// [`field_names`](Record::field_names). Mapping schema positions onto native
/// indices is the job of a [`RecordData`](crate::RecordData) state, never of
/// the record itself.
///
/// Implement it with [`impl_record!`](crate::impl_record) rather than by hand.
pub trait Record: Any + Send + Sync {
    /// The name of the record type, used in diagnostics.
    fn record_name() -> &'static str
    where
        Self: Sized;

    /// The [`record_name`](Record::record_name) of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Native field names, in native order.
    fn field_names(&self) -> &'static [&'static str];

    /// Returns the value of the field at `index`.
    fn field_at(&self, index: usize) -> Option<Value<'_>>;

    /// Replaces the field at `index`.
    ///
    /// # Errors
    ///
    /// - [`ReflectError::IndexOutOfRange`] if `index` is not a field.
    /// - [`ReflectError::InField`] if the value cannot be converted.
    fn set_field_at(&mut self, index: usize, value: Value<'_>) -> Result<(), ReflectError>;

    /// Mutable access to a field that is itself a record.
    ///
    /// Used by readers to decode a nested record in place.
    #[inline]
    fn record_at_mut(&mut self, index: usize) -> Option<&mut dyn Record> {
        let _ = index;
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Record {
    /// The [`TypeId`] of the concrete record type.
    #[inline]
    pub fn record_type_id(&self) -> TypeId {
        Any::type_id(self.as_any())
    }

    /// Returns the native index of the field named `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_names().iter().position(|n| *n == name)
    }

    #[inline]
    pub fn is<T: Record>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Record>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl core::fmt::Debug for dyn Record {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (idx, name) in self.field_names().iter().enumerate() {
            if let Some(value) = self.field_at(idx) {
                map.entry(name, &value);
            }
        }
        map.finish()
    }
}

// -----------------------------------------------------------------------------
// apply_fields

/// Copies the named fields of a record value into `target`.
///
/// The source is either [`Value::Fields`] or a borrowed [`Value::Record`].
/// Names `target` does not have are ignored; fields the source does not
/// mention keep their value.
///
/// # Errors
///
/// - [`ReflectError::MismatchedValue`] if `value` is not a record value.
/// - Any conversion error raised by the target's fields.
pub fn apply_fields(target: &mut dyn Record, value: Value<'_>) -> Result<(), ReflectError> {
    match value {
        Value::Fields(fields) => {
            for (name, value) in fields {
                if let Some(idx) = target.index_of(&name) {
                    target.set_field_at(idx, value)?;
                }
            }
            Ok(())
        }
        Value::Record(source) => {
            for (src_idx, name) in source.field_names().iter().enumerate() {
                let Some(idx) = target.index_of(name) else {
                    continue;
                };
                if let Some(value) = source.field_at(src_idx) {
                    target.set_field_at(idx, value)?;
                }
            }
            Ok(())
        }
        other => Err(ReflectError::MismatchedValue {
            expected: "record",
            found: other.kind(),
        }),
    }
}
