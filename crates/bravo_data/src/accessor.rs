use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;

use bravo_reflect::{Record, ReflectError, Value};

// -----------------------------------------------------------------------------
// FieldAccessor

/// Reads and writes one field of a record, in place of the default
/// reflective access.
///
/// Accessors are owned by a resolver and shared by every accessor table that
/// resolves to them, so they must be safe to call from many threads at once.
pub trait FieldAccessor: Send + Sync {
    /// Produces the value written for the field.
    fn get<'r>(&self, record: &'r dyn Record) -> Result<Value<'r>, ReflectError>;

    /// Stores a decoded value.
    ///
    /// Read-only accessors accept and discard the value.
    fn set(&self, record: &mut dyn Record, value: Value<'_>) -> Result<(), ReflectError>;

    /// Returns `true` if [`set`](FieldAccessor::set) is a no-op.
    #[inline]
    fn is_read_only(&self) -> bool {
        false
    }
}

/// A shared, type-erased [`FieldAccessor`].
pub type SharedAccessor = Arc<dyn FieldAccessor>;

#[inline]
fn downcast<T: Record>(record: &dyn Record) -> Result<&T, ReflectError> {
    record
        .downcast_ref::<T>()
        .ok_or_else(|| mismatched::<T>(record.type_name()))
}

#[inline]
fn downcast_mut<T: Record>(record: &mut dyn Record) -> Result<&mut T, ReflectError> {
    let found = record.type_name();
    record
        .downcast_mut::<T>()
        .ok_or_else(|| mismatched::<T>(found))
}

#[cold]
#[inline(never)]
fn mismatched<T: Record>(found: &'static str) -> ReflectError {
    ReflectError::MismatchedRecord {
        expected: T::record_name(),
        found,
    }
}

// -----------------------------------------------------------------------------
// ReadOnly

/// An accessor computing a value from a record of type `T`.
///
/// Writing through it is a no-op that never fails and never touches the
/// record, so computed fields survive a decode unchanged.
pub struct ReadOnly<T, G> {
    getter: G,
    _marker: PhantomData<fn(&T)>,
}

impl<T, G> ReadOnly<T, G>
where
    T: Record,
    G: for<'r> Fn(&'r T) -> Value<'r> + Send + Sync,
{
    #[inline]
    pub const fn new(getter: G) -> Self {
        Self {
            getter,
            _marker: PhantomData,
        }
    }
}

impl<T, G> FieldAccessor for ReadOnly<T, G>
where
    T: Record,
    G: for<'r> Fn(&'r T) -> Value<'r> + Send + Sync,
{
    #[inline]
    fn get<'r>(&self, record: &'r dyn Record) -> Result<Value<'r>, ReflectError> {
        downcast::<T>(record).map(&self.getter)
    }

    #[inline]
    fn set(&self, _record: &mut dyn Record, _value: Value<'_>) -> Result<(), ReflectError> {
        Ok(())
    }

    #[inline]
    fn is_read_only(&self) -> bool {
        true
    }
}

impl<T: Record, G> fmt::Debug for ReadOnly<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReadOnly<{}>", T::record_name())
    }
}

// -----------------------------------------------------------------------------
// ReadWrite

/// An accessor with a getter and a setter over a record of type `T`.
pub struct ReadWrite<T, G, S> {
    getter: G,
    setter: S,
    _marker: PhantomData<fn(&T)>,
}

impl<T, G, S> ReadWrite<T, G, S>
where
    T: Record,
    G: for<'r> Fn(&'r T) -> Value<'r> + Send + Sync,
    S: Fn(&mut T, Value<'_>) -> Result<(), ReflectError> + Send + Sync,
{
    #[inline]
    pub const fn new(getter: G, setter: S) -> Self {
        Self {
            getter,
            setter,
            _marker: PhantomData,
        }
    }
}

impl<T, G, S> FieldAccessor for ReadWrite<T, G, S>
where
    T: Record,
    G: for<'r> Fn(&'r T) -> Value<'r> + Send + Sync,
    S: Fn(&mut T, Value<'_>) -> Result<(), ReflectError> + Send + Sync,
{
    #[inline]
    fn get<'r>(&self, record: &'r dyn Record) -> Result<Value<'r>, ReflectError> {
        downcast::<T>(record).map(&self.getter)
    }

    #[inline]
    fn set(&self, record: &mut dyn Record, value: Value<'_>) -> Result<(), ReflectError> {
        (self.setter)(downcast_mut::<T>(record)?, value)
    }
}

impl<T: Record, G, S> fmt::Debug for ReadWrite<T, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReadWrite<{}>", T::record_name())
    }
}

// -----------------------------------------------------------------------------
// Constant

/// A read-only accessor returning the same value for every record.
#[derive(Debug, Clone)]
pub struct Constant(Value<'static>);

impl Constant {
    #[inline]
    pub const fn new(value: Value<'static>) -> Self {
        Self(value)
    }
}

impl FieldAccessor for Constant {
    #[inline]
    fn get<'r>(&self, _record: &'r dyn Record) -> Result<Value<'r>, ReflectError> {
        Ok(self.0.clone())
    }

    #[inline]
    fn set(&self, _record: &mut dyn Record, _value: Value<'_>) -> Result<(), ReflectError> {
        Ok(())
    }

    #[inline]
    fn is_read_only(&self) -> bool {
        true
    }
}

// -----------------------------------------------------------------------------
// Constructors

/// Creates a shared [`ReadOnly`] accessor.
///
/// # Examples
///
/// ```
/// use bravo_data::accessor::read_only;
/// use bravo_reflect::{Value, impl_record};
///
/// #[derive(Default)]
/// struct Scores {
///     math: i32,
///     java: i32,
/// }
///
/// impl_record!(Scores { math, java });
///
/// let total = read_only(|s: &Scores| Value::Int(s.math + s.java));
///
/// let mut scores = Scores { math: 35, java: 30 };
/// assert_eq!(total.get(&scores), Ok(Value::Int(65)));
///
/// // Writes are discarded.
/// assert_eq!(total.set(&mut scores, Value::Int(0)), Ok(()));
/// assert_eq!(scores.math, 35);
/// ```
#[inline]
pub fn read_only<T, G>(getter: G) -> SharedAccessor
where
    T: Record,
    G: for<'r> Fn(&'r T) -> Value<'r> + Send + Sync + 'static,
{
    Arc::new(ReadOnly::new(getter))
}

/// Creates a shared [`ReadWrite`] accessor.
#[inline]
pub fn read_write<T, G, S>(getter: G, setter: S) -> SharedAccessor
where
    T: Record,
    G: for<'r> Fn(&'r T) -> Value<'r> + Send + Sync + 'static,
    S: Fn(&mut T, Value<'_>) -> Result<(), ReflectError> + Send + Sync + 'static,
{
    Arc::new(ReadWrite::new(getter, setter))
}

/// Creates a shared [`Constant`] accessor.
#[inline]
pub fn constant(value: impl Into<Value<'static>>) -> SharedAccessor {
    Arc::new(Constant::new(value.into()))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use bravo_reflect::{FieldValue, Record, ReflectError, Value, impl_record};

    use super::{constant, read_only, read_write};

    #[derive(Default)]
    struct Student {
        name: String,
        math: i32,
    }

    impl_record!(Student { name, math });

    #[derive(Default)]
    struct Tutor {
        name: String,
    }

    impl_record!(Tutor { name });

    #[test]
    fn read_only_never_touches_the_record() {
        let accessor = read_only(|s: &Student| Value::from(s.name.as_str()));
        assert!(accessor.is_read_only());

        let mut student = Student {
            name: String::from("dancer"),
            math: 35,
        };
        assert_eq!(accessor.get(&student), Ok(Value::from("dancer")));
        assert_eq!(accessor.set(&mut student, Value::from("other")), Ok(()));
        assert_eq!(student.name, "dancer");

        // Writes are discarded even for records of another type.
        let mut tutor = Tutor::default();
        assert_eq!(accessor.set(&mut tutor, Value::Null), Ok(()));
    }

    #[test]
    fn read_write_stores_values() {
        let accessor = read_write(
            |s: &Student| Value::Int(s.math),
            |s: &mut Student, value| {
                s.math = i32::from_value(value)?;
                Ok(())
            },
        );
        assert!(!accessor.is_read_only());

        let mut student = Student::default();
        accessor.set(&mut student, Value::Int(40)).unwrap();
        assert_eq!(student.math, 40);
        assert_eq!(accessor.get(&student), Ok(Value::Int(40)));
    }

    #[test]
    fn typed_accessors_reject_other_records() {
        let accessor = read_write(
            |s: &Student| Value::Int(s.math),
            |_: &mut Student, _| Ok(()),
        );
        let mut tutor = Tutor::default();
        let mismatch = ReflectError::MismatchedRecord {
            expected: "Student",
            found: "Tutor",
        };
        assert_eq!(accessor.get(&tutor), Err(mismatch.clone()));
        assert_eq!(accessor.set(&mut tutor, Value::Null), Err(mismatch));
        let record: &dyn Record = &tutor;
        assert!(record.is::<Tutor>());
    }

    #[test]
    fn constants_ignore_the_record() {
        let accessor = constant(7_i64);
        assert!(accessor.is_read_only());
        assert_eq!(accessor.get(&Tutor::default()), Ok(Value::Long(7)));
    }
}
