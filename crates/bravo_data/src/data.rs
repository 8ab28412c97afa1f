use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use bravo_reflect::{Record, RecordData, ReflectData, ReflectError, Value};
use bravo_schema::{Field, RecordSchema};

use crate::{
    AccessorTable, BravoReader, BravoWriter, BuildError, FieldOverrides, OverrideResolver,
    RecordState, RecordType, StateCache,
};

// -----------------------------------------------------------------------------
// BravoData

struct Inner {
    resolver: Box<dyn OverrideResolver>,
    reflect: ReflectData,
    cache: StateCache<RecordState>,
}

/// A reflective data model with per-field overrides.
///
/// Every field of a record is read and written reflectively, unless the
/// resolver supplies an accessor for it. Overrides are resolved once per
/// (record type, record schema) pair and cached in this instance; clones
/// share the cache and the resolver.
///
/// # Examples
///
/// ```
/// use bravo_data::BravoData;
/// use bravo_data::FieldOverrides;
/// use bravo_data::accessor::read_only;
/// use bravo_reflect::{Value, impl_record};
/// use bravo_schema::RecordSchema;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Scores {
///     math: i32,
///     java: i32,
/// }
///
/// impl_record!(Scores { math as "mathScore", java as "javaScore" });
///
/// let data = BravoData::with_overrides(
///     FieldOverrides::new()
///         .in_schema("Scores", "total", read_only(|s: &Scores| Value::Int(s.math + s.java))),
/// );
///
/// let schema = Arc::new(
///     RecordSchema::builder("Scores")
///         .required_int("mathScore")
///         .required_int("javaScore")
///         .required_int("total")
///         .build()
///         .unwrap(),
/// );
/// let writer = data.create_writer(schema);
///
/// let json = serde_json::to_string(&writer.serializable(&Scores { math: 35, java: 30 })).unwrap();
/// assert_eq!(json, r#"{"mathScore":35,"javaScore":30,"total":65}"#);
/// ```
#[derive(Clone)]
pub struct BravoData {
    inner: Arc<Inner>,
}

impl BravoData {
    /// Starts configuring a [`BravoData`].
    #[inline]
    pub fn builder() -> BravoDataBuilder {
        BravoDataBuilder::new()
    }

    /// Creates a data model resolving overrides with `resolver`.
    pub fn new(resolver: impl OverrideResolver) -> Self {
        Self::from_boxed(Box::new(resolver))
    }

    /// Creates a data model from a declarative override table.
    #[inline]
    pub fn with_overrides(overrides: FieldOverrides) -> Self {
        Self::new(overrides)
    }

    fn from_boxed(resolver: Box<dyn OverrideResolver>) -> Self {
        Self {
            inner: Arc::new(Inner {
                resolver,
                reflect: ReflectData,
                cache: StateCache::new(),
            }),
        }
    }

    /// Returns the state for writing or reading `record` through `schema`,
    /// building and caching it on first use.
    pub fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Arc<RecordState>, ReflectError> {
        let record_type = RecordType::of_record(record);
        self.inner
            .cache
            .get_or_try_insert(record_type.id(), schema, || {
                let reflect = self.inner.reflect.record_state(record, schema)?;
                let table = AccessorTable::build(record_type, schema, &*self.inner.resolver);
                log::debug!(
                    "built record state for `{}` written as `{}`: {} of {} fields overridden",
                    record_type.name(),
                    schema,
                    table.overridden(),
                    table.len(),
                );
                Ok(RecordState::new(reflect, table))
            })
    }

    /// Reads the value of `field`.
    ///
    /// An overridden field is read through its accessor only. Otherwise the
    /// field is read reflectively, and a schema field the record type does
    /// not have reads as [`Value::Null`]. That is the only error recovered
    /// here; everything else propagates.
    pub fn read_field<'r>(
        &self,
        record: &'r dyn Record,
        field: &Field,
        state: &RecordState,
    ) -> Result<Value<'r>, ReflectError> {
        if let Some(accessor) = state.table().get(field.pos()) {
            return accessor.get(record);
        }

        match self.inner.reflect.get_field(record, field, state.reflect()) {
            Err(err) if err.is_missing_field() => {
                log::trace!("{err}, reading null");
                Ok(Value::Null)
            }
            result => result,
        }
    }

    /// Writes the value of `field`.
    ///
    /// An overridden field is written through its accessor only, which for a
    /// read-only accessor discards the value.
    pub fn write_field(
        &self,
        record: &mut dyn Record,
        field: &Field,
        value: Value<'_>,
        state: &RecordState,
    ) -> Result<(), ReflectError> {
        match state.table().get(field.pos()) {
            Some(accessor) => accessor.set(record, value),
            None => self
                .inner
                .reflect
                .set_field(record, field, value, state.reflect()),
        }
    }

    /// Creates a writer for records written through `schema`.
    #[inline]
    pub fn create_writer(&self, schema: Arc<RecordSchema>) -> BravoWriter {
        BravoWriter::new(self.clone(), schema)
    }

    /// Creates a reader decoding records written through `schema`.
    #[inline]
    pub fn create_reader(&self, schema: Arc<RecordSchema>) -> BravoReader {
        BravoReader::new(self.clone(), schema)
    }

    /// The cache of record states, shared by every clone.
    #[inline]
    pub fn cache(&self) -> &StateCache<RecordState> {
        &self.inner.cache
    }

    /// The default reflective data model behind non-overridden fields.
    #[inline]
    pub fn reflect(&self) -> &ReflectData {
        &self.inner.reflect
    }
}

impl RecordData for BravoData {
    type State = Arc<RecordState>;

    #[inline]
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Arc<RecordState>, ReflectError> {
        BravoData::record_state(self, record, schema)
    }

    #[inline]
    fn get_field<'r>(
        &self,
        record: &'r dyn Record,
        field: &Field,
        state: &Arc<RecordState>,
    ) -> Result<Value<'r>, ReflectError> {
        self.read_field(record, field, state)
    }

    #[inline]
    fn set_field(
        &self,
        record: &mut dyn Record,
        field: &Field,
        value: Value<'_>,
        state: &Arc<RecordState>,
    ) -> Result<(), ReflectError> {
        self.write_field(record, field, value, state)
    }

    fn nested_record_mut<'r>(
        &self,
        record: &'r mut dyn Record,
        field: &Field,
        state: &Arc<RecordState>,
    ) -> Option<&'r mut dyn Record> {
        if state.table().is_overridden(field.pos()) {
            return None;
        }
        self.inner
            .reflect
            .nested_record_mut(record, field, state.reflect())
    }
}

impl fmt::Debug for BravoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BravoData")
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BravoDataBuilder

/// Configures a [`BravoData`].
///
/// A resolver is mandatory: [`build`](Self::build) fails without one.
#[derive(Default)]
pub struct BravoDataBuilder {
    resolver: Option<Box<dyn OverrideResolver>>,
}

impl BravoDataBuilder {
    #[inline]
    pub const fn new() -> Self {
        Self { resolver: None }
    }

    /// Sets the override resolver, replacing any previous one.
    pub fn resolver(mut self, resolver: impl OverrideResolver) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn build(self) -> Result<BravoData, BuildError> {
        let resolver = self.resolver.ok_or(BuildError::MissingResolver)?;
        Ok(BravoData::from_boxed(resolver))
    }
}

impl fmt::Debug for BravoDataBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BravoDataBuilder")
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use bravo_reflect::{FieldValue, RecordData, ReflectData, ReflectError, Value, impl_record};
    use bravo_schema::RecordSchema;

    use crate::accessor::{read_only, read_write};
    use crate::{BravoData, BuildError, FieldOverrides, NoOverrides};

    #[derive(Default)]
    struct Student {
        name: String,
        math: i32,
    }

    impl_record!(Student { name, math });

    fn schema() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::builder("Student")
                .required_long("serializationTime")
                .required_string("name")
                .required_int("math")
                .build()
                .unwrap(),
        )
    }

    fn student() -> Student {
        Student {
            name: String::from("dancer"),
            math: 35,
        }
    }

    #[test]
    fn builder_requires_a_resolver() {
        let err = BravoData::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingResolver);
        assert!(BravoData::builder().resolver(NoOverrides).build().is_ok());
    }

    #[test]
    fn states_are_cached_per_type_and_schema() {
        let data = BravoData::new(NoOverrides);
        let first = data.record_state(&student(), &schema()).unwrap();
        let second = data.record_state(&Student::default(), &schema()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(data.cache().builds(), 1);
        assert_eq!(first.table().len(), 3);

        // Clones share the cache.
        let clone = data.clone();
        let third = clone.record_state(&student(), &schema()).unwrap();
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn absent_fields_read_as_null() {
        let data = BravoData::new(NoOverrides);
        let schema = schema();
        let record = student();
        let field = schema.field("serializationTime").unwrap();

        let state = data.record_state(&record, &schema).unwrap();
        assert_eq!(data.read_field(&record, field, &state), Ok(Value::Null));

        let reflect = ReflectData.record_state(&record, &schema).unwrap();
        let err = ReflectData.get_field(&record, field, &reflect).unwrap_err();
        assert!(err.is_missing_field());
    }

    #[test]
    fn absent_fields_still_fail_on_write() {
        let data = BravoData::new(NoOverrides);
        let schema = schema();
        let mut record = student();
        let field = schema.field("serializationTime").unwrap();
        let state = data.record_state(&record, &schema).unwrap();

        let err = data
            .write_field(&mut record, field, Value::Long(1), &state)
            .unwrap_err();
        assert!(err.is_missing_field());
    }

    #[test]
    fn overrides_replace_the_reflective_path() {
        let data = BravoData::with_overrides(
            FieldOverrides::new()
                .name("serializationTime", read_only(|_: &Student| Value::Long(7)))
                .name(
                    "math",
                    read_write(
                        |s: &Student| Value::Int(s.math * 2),
                        |s: &mut Student, value| {
                            s.math = i32::from_value(value)? / 2;
                            Ok(())
                        },
                    ),
                ),
        );
        let schema = schema();
        let mut record = student();
        let state = data.record_state(&record, &schema).unwrap();
        let time = schema.field("serializationTime").unwrap();
        let math = schema.field("math").unwrap();

        assert_eq!(data.read_field(&record, time, &state), Ok(Value::Long(7)));
        assert_eq!(data.read_field(&record, math, &state), Ok(Value::Int(70)));

        // A read-only override swallows the write the reflective path would reject.
        assert_eq!(data.write_field(&mut record, time, Value::Long(1), &state), Ok(()));
        data.write_field(&mut record, math, Value::Int(80), &state)
            .unwrap();
        assert_eq!(record.math, 40);
    }

    #[test]
    fn mismatched_accessors_propagate() {
        #[derive(Default)]
        struct Other {
            name: String,
        }
        impl_record!(Other { name });

        let data = BravoData::with_overrides(
            FieldOverrides::new().name("math", read_only(|o: &Other| Value::from(o.name.as_str()))),
        );
        let schema = schema();
        let record = student();
        let state = data.record_state(&record, &schema).unwrap();
        let math = schema.field("math").unwrap();

        let err = data.read_field(&record, math, &state).unwrap_err();
        assert!(matches!(err, ReflectError::MismatchedRecord { .. }), "{err}");
    }
}
