use alloc::sync::Arc;

use bravo_schema::{Field, RecordSchema};
use serde_core::Serializer;
use serde_core::Serialize;
use serde_core::ser::SerializeMap;

use super::error_utils::make_custom_error;
use super::{DatumSerializer, RecordSerializer};

use crate::{Record, RecordData, ReflectData, ReflectError, Value};

// -----------------------------------------------------------------------------
// DatumWrite

/// The per-record hook of a datum writer.
///
/// [`RecordSerializer`] calls [`record_state`](DatumWrite::record_state)
/// once per record it writes, nested records included, then
/// [`write_field`](DatumWrite::write_field) for every schema field in
/// position order. An implementation reads the field value however it likes
/// and usually finishes with [`write_field_value`].
pub trait DatumWrite {
    type State;

    /// Prepares the state used to write `record` through `schema`.
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Self::State, ReflectError>;

    /// Writes one map entry for `field`.
    fn write_field<M: SerializeMap>(
        &self,
        record: &dyn Record,
        field: &Field,
        state: &Self::State,
        map: &mut M,
    ) -> Result<(), M::Error>;
}

/// The default per-field write: one entry named after the field, the value
/// written according to the field schema.
#[inline]
pub fn write_field_value<W: DatumWrite + ?Sized, M: SerializeMap>(
    writer: &W,
    field: &Field,
    value: &Value<'_>,
    map: &mut M,
) -> Result<(), M::Error> {
    map.serialize_entry(field.name(), &DatumSerializer::new(value, field.schema(), writer))
}

// -----------------------------------------------------------------------------
// ReflectDatumWriter

/// The default writer: every field is read through a [`RecordData`].
///
/// # Examples
///
/// ```
/// use bravo_reflect::impl_record;
/// use bravo_reflect::ser::ReflectDatumWriter;
/// use bravo_schema::{RecordSchema, Schema};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Student {
///     name: String,
///     nick: Option<String>,
/// }
///
/// impl_record!(Student { name, nick });
///
/// let schema = Arc::new(
///     RecordSchema::builder("Student")
///         .required_string("name")
///         .optional_string("nick")
///         .build()
///         .unwrap(),
/// );
/// let writer = ReflectDatumWriter::new(schema);
///
/// let student = Student { name: "dancer".into(), nick: None };
/// let json = serde_json::to_string(&writer.serializable(&student)).unwrap();
/// assert_eq!(json, r#"{"name":"dancer","nick":null}"#);
/// ```
#[derive(Debug, Clone)]
pub struct ReflectDatumWriter<D = ReflectData> {
    data: D,
    schema: Arc<RecordSchema>,
}

impl ReflectDatumWriter<ReflectData> {
    #[inline]
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Self::with_data(ReflectData, schema)
    }
}

impl<D: RecordData> ReflectDatumWriter<D> {
    #[inline]
    pub fn with_data(data: D, schema: Arc<RecordSchema>) -> Self {
        Self { data, schema }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    #[inline]
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Writes `record` to `serializer`.
    pub fn write<S: Serializer>(&self, record: &dyn Record, serializer: S) -> Result<S::Ok, S::Error> {
        self.serializable(record).serialize(serializer)
    }

    /// Returns a [`Serialize`] adaptor writing `record`.
    #[inline]
    pub fn serializable<'a>(&'a self, record: &'a dyn Record) -> RecordSerializer<'a, Self> {
        RecordSerializer::new(record, &self.schema, self)
    }
}

impl<D: RecordData> DatumWrite for ReflectDatumWriter<D> {
    type State = D::State;

    #[inline]
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<D::State, ReflectError> {
        self.data.record_state(record, schema)
    }

    fn write_field<M: SerializeMap>(
        &self,
        record: &dyn Record,
        field: &Field,
        state: &D::State,
        map: &mut M,
    ) -> Result<(), M::Error> {
        match self.data.get_field(record, field, state) {
            Ok(value) => write_field_value(self, field, &value, map),
            Err(err) => Err(make_custom_error(err)),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use bravo_schema::{RecordSchema, Schema};

    use super::ReflectDatumWriter;
    use crate::impl_record;

    #[derive(Default)]
    struct Scores {
        math_score: i32,
        java_score: i32,
    }

    impl_record!(Scores {
        math_score as "mathScore",
        java_score as "javaScore",
    });

    #[derive(Default)]
    struct Student {
        name: String,
        scores: Scores,
        tags: Vec<String>,
        nick: Option<String>,
    }

    impl_record!(Student { name, scores, tags, nick });

    fn scores_schema() -> RecordSchema {
        RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_int("javaScore")
            .build()
            .unwrap()
    }

    fn student() -> Student {
        Student {
            name: String::from("dancer"),
            scores: Scores {
                math_score: 35,
                java_score: 30,
            },
            tags: vec![String::from("a")],
            nick: Some(String::from("dd")),
        }
    }

    #[test]
    fn writes_nested_records() {
        let schema = RecordSchema::builder("Student")
            .required_string("name")
            .record("scores", scores_schema())
            .field("tags", Schema::array(Schema::String))
            .optional_string("nick")
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));

        let json = serde_json::to_string(&writer.serializable(&student())).unwrap();
        assert_eq!(
            json,
            r#"{"name":"dancer","scores":{"mathScore":35,"javaScore":30},"tags":["a"],"nick":"dd"}"#
        );
    }

    #[test]
    fn promotes_numbers_to_the_schema_type() {
        let schema = RecordSchema::builder("Scores")
            .required_long("mathScore")
            .required_double("javaScore")
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));
        let scores = Scores {
            math_score: 35,
            java_score: 30,
        };
        let json = serde_json::to_string(&writer.serializable(&scores)).unwrap();
        assert_eq!(json, r#"{"mathScore":35,"javaScore":30.0}"#);
    }

    #[test]
    fn nullable_fields_are_options() {
        let schema = RecordSchema::builder("Student")
            .optional_string("nick")
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));
        let out = ron::to_string(&writer.serializable(&student())).unwrap();
        assert!(out.contains("Some(\"dd\")"), "{out}");
    }

    #[test]
    fn missing_fields_fail() {
        let schema = RecordSchema::builder("Student")
            .required_string("name")
            .required_long("serializationTime")
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));
        let err = serde_json::to_string(&writer.serializable(&student())).unwrap_err();
        assert!(err.to_string().contains("no field named `serializationTime`"), "{err}");
    }

    #[test]
    fn kind_mismatch_fails() {
        let schema = RecordSchema::builder("Student")
            .required_int("name")
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));
        let err = serde_json::to_string(&writer.serializable(&student())).unwrap_err();
        assert!(err.to_string().contains("cannot write a `string` value as int"), "{err}");
    }

    #[test]
    fn longs_are_never_narrowed_to_ints() {
        #[derive(Default)]
        struct Clock {
            millis: i64,
        }

        impl_record!(Clock { millis });

        let schema = RecordSchema::builder("Clock")
            .required_int("millis")
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));
        let err = serde_json::to_string(&writer.serializable(&Clock { millis: 7 })).unwrap_err();
        assert!(err.to_string().contains("cannot write a `long` value as int"), "{err}");
    }

    #[cfg(all(feature = "std", feature = "debug", debug_assertions))]
    #[test]
    fn errors_carry_the_schema_stack() {
        let scores = RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_int("total")
            .build()
            .unwrap();
        let schema = RecordSchema::builder("Student")
            .record("scores", scores)
            .build()
            .unwrap();
        let writer = ReflectDatumWriter::new(Arc::new(schema));
        let err = serde_json::to_string(&writer.serializable(&student())).unwrap_err();
        assert!(err.to_string().contains("`Student` -> `Scores`"), "{err}");
    }
}
