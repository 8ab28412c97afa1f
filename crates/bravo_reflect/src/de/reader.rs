use alloc::sync::Arc;

use bravo_schema::{Field, RecordSchema, Schema};
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, MapAccess};

use super::{RecordSeed, ValueSeed};

use crate::{Record, RecordData, ReflectData, ReflectError, Value};

// -----------------------------------------------------------------------------
// DatumRead

/// The per-record hook of a datum reader.
///
/// The mirror of [`DatumWrite`](crate::ser::DatumWrite): [`RecordSeed`]
/// prepares the state of each record it decodes into, then calls
/// [`read_field`](DatumRead::read_field) for every known key, with the map
/// positioned on the value.
pub trait DatumRead {
    type State;

    /// Prepares the state used to decode into `record` through `schema`.
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Self::State, ReflectError>;

    /// Consumes the value of `field` from `map` and stores it in `record`.
    fn read_field<'de, A: MapAccess<'de>>(
        &self,
        record: &mut dyn Record,
        field: &Field,
        state: &Self::State,
        map: &mut A,
    ) -> Result<(), A::Error>;
}

/// The default per-field read: decodes the next map value according to the
/// field schema.
#[inline]
pub fn read_field_value<'de, A: MapAccess<'de>>(
    field: &Field,
    map: &mut A,
) -> Result<Value<'static>, A::Error> {
    map.next_value_seed(ValueSeed::new(field.schema()))
}

// -----------------------------------------------------------------------------
// ReflectDatumReader

/// The default reader: every field is stored through a [`RecordData`].
///
/// A nested record field is decoded in place when the in-memory record
/// exposes it, so nested fields absent from the input keep their value.
///
/// # Examples
///
/// ```
/// use bravo_reflect::impl_record;
/// use bravo_reflect::de::ReflectDatumReader;
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
/// let schema = Arc::new(
///     RecordSchema::builder("Scores")
///         .required_int("mathScore")
///         .required_int("javaScore")
///         .build()
///         .unwrap(),
/// );
/// let reader = ReflectDatumReader::new(schema);
///
/// let mut scores = Scores { math: 0, java: 30 };
/// let mut de = serde_json::Deserializer::from_str(r#"{"mathScore":35}"#);
/// reader.read_into(&mut scores, &mut de).unwrap();
/// assert_eq!((scores.math, scores.java), (35, 30));
/// ```
#[derive(Debug, Clone)]
pub struct ReflectDatumReader<D = ReflectData> {
    data: D,
    schema: Arc<RecordSchema>,
}

impl ReflectDatumReader<ReflectData> {
    #[inline]
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Self::with_data(ReflectData, schema)
    }
}

impl<D: RecordData> ReflectDatumReader<D> {
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

    /// Decodes a record map from `deserializer` into `record`.
    pub fn read_into<'de, De: Deserializer<'de>>(
        &self,
        record: &mut dyn Record,
        deserializer: De,
    ) -> Result<(), De::Error> {
        RecordSeed::new(record, &self.schema, self).deserialize(deserializer)
    }
}

impl<D: RecordData> DatumRead for ReflectDatumReader<D> {
    type State = D::State;

    #[inline]
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<D::State, ReflectError> {
        self.data.record_state(record, schema)
    }

    fn read_field<'de, A: MapAccess<'de>>(
        &self,
        record: &mut dyn Record,
        field: &Field,
        state: &D::State,
        map: &mut A,
    ) -> Result<(), A::Error> {
        if let Schema::Record(nested_schema) = field.schema() {
            if let Some(nested) = self.data.nested_record_mut(record, field, state) {
                return map.next_value_seed(RecordSeed::new(nested, nested_schema, self));
            }
        }

        let value = read_field_value(field, map)?;
        self.data
            .set_field(record, field, value, state)
            .map_err(Error::custom)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use bravo_schema::{RecordSchema, Schema};

    use super::ReflectDatumReader;
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

    fn reader() -> ReflectDatumReader {
        let scores = RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_int("javaScore")
            .build()
            .unwrap();
        let schema = RecordSchema::builder("Student")
            .required_string("name")
            .record("scores", scores)
            .field("tags", Schema::array(Schema::String))
            .optional_string("nick")
            .build()
            .unwrap();
        ReflectDatumReader::new(Arc::new(schema))
    }

    #[test]
    fn decodes_into_an_existing_record() {
        let mut student = Student::default();
        student.scores.java_score = 30;
        let json = r#"{"name":"dancer","scores":{"mathScore":35},"tags":["a","b"],"nick":null,"other":1}"#;

        let mut de = serde_json::Deserializer::from_str(json);
        reader().read_into(&mut student, &mut de).unwrap();

        assert_eq!(student.name, "dancer");
        assert_eq!(student.scores.math_score, 35);
        assert_eq!(student.scores.java_score, 30);
        assert_eq!(student.tags, ["a", "b"]);
        assert_eq!(student.nick, None);
    }

    #[test]
    fn reads_ron() {
        let mut student = Student::default();
        let input = r#"{"nick": Some("dd"), "scores": {"javaScore": 30}}"#;
        let mut de = ron::Deserializer::from_str(input).unwrap();
        reader().read_into(&mut student, &mut de).unwrap();
        assert_eq!(student.nick.as_deref(), Some("dd"));
        assert_eq!(student.scores.java_score, 30);
    }

    #[test]
    fn rejects_values_of_the_wrong_kind() {
        let mut student = Student::default();
        let mut de = serde_json::Deserializer::from_str(r#"{"name":1}"#);
        let err = reader().read_into(&mut student, &mut de).unwrap_err();
        assert!(err.to_string().contains("expected a value matching string"), "{err}");
    }

    #[test]
    fn missing_fields_fail() {
        #[derive(Default)]
        struct Bare {
            name: String,
        }
        impl_record!(Bare { name });

        let mut bare = Bare::default();
        let mut de = serde_json::Deserializer::from_str(r#"{"name":"dancer","nick":"dd"}"#);
        let err = reader().read_into(&mut bare, &mut de).unwrap_err();
        assert!(err.to_string().contains("no field named `nick`"), "{err}");
        assert_eq!(bare.name, "dancer");
    }
}
