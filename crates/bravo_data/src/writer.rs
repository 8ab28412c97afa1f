use alloc::sync::Arc;

use bravo_reflect::Record;
use bravo_reflect::ReflectError;
use bravo_reflect::ser::{DatumWrite, RecordSerializer, make_custom_error, write_field_value};
use bravo_schema::{Field, RecordSchema};
use serde_core::ser::{Serialize, SerializeMap, Serializer};

use crate::{BravoData, RecordState};

/// Writes records through a [`BravoData`], applying its overrides.
///
/// Each field value comes from the field's override if there is one, from
/// reflection otherwise, and is then written according to the field schema.
/// Nested records go through this writer again with their own record state,
/// so overrides apply at every depth.
#[derive(Debug, Clone)]
pub struct BravoWriter {
    data: BravoData,
    schema: Arc<RecordSchema>,
}

impl BravoWriter {
    #[inline]
    pub fn new(data: BravoData, schema: Arc<RecordSchema>) -> Self {
        Self { data, schema }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    #[inline]
    pub fn data(&self) -> &BravoData {
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

impl DatumWrite for BravoWriter {
    type State = Arc<RecordState>;

    #[inline]
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Arc<RecordState>, ReflectError> {
        self.data.record_state(record, schema)
    }

    fn write_field<M: SerializeMap>(
        &self,
        record: &dyn Record,
        field: &Field,
        state: &Arc<RecordState>,
        map: &mut M,
    ) -> Result<(), M::Error> {
        match self.data.read_field(record, field, state) {
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

    use bravo_reflect::{Value, impl_record};
    use bravo_schema::RecordSchema;

    use crate::accessor::{constant, read_only};
    use crate::{BravoData, FieldOverrides, NoOverrides};

    #[derive(Default)]
    struct Scores {
        math: i32,
        java: i32,
    }

    impl_record!(Scores { math as "mathScore", java as "javaScore" });

    #[derive(Default)]
    struct Student {
        name: String,
        scores: Scores,
    }

    impl_record!(Student { name, scores });

    fn schema() -> Arc<RecordSchema> {
        let scores = RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_int("javaScore")
            .required_int("total")
            .build()
            .unwrap();
        Arc::new(
            RecordSchema::builder("Student")
                .required_string("name")
                .record("scores", scores)
                .build()
                .unwrap(),
        )
    }

    fn student() -> Student {
        Student {
            name: String::from("dancer"),
            scores: Scores { math: 35, java: 30 },
        }
    }

    #[test]
    fn nested_records_use_their_own_overrides() {
        let data = BravoData::with_overrides(FieldOverrides::new().in_schema(
            "Scores",
            "total",
            read_only(|s: &Scores| Value::Int(s.math + s.java)),
        ));
        let writer = data.create_writer(schema());

        let json = serde_json::to_string(&writer.serializable(&student())).unwrap();
        assert_eq!(
            json,
            r#"{"name":"dancer","scores":{"mathScore":35,"javaScore":30,"total":65}}"#
        );
        assert_eq!(data.cache().len(), 2);
    }

    #[test]
    fn absent_fields_are_written_as_null_when_allowed() {
        let schema = Arc::new(
            RecordSchema::builder("Student")
                .required_string("name")
                .optional_long("serializationTime")
                .build()
                .unwrap(),
        );
        let writer = BravoData::new(NoOverrides).create_writer(schema);
        let json = serde_json::to_string(&writer.serializable(&student())).unwrap();
        assert_eq!(json, r#"{"name":"dancer","serializationTime":null}"#);
    }

    #[test]
    fn non_conformant_overrides_fail_while_writing() {
        let data = BravoData::with_overrides(FieldOverrides::new().name("name", constant(1)));
        let writer = data.create_writer(schema());
        let err = serde_json::to_string(&writer.serializable(&student())).unwrap_err();
        assert!(err.to_string().contains("cannot write a `int` value as string"), "{err}");
    }

    #[test]
    fn writes_ron() {
        let data = BravoData::with_overrides(
            FieldOverrides::new().in_schema("Scores", "total", constant(0)),
        );
        let out = ron::to_string(&data.create_writer(schema()).serializable(&student())).unwrap();
        assert!(out.contains("\"total\""), "{out}");
        assert!(!out.contains("65"), "{out}");
    }
}
