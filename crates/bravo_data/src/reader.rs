use alloc::sync::Arc;

use bravo_reflect::de::{DatumRead, RecordSeed, read_field_value};
use bravo_reflect::{Record, RecordData, ReflectError};
use bravo_schema::{Field, RecordSchema, Schema};
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, MapAccess};

use crate::{BravoData, RecordState};

/// Decodes records into existing instances through a [`BravoData`].
///
/// A decoded value is handed to the field's override if there is one, so a
/// read-only override silently drops it. Otherwise a nested record field is
/// decoded in place with its own record state, and any other field is stored
/// reflectively. Unknown keys are skipped and fields absent from the input
/// keep their value.
#[derive(Debug, Clone)]
pub struct BravoReader {
    data: BravoData,
    schema: Arc<RecordSchema>,
}

impl BravoReader {
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

    /// Decodes a record map from `deserializer` into `record`.
    pub fn read_into<'de, D: Deserializer<'de>>(
        &self,
        record: &mut dyn Record,
        deserializer: D,
    ) -> Result<(), D::Error> {
        RecordSeed::new(record, &self.schema, self).deserialize(deserializer)
    }
}

impl DatumRead for BravoReader {
    type State = Arc<RecordState>;

    #[inline]
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Arc<RecordState>, ReflectError> {
        self.data.record_state(record, schema)
    }

    fn read_field<'de, A: MapAccess<'de>>(
        &self,
        record: &mut dyn Record,
        field: &Field,
        state: &Arc<RecordState>,
        map: &mut A,
    ) -> Result<(), A::Error> {
        if let Some(accessor) = state.table().get(field.pos()) {
            let value = read_field_value(field, map)?;
            return accessor.set(record, value).map_err(Error::custom);
        }

        if let Schema::Record(nested_schema) = field.schema() {
            if let Some(nested) = self.data.nested_record_mut(record, field, state) {
                return map.next_value_seed(RecordSeed::new(nested, nested_schema, self));
            }
        }

        let value = read_field_value(field, map)?;
        self.data
            .write_field(record, field, value, state)
            .map_err(Error::custom)
    }
}

// -----------------------------------------------------------------------------
// Tests
