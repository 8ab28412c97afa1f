use alloc::sync::Arc;

use bravo_schema::RecordSchema;
use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};

use super::DatumWrite;
use super::error_utils::make_custom_error;

crate::cfg::debug! {
    use super::error_utils::SCHEMA_STACK;
}

use crate::Record;

/// Writes an in-memory record as a map, one entry per schema field.
///
/// The record state is prepared through the [`DatumWrite`] hook first, then
/// every field is handed to [`DatumWrite::write_field`] in position order.
pub struct RecordSerializer<'a, W: ?Sized> {
    record: &'a dyn Record,
    schema: &'a Arc<RecordSchema>,
    writer: &'a W,
}

impl<'a, W: DatumWrite + ?Sized> RecordSerializer<'a, W> {
    #[inline]
    pub const fn new(record: &'a dyn Record, schema: &'a Arc<RecordSchema>, writer: &'a W) -> Self {
        Self {
            record,
            schema,
            writer,
        }
    }
}

impl<W: DatumWrite + ?Sized> Serialize for RecordSerializer<'_, W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::cfg::debug! {
            SCHEMA_STACK.with_borrow_mut(|stack| stack.push(Arc::clone(self.schema)));
        }

        let output = self.serialize_fields(serializer);

        crate::cfg::debug! {
            SCHEMA_STACK.with_borrow_mut(|stack| stack.pop());
        }

        output
    }
}

impl<W: DatumWrite + ?Sized> RecordSerializer<'_, W> {
    fn serialize_fields<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let state = match self.writer.record_state(self.record, self.schema) {
            Ok(state) => state,
            Err(err) => return Err(make_custom_error(err)),
        };

        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for field in self.schema.fields() {
            self.writer.write_field(self.record, field, &state, &mut map)?;
        }
        map.end()
    }
}
