use alloc::sync::Arc;
use core::fmt;

use bravo_schema::RecordSchema;
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, IgnoredAny, MapAccess, Visitor};

use super::DatumRead;
use super::field_key::FieldKeySeed;

use crate::Record;

/// Decodes a record map into an existing record.
///
/// The record state is prepared through the [`DatumRead`] hook, then each
/// key naming a schema field is handed to [`DatumRead::read_field`]. Unknown
/// keys are skipped; fields missing from the input keep their value.
pub struct RecordSeed<'a, R: ?Sized> {
    record: &'a mut dyn Record,
    schema: &'a Arc<RecordSchema>,
    reader: &'a R,
}

impl<'a, R: DatumRead + ?Sized> RecordSeed<'a, R> {
    #[inline]
    pub fn new(record: &'a mut dyn Record, schema: &'a Arc<RecordSchema>, reader: &'a R) -> Self {
        Self {
            record,
            schema,
            reader,
        }
    }
}

impl<'de, R: DatumRead + ?Sized> DeserializeSeed<'de> for RecordSeed<'_, R> {
    type Value = ();

    #[inline]
    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, R: DatumRead + ?Sized> Visitor<'de> for RecordSeed<'_, R> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a map of record `{}`", self.schema.name())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let Self {
            record,
            schema,
            reader,
        } = self;

        let state = match reader.record_state(record, schema) {
            Ok(state) => state,
            Err(err) => return Err(Error::custom(err)),
        };

        while let Some(field) = map.next_key_seed(FieldKeySeed::new(schema))? {
            match field {
                Some(field) => reader.read_field(record, field, &state, &mut map)?,
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(())
    }
}
