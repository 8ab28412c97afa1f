use core::fmt;

use bravo_schema::{Field, RecordSchema};
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, Visitor};

/// Resolves a map key to a field of a record schema.
///
/// Unknown keys resolve to `None`, so the caller can skip their value.
#[derive(Clone, Copy)]
pub(super) struct FieldKeySeed<'a> {
    schema: &'a RecordSchema,
}

impl<'a> FieldKeySeed<'a> {
    #[inline]
    pub const fn new(schema: &'a RecordSchema) -> Self {
        Self { schema }
    }
}

impl<'a, 'de> DeserializeSeed<'de> for FieldKeySeed<'a> {
    type Value = Option<&'a Field>;

    #[inline]
    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_str(self)
    }
}

impl<'a, 'de> Visitor<'de> for FieldKeySeed<'a> {
    type Value = Option<&'a Field>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a field name of record `{}`", self.schema.name())
    }

    #[inline]
    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(self.schema.field(v))
    }
}
