use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use bravo_schema::Schema;
use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, IgnoredAny, MapAccess, SeqAccess, Unexpected, Visitor};

use super::field_key::FieldKeySeed;

use crate::Value;
use crate::ser::resolve_union;

// -----------------------------------------------------------------------------
// ValueSeed

/// Decodes an owned [`Value`] according to a [`Schema`].
///
/// The schema decides which `deserialize_*` hint is given, so self-describing
/// and non-self-describing formats both work, and decoded numbers are
/// converted to the schema type. A nullable union is read as an option; any
/// other union is read with `deserialize_any` and the decoded value picks the
/// branch. A record becomes a [`Value::Fields`] in input order, with unknown
/// keys skipped.
///
/// # Examples
///
/// ```
/// use bravo_reflect::Value;
/// use bravo_reflect::de::ValueSeed;
/// use bravo_schema::Schema;
/// use serde_core::de::DeserializeSeed;
///
/// let schema = Schema::nullable(Schema::Long);
/// let mut de = serde_json::Deserializer::from_str("35");
/// let value = ValueSeed::new(&schema).deserialize(&mut de).unwrap();
/// assert_eq!(value, Value::Long(35));
/// ```
#[derive(Clone, Copy)]
pub struct ValueSeed<'a> {
    schema: &'a Schema,
}

impl<'a> ValueSeed<'a> {
    #[inline]
    pub const fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = Value<'static>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let visitor = ValueVisitor {
            schema: self.schema,
        };
        match self.schema {
            Schema::Null => deserializer.deserialize_unit(visitor),
            Schema::Boolean => deserializer.deserialize_bool(visitor),
            Schema::Int => deserializer.deserialize_i32(visitor),
            Schema::Long => deserializer.deserialize_i64(visitor),
            Schema::Float => deserializer.deserialize_f32(visitor),
            Schema::Double => deserializer.deserialize_f64(visitor),
            Schema::Bytes => deserializer.deserialize_byte_buf(visitor),
            Schema::String => deserializer.deserialize_string(visitor),
            Schema::Array(_) => deserializer.deserialize_seq(visitor),
            Schema::Map(_) | Schema::Record(_) => deserializer.deserialize_map(visitor),
            Schema::Union(_) if self.schema.non_null_branch().is_some() => {
                deserializer.deserialize_option(visitor)
            }
            Schema::Union(_) => deserializer.deserialize_any(visitor),
        }
    }
}

// -----------------------------------------------------------------------------
// ValueVisitor

struct ValueVisitor<'a> {
    schema: &'a Schema,
}

impl ValueVisitor<'_> {
    /// Converts a decoded scalar to the schema type.
    fn accept<E: Error>(&self, value: Value<'static>) -> Result<Value<'static>, E> {
        let kind = value.kind();
        conform(value, self.schema).ok_or_else(|| {
            E::custom(format_args!("cannot read a `{kind}` value as {}", self.schema))
        })
    }

    /// The schema a compound value is decoded with, looking through unions.
    fn target(&self, accepts: fn(&Schema) -> bool) -> Option<&Schema> {
        match self.schema {
            Schema::Union(branches) => branches.iter().find(|branch| accepts(branch)),
            other => Some(other).filter(|schema| accepts(schema)),
        }
    }
}

impl<'de> Visitor<'de> for ValueVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a value matching {}", self.schema)
    }

    fn visit_bool<E: Error>(self, v: bool) -> Result<Self::Value, E> {
        self.accept(Value::Boolean(v))
    }

    fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
        match i32::try_from(v) {
            Ok(v) => self.accept(Value::Int(v)),
            Err(_) => self.accept(Value::Long(v)),
        }
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(v) => self.visit_i64(v),
            Err(_) => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_f64<E: Error>(self, v: f64) -> Result<Self::Value, E> {
        self.accept(Value::Double(v))
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        self.accept(Value::String(Cow::Owned(String::from(v))))
    }

    fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
        self.accept(Value::String(Cow::Owned(v)))
    }

    fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        self.accept(Value::Bytes(Cow::Owned(Vec::from(v))))
    }

    fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        self.accept(Value::Bytes(Cow::Owned(v)))
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        self.accept(Value::Null)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        self.accept(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let inner = self.schema.non_null_branch().unwrap_or(self.schema);
        ValueSeed::new(inner).deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        match self.target(|s| matches!(s, Schema::Array(_) | Schema::Bytes)) {
            Some(Schema::Array(items)) => {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element_seed(ValueSeed::new(items))? {
                    values.push(value);
                }
                Ok(Value::Array(values))
            }
            // Formats without a byte type write bytes as a sequence.
            Some(Schema::Bytes) => {
                let mut bytes = Vec::new();
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                Ok(Value::Bytes(Cow::Owned(bytes)))
            }
            _ => Err(Error::invalid_type(Unexpected::Seq, &self)),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        match self.target(|s| matches!(s, Schema::Map(_) | Schema::Record(_))) {
            Some(Schema::Map(values)) => {
                let mut entries = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    let value = map.next_value_seed(ValueSeed::new(values))?;
                    entries.push((Cow::Owned(key), value));
                }
                Ok(Value::Map(entries))
            }
            Some(Schema::Record(schema)) => {
                let mut fields = Vec::with_capacity(schema.len());
                while let Some(field) = map.next_key_seed(FieldKeySeed::new(schema))? {
                    match field {
                        Some(field) => {
                            let value = map.next_value_seed(ValueSeed::new(field.schema()))?;
                            fields.push((Cow::Owned(String::from(field.name())), value));
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(Value::Fields(fields))
            }
            _ => Err(Error::invalid_type(Unexpected::Map, &self)),
        }
    }
}

// -----------------------------------------------------------------------------
// conform

/// Converts a decoded scalar to `schema`, or `None` if it does not fit.
fn conform(value: Value<'static>, schema: &Schema) -> Option<Value<'static>> {
    Some(match (schema, value) {
        (Schema::Null, Value::Null) => Value::Null,
        (Schema::Boolean, v @ Value::Boolean(_)) => v,
        (Schema::Int, Value::Int(v)) => Value::Int(v),
        (Schema::Int, Value::Long(v)) => Value::Int(i32::try_from(v).ok()?),
        (Schema::Long, Value::Int(v)) => Value::Long(i64::from(v)),
        (Schema::Long, v @ Value::Long(_)) => v,
        (Schema::Float, v @ (Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_))) => {
            Value::Float(v.as_f64()? as f32)
        }
        (Schema::Double, v @ (Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_))) => {
            Value::Double(v.as_f64()?)
        }
        (Schema::Bytes, v @ Value::Bytes(_)) => v,
        (Schema::String, v @ Value::String(_)) => v,
        (Schema::Union(branches), v) => {
            let branch = resolve_union(branches, &v)
                .or_else(|| branches.iter().find(|b| conform(v.clone(), b).is_some()))?;
            return conform(v, branch);
        }
        _ => return None,
    })
}

// -----------------------------------------------------------------------------
// Tests
