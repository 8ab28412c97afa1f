use alloc::borrow::Cow;
use alloc::format;
use alloc::sync::Arc;

use bravo_schema::{RecordSchema, Schema};
use serde_core::ser::{SerializeMap, SerializeSeq};
use serde_core::{Serialize, Serializer};

use super::error_utils::make_custom_error;
use super::{DatumWrite, RecordSerializer, write_field_value};

use crate::Value;

// -----------------------------------------------------------------------------
// DatumSerializer

/// Writes a [`Value`] according to a [`Schema`].
///
/// # Serialization Rules
///
/// - Primitives must match the schema kind, with numeric promotion
///   `int -> long -> float -> double`. A `long` is written as an `int` only
///   when it fits.
/// - A nullable union `[null, T]` is written as an option.
/// - Any other union resolves its branch against the value: an exact kind
///   match first, then the first branch the value promotes to. The branch is
///   written without a tag.
/// - A nested [`Value::Record`] re-enters the writer hook with its own record
///   state; [`Value::Fields`] is written field by field in schema order, and
///   schema fields it does not mention are written as null.
///
/// Anything else is an error naming the value kind and the schema.
pub struct DatumSerializer<'a, W: ?Sized> {
    value: &'a Value<'a>,
    schema: &'a Schema,
    writer: &'a W,
}

impl<'a, W: DatumWrite + ?Sized> DatumSerializer<'a, W> {
    #[inline]
    pub const fn new(value: &'a Value<'a>, schema: &'a Schema, writer: &'a W) -> Self {
        Self {
            value,
            schema,
            writer,
        }
    }
}

impl<W: DatumWrite + ?Sized> Serialize for DatumSerializer<'_, W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Self {
            value,
            schema,
            writer,
        } = *self;

        match (schema, value) {
            (Schema::Null, Value::Null) => serializer.serialize_unit(),
            (Schema::Boolean, Value::Boolean(v)) => serializer.serialize_bool(*v),
            (Schema::Int, Value::Int(v)) => serializer.serialize_i32(*v),
            (Schema::Long, Value::Int(v)) => serializer.serialize_i64(i64::from(*v)),
            (Schema::Long, Value::Long(v)) => serializer.serialize_i64(*v),
            (Schema::Float, Value::Int(v)) => serializer.serialize_f32(*v as f32),
            (Schema::Float, Value::Long(v)) => serializer.serialize_f32(*v as f32),
            (Schema::Float, Value::Float(v)) => serializer.serialize_f32(*v),
            (Schema::Double, Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_)) => {
                match value.as_f64() {
                    Some(v) => serializer.serialize_f64(v),
                    None => Err(mismatch(value, schema)),
                }
            }
            (Schema::Bytes, Value::Bytes(v)) => serializer.serialize_bytes(v),
            (Schema::String, Value::String(v)) => serializer.serialize_str(v),
            (Schema::Array(items), Value::Array(values)) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(&DatumSerializer::new(value, items, writer))?;
                }
                seq.end()
            }
            (Schema::Map(values), Value::Map(entries)) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&**key, &DatumSerializer::new(value, values, writer))?;
                }
                map.end()
            }
            (Schema::Union(branches), _) => {
                if let Some(inner) = schema.non_null_branch() {
                    return if value.is_null() {
                        serializer.serialize_none()
                    } else {
                        serializer.serialize_some(&DatumSerializer::new(value, inner, writer))
                    };
                }
                match resolve_union(branches, value) {
                    Some(branch) => DatumSerializer::new(value, branch, writer).serialize(serializer),
                    None => Err(mismatch(value, schema)),
                }
            }
            (Schema::Record(record_schema), Value::Record(record)) => {
                RecordSerializer::new(*record, record_schema, writer).serialize(serializer)
            }
            (Schema::Record(record_schema), Value::Fields(fields)) => {
                FieldsSerializer {
                    fields,
                    schema: record_schema,
                    writer,
                }
                .serialize(serializer)
            }
            _ => Err(mismatch(value, schema)),
        }
    }
}

#[cold]
#[inline(never)]
fn mismatch<E: serde_core::ser::Error>(value: &Value<'_>, schema: &Schema) -> E {
    make_custom_error(format!("cannot write a `{}` value as {schema}", value.kind()))
}

// -----------------------------------------------------------------------------
// FieldsSerializer

/// Writes a generic record value in schema order.
struct FieldsSerializer<'a, W: ?Sized> {
    fields: &'a [(Cow<'a, str>, Value<'a>)],
    schema: &'a Arc<RecordSchema>,
    writer: &'a W,
}

impl<W: DatumWrite + ?Sized> Serialize for FieldsSerializer<'_, W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let null = Value::Null;
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for field in self.schema.fields() {
            let value = self
                .fields
                .iter()
                .find(|(name, _)| name == field.name())
                .map_or(&null, |(_, value)| value);
            write_field_value(self.writer, field, value, &mut map)?;
        }
        map.end()
    }
}

// -----------------------------------------------------------------------------
// Union resolution

/// Picks the union branch a value is written as.
pub(crate) fn resolve_union<'s>(branches: &'s [Schema], value: &Value<'_>) -> Option<&'s Schema> {
    branches
        .iter()
        .find(|branch| matches_exactly(branch, value))
        .or_else(|| branches.iter().find(|branch| promotes_to(value, branch)))
}

fn matches_exactly(schema: &Schema, value: &Value<'_>) -> bool {
    match (schema, value) {
        (Schema::Record(schema), Value::Record(record)) => schema.name() == record.type_name(),
        (Schema::Null, Value::Null)
        | (Schema::Boolean, Value::Boolean(_))
        | (Schema::Int, Value::Int(_))
        | (Schema::Long, Value::Long(_))
        | (Schema::Float, Value::Float(_))
        | (Schema::Double, Value::Double(_))
        | (Schema::Bytes, Value::Bytes(_))
        | (Schema::String, Value::String(_))
        | (Schema::Array(_), Value::Array(_))
        | (Schema::Map(_), Value::Map(_)) => true,
        _ => false,
    }
}

fn promotes_to(value: &Value<'_>, schema: &Schema) -> bool {
    matches!(
        (value, schema),
        (Value::Int(_), Schema::Long | Schema::Float | Schema::Double)
            | (Value::Long(_), Schema::Float | Schema::Double)
            | (Value::Float(_), Schema::Double)
            | (Value::Record(_) | Value::Fields(_), Schema::Record(_))
    )
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::string::String;
    use alloc::vec;

    use bravo_schema::{RecordSchema, Schema};

    use super::resolve_union;
    use crate::Value;

    #[test]
    fn union_prefers_exact_branch() {
        let branches = [Schema::Double, Schema::Long, Schema::String];
        assert_eq!(resolve_union(&branches, &Value::Long(1)), Some(&Schema::Long));
        assert_eq!(resolve_union(&branches, &Value::Int(1)), Some(&Schema::Double));
        assert_eq!(resolve_union(&branches, &Value::Boolean(true)), None);
    }

    #[test]
    fn union_accepts_generic_records() {
        let scores = RecordSchema::builder("Scores").required_int("total").build().unwrap();
        let branches = [Schema::Null, Schema::String, Schema::from(scores)];
        let fields = Value::Fields(vec![(Cow::Borrowed("total"), Value::Int(1))]);
        assert!(matches!(resolve_union(&branches, &fields), Some(Schema::Record(_))));
        let text = Value::from(String::from("x"));
        assert_eq!(resolve_union(&branches, &text), Some(&Schema::String));
    }
}
