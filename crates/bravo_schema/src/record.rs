use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::hasher::{FixedHashState, fingerprint_of};
use crate::{RecordSchemaBuilder, Schema};

// -----------------------------------------------------------------------------
// Field

/// A field descriptor of a [`RecordSchema`].
///
/// The position is the stable index of the field inside its enclosing record
/// schema. A field also remembers the full name of that record, so equal
/// names at equal positions in different records are distinct fields.
/// Docs are informational and excluded from equality and hashing.
#[derive(Clone)]
pub struct Field {
    record: Box<str>,
    name: Box<str>,
    pos: usize,
    schema: Schema,
    doc: Option<Box<str>>,
}

impl Field {
    pub(crate) fn new(
        record: Box<str>,
        name: Box<str>,
        pos: usize,
        schema: Schema,
        doc: Option<Box<str>>,
    ) -> Self {
        Self {
            record,
            name,
            pos,
            schema,
            doc,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full name of the record schema declaring this field.
    #[inline]
    pub fn record(&self) -> &str {
        &self.record
    }

    /// The index of this field within its enclosing record schema.
    #[inline]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
            && self.name == other.name
            && self.record == other.record
            && self.schema == other.schema
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record.hash(state);
        self.name.hash(state);
        self.pos.hash(state);
        self.schema.hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("record", &self.record)
            .field("name", &self.name)
            .field("pos", &self.pos)
            .field("schema", &self.schema)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// RecordSchema

/// An immutable record schema: a name and an ordered list of [`Field`]s.
///
/// A structural fingerprint is computed once by the builder. It is the hash
/// of the schema and the first thing compared by equality, which keeps
/// lookups keyed by record schemas cheap even for deep nesting.
///
/// # Examples
///
/// ```
/// use bravo_schema::{RecordSchema, Schema};
///
/// let scores = RecordSchema::builder("Scores")
///     .required_int("mathScore")
///     .required_int("javaScore")
///     .build()
///     .unwrap();
///
/// assert_eq!(scores.len(), 2);
/// assert_eq!(scores.field("javaScore").unwrap().pos(), 1);
/// assert_eq!(scores.field_at(0).unwrap().schema(), &Schema::Int);
/// ```
pub struct RecordSchema {
    name: Box<str>,
    fields: Box<[Field]>,
    field_indices: HashMap<Box<str>, usize, FixedHashState>,
    fingerprint: u64,
}

impl RecordSchema {
    /// Starts building a record schema with the given full name.
    #[inline]
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder::new(name)
    }

    // Fields must already be validated: unique names, positions matching indices.
    pub(crate) fn from_validated(name: Box<str>, fields: Box<[Field]>) -> Self {
        let mut field_indices = HashMap::with_capacity_and_hasher(fields.len(), FixedHashState);
        for field in fields.iter() {
            field_indices.insert(field.name.clone(), field.pos);
        }

        let fingerprint = fingerprint_of(&(&*name, &*fields));

        Self {
            name,
            fields,
            field_indices,
            fingerprint,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the field at the given position.
    #[inline]
    pub fn field_at(&self, pos: usize) -> Option<&Field> {
        self.fields.get(pos)
    }

    /// Returns the field with the given name.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index_of(name).map(|pos| &self.fields[pos])
    }

    /// Returns the position of the field with the given name.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    /// The structural fingerprint, stable across instances and processes.
    #[inline]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl PartialEq for RecordSchema {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
            || (self.fingerprint == other.fingerprint
                && self.name == other.name
                && self.fields == other.fields)
    }
}

impl Eq for RecordSchema {}

impl Hash for RecordSchema {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use crate::{RecordSchema, Schema};

    fn scores() -> RecordSchema {
        RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_int("javaScore")
            .required_int("total")
            .build()
            .unwrap()
    }

    #[test]
    fn positions_follow_declaration_order() {
        let schema = scores();
        let names = schema.fields().iter().map(|f| (f.pos(), f.name())).collect::<alloc::vec::Vec<_>>();
        assert_eq!(names, [(0, "mathScore"), (1, "javaScore"), (2, "total")]);
        assert_eq!(schema.index_of("total"), Some(2));
        assert_eq!(schema.index_of("missing"), None);
    }

    #[test]
    fn separately_built_schemas_are_equal() {
        let a = scores();
        let b = scores();
        assert!(!core::ptr::eq(&a, &b));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a, b);
    }

    #[test]
    fn shape_changes_change_fingerprint() {
        let a = scores();
        let b = RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_long("javaScore")
            .required_int("total")
            .build()
            .unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a, b);
    }

    #[test]
    fn docs_do_not_affect_identity() {
        let a = RecordSchema::builder("A")
            .field_with_doc("x", Schema::Int, "the x")
            .build()
            .unwrap();
        let b = RecordSchema::builder("A").field("x", Schema::Int).build().unwrap();
        assert_eq!(a.field("x").unwrap().doc(), Some("the x"));
        assert_eq!(a, b);
    }

    #[test]
    fn nested_records_contribute_to_fingerprint() {
        let outer = |inner: RecordSchema| {
            RecordSchema::builder("Student")
                .required_string("name")
                .record("scores", inner)
                .build()
                .unwrap()
        };
        let two = RecordSchema::builder("Scores")
            .required_int("mathScore")
            .required_int("javaScore")
            .build()
            .unwrap();

        let a = outer(scores());
        let b = outer(two);
        assert_ne!(a, b);

        let nested = a.field("scores").unwrap().schema().as_record().unwrap();
        assert_eq!(nested.field("mathScore").unwrap().record(), "Scores");
        assert_eq!(**nested, scores());
        assert_eq!(Schema::Record(Arc::clone(nested)), Schema::from(scores()));
    }

    #[test]
    fn fields_belong_to_their_record() {
        let scores = Arc::new(
            RecordSchema::builder("Scores")
                .required_string("name")
                .required_int("mathScore")
                .build()
                .unwrap(),
        );
        let student = RecordSchema::builder("Student")
            .required_string("name")
            .record("scores", Arc::clone(&scores))
            .build()
            .unwrap();

        let outer = student.field("name").unwrap();
        let inner = scores.field("name").unwrap();
        assert_eq!(outer.record(), "Student");
        assert_eq!(inner.record(), "Scores");
        assert_eq!((outer.pos(), outer.schema()), (inner.pos(), inner.schema()));
        assert_ne!(outer, inner);

        let again = RecordSchema::builder("Scores")
            .required_string("name")
            .required_int("mathScore")
            .build()
            .unwrap();
        assert_eq!(again.field("name").unwrap(), inner);
    }
}
