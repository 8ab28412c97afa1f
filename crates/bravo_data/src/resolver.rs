use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

use bravo_reflect::Record;
use bravo_schema::{Field, RecordSchema};

use crate::SharedAccessor;

// -----------------------------------------------------------------------------
// RecordType

/// The identity of an in-memory record type.
///
/// Equality and hashing only consider the [`TypeId`]; the name is for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
}

impl RecordType {
    /// Returns the record type of `T`.
    #[inline]
    pub fn of<T: Record>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::record_name(),
        }
    }

    /// Returns the record type of a record.
    #[inline]
    pub fn of_record(record: &dyn Record) -> Self {
        Self {
            id: record.record_type_id(),
            name: record.type_name(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is<T: Record>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for RecordType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// -----------------------------------------------------------------------------
// FieldContext

/// Everything a resolver may match on: the record type, the enclosing record
/// schema and the field descriptor.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    record_type: RecordType,
    schema: &'a RecordSchema,
    field: &'a Field,
}

impl<'a> FieldContext<'a> {
    #[inline]
    pub const fn new(record_type: RecordType, schema: &'a RecordSchema, field: &'a Field) -> Self {
        Self {
            record_type,
            schema,
            field,
        }
    }

    #[inline]
    pub const fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// The record schema enclosing the field.
    #[inline]
    pub const fn schema(&self) -> &'a RecordSchema {
        self.schema
    }

    #[inline]
    pub const fn field(&self) -> &'a Field {
        self.field
    }

    /// Shorthand for `self.field().name()`.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.field.name()
    }
}

// -----------------------------------------------------------------------------
// OverrideResolver

/// Answers, per field, whether an override accessor replaces the default
/// reflective access.
///
/// Resolvers must be pure: the same context always gets the same answer.
/// They run once per (record type, schema) when its record state is built,
/// possibly more than once under contention. `None` means "no override" and
/// is never an error.
///
/// Closures taking a [`FieldContext`] are resolvers; [`from_fn`] helps the
/// compiler infer their signature. [`by_field`] and [`by_name`] adapt
/// coarser lookups, and [`FieldOverrides`] is a declarative table.
pub trait OverrideResolver: Send + Sync + 'static {
    fn resolve(&self, cx: &FieldContext<'_>) -> Option<SharedAccessor>;
}

impl<F> OverrideResolver for F
where
    F: Fn(&FieldContext<'_>) -> Option<SharedAccessor> + Send + Sync + 'static,
{
    #[inline]
    fn resolve(&self, cx: &FieldContext<'_>) -> Option<SharedAccessor> {
        self(cx)
    }
}

/// Returns a closure as is, pinning its signature to that of a resolver.
#[inline]
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&FieldContext<'_>) -> Option<SharedAccessor> + Send + Sync + 'static,
{
    f
}

/// A resolver that never overrides anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl OverrideResolver for NoOverrides {
    #[inline]
    fn resolve(&self, _cx: &FieldContext<'_>) -> Option<SharedAccessor> {
        None
    }
}

/// Adapts a lookup by field descriptor. See [`by_field`].
#[derive(Clone, Copy)]
pub struct ByField<F>(F);

/// Resolves by field descriptor only.
#[inline]
pub fn by_field<F>(f: F) -> ByField<F>
where
    F: Fn(&Field) -> Option<SharedAccessor> + Send + Sync + 'static,
{
    ByField(f)
}

impl<F> OverrideResolver for ByField<F>
where
    F: Fn(&Field) -> Option<SharedAccessor> + Send + Sync + 'static,
{
    #[inline]
    fn resolve(&self, cx: &FieldContext<'_>) -> Option<SharedAccessor> {
        (self.0)(cx.field())
    }
}

/// Adapts a lookup by field name. See [`by_name`].
#[derive(Clone, Copy)]
pub struct ByName<F>(F);

/// Resolves by field name only, whatever the record or schema.
#[inline]
pub fn by_name<F>(f: F) -> ByName<F>
where
    F: Fn(&str) -> Option<SharedAccessor> + Send + Sync + 'static,
{
    ByName(f)
}

impl<F> OverrideResolver for ByName<F>
where
    F: Fn(&str) -> Option<SharedAccessor> + Send + Sync + 'static,
{
    #[inline]
    fn resolve(&self, cx: &FieldContext<'_>) -> Option<SharedAccessor> {
        (self.0)(cx.name())
    }
}

// -----------------------------------------------------------------------------
// FieldOverrides

#[derive(Clone)]
enum Matcher {
    Name(Box<str>),
    InSchema { schema: Box<str>, field: Box<str> },
    Field(Field),
    Scoped {
        record_type: RecordType,
        schema: Box<str>,
        field: Box<str>,
    },
}

impl Matcher {
    /// Returns the specificity of a match, higher is more specific.
    fn specificity(&self, cx: &FieldContext<'_>) -> Option<u8> {
        match self {
            Matcher::Name(name) => (**name == *cx.name()).then_some(0),
            Matcher::InSchema { schema, field } => {
                (**schema == *cx.schema().name() && **field == *cx.name()).then_some(1)
            }
            Matcher::Field(field) => (field == cx.field()).then_some(2),
            Matcher::Scoped {
                record_type,
                schema,
                field,
            } => (*record_type == cx.record_type()
                && **schema == *cx.schema().name()
                && **field == *cx.name())
            .then_some(3),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Name(name) => write!(f, "*.{name}"),
            Matcher::InSchema { schema, field } => write!(f, "{schema}.{field}"),
            Matcher::Field(field) => {
                write!(f, "{}.{}@{}", field.record(), field.name(), field.pos())
            }
            Matcher::Scoped {
                record_type,
                schema,
                field,
            } => write!(f, "{record_type:?}:{schema}.{field}"),
        }
    }
}

/// A declarative resolver.
///
/// Entries match by field name anywhere ([`name`](Self::name)), by schema and
/// field name ([`in_schema`](Self::in_schema)), by field descriptor
/// ([`field`](Self::field)), or by record type, schema and field name
/// ([`scoped`](Self::scoped)). When several entries match a field the most
/// specific wins, in the reverse of that order; among equally specific
/// entries the first one added wins.
///
/// # Examples
///
/// ```
/// use bravo_data::accessor::constant;
/// use bravo_data::{FieldContext, FieldOverrides, OverrideResolver, RecordType};
/// use bravo_reflect::{Value, impl_record};
/// use bravo_schema::RecordSchema;
///
/// #[derive(Default)]
/// struct Student {
///     name: String,
/// }
///
/// impl_record!(Student { name });
///
/// let overrides = FieldOverrides::new()
///     .name("name", constant("anyone"))
///     .scoped::<Student>("Student", "name", constant("student"));
///
/// let schema = RecordSchema::builder("Student").required_string("name").build().unwrap();
/// let field = schema.field("name").unwrap();
/// let cx = FieldContext::new(RecordType::of::<Student>(), &schema, field);
///
/// let accessor = overrides.resolve(&cx).unwrap();
/// assert_eq!(accessor.get(&Student::default()), Ok(Value::from("student")));
/// ```
#[derive(Clone, Default)]
pub struct FieldOverrides {
    entries: Vec<(Matcher, SharedAccessor)>,
}

impl FieldOverrides {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Overrides every field with this name.
    pub fn name(mut self, name: impl Into<Box<str>>, accessor: SharedAccessor) -> Self {
        self.entries.push((Matcher::Name(name.into()), accessor));
        self
    }

    /// Overrides the field `field` of record schemas named `schema`.
    pub fn in_schema(
        mut self,
        schema: impl Into<Box<str>>,
        field: impl Into<Box<str>>,
        accessor: SharedAccessor,
    ) -> Self {
        let matcher = Matcher::InSchema {
            schema: schema.into(),
            field: field.into(),
        };
        self.entries.push((matcher, accessor));
        self
    }

    /// Overrides fields equal to this descriptor.
    ///
    /// Descriptors include their enclosing record, so a field of one record
    /// never matches a same-named field of another.
    pub fn field(mut self, field: &Field, accessor: SharedAccessor) -> Self {
        self.entries.push((Matcher::Field(field.clone()), accessor));
        self
    }

    /// Overrides the field `field` of record schemas named `schema`, only
    /// when written from records of type `T`.
    pub fn scoped<T: Record>(
        mut self,
        schema: impl Into<Box<str>>,
        field: impl Into<Box<str>>,
        accessor: SharedAccessor,
    ) -> Self {
        let matcher = Matcher::Scoped {
            record_type: RecordType::of::<T>(),
            schema: schema.into(),
            field: field.into(),
        };
        self.entries.push((matcher, accessor));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OverrideResolver for FieldOverrides {
    fn resolve(&self, cx: &FieldContext<'_>) -> Option<SharedAccessor> {
        let mut best: Option<(u8, &SharedAccessor)> = None;
        for (matcher, accessor) in &self.entries {
            let Some(specificity) = matcher.specificity(cx) else {
                continue;
            };
            if best.is_none_or(|(current, _)| specificity > current) {
                best = Some((specificity, accessor));
            }
        }
        best.map(|(_, accessor)| SharedAccessor::clone(accessor))
    }
}

impl fmt::Debug for FieldOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(matcher, _)| matcher))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use bravo_reflect::{Value, impl_record};
    use bravo_schema::{RecordSchema, Schema};

    use super::{
        FieldContext, FieldOverrides, NoOverrides, OverrideResolver, RecordType, by_field,
        by_name, from_fn,
    };
    use crate::SharedAccessor;
    use crate::accessor::constant;

    #[derive(Default)]
    struct Student {
        name: String,
    }

    impl_record!(Student { name });

    #[derive(Default)]
    struct Tutor {
        name: String,
    }

    impl_record!(Tutor { name });

    fn schema(name: &str) -> RecordSchema {
        RecordSchema::builder(name)
            .required_string("name")
            .build()
            .unwrap()
    }

    fn resolved(
        resolver: &dyn OverrideResolver,
        record_type: RecordType,
        schema: &RecordSchema,
    ) -> Option<Value<'static>> {
        let field = schema.field("name").unwrap();
        let accessor = resolver.resolve(&FieldContext::new(record_type, schema, field))?;
        accessor.get(&Student::default()).ok().map(Value::into_owned)
    }

    #[test]
    fn adapters_ignore_the_rest_of_the_context() {
        let by_name = by_name(|name| (name == "name").then(|| constant("n")));
        let by_field = by_field(|field| (field.pos() == 0).then(|| constant("f")));
        let student = RecordType::of::<Student>();

        assert_eq!(resolved(&by_name, student, &schema("A")), Some(Value::from("n")));
        assert_eq!(resolved(&by_field, student, &schema("B")), Some(Value::from("f")));
        assert_eq!(resolved(&NoOverrides, student, &schema("A")), None);
    }

    #[test]
    fn closures_see_the_whole_context() {
        let resolver = from_fn(|cx: &FieldContext<'_>| {
            (cx.record_type().is::<Student>() && cx.schema().name() == "A")
                .then(|| constant("cx"))
        });
        let student = RecordType::of::<Student>();
        let tutor = RecordType::of::<Tutor>();
        assert_eq!(resolved(&resolver, student, &schema("A")), Some(Value::from("cx")));
        assert_eq!(resolved(&resolver, student, &schema("B")), None);
        assert_eq!(resolved(&resolver, tutor, &schema("A")), None);
    }

    #[test]
    fn most_specific_entry_wins() {
        let a = schema("A");
        let overrides = FieldOverrides::new()
            .name("name", constant("name"))
            .in_schema("A", "name", constant("in_schema"))
            .field(a.field("name").unwrap(), constant("field"))
            .scoped::<Tutor>("A", "name", constant("scoped"));
        let student = RecordType::of::<Student>();
        let tutor = RecordType::of::<Tutor>();

        assert_eq!(overrides.len(), 4);
        assert_eq!(resolved(&overrides, tutor, &a), Some(Value::from("scoped")));
        assert_eq!(resolved(&overrides, student, &a), Some(Value::from("field")));

        let b = RecordSchema::builder("B")
            .required_int("id")
            .required_string("name")
            .build()
            .unwrap();
        assert_eq!(resolved(&overrides, student, &b), Some(Value::from("name")));

        let in_schema = FieldOverrides::new()
            .name("name", constant("name"))
            .in_schema("A", "name", constant("in_schema"));
        assert_eq!(resolved(&in_schema, student, &a), Some(Value::from("in_schema")));
    }

    #[test]
    fn field_entries_stay_in_their_record() {
        let a = schema("A");
        let overrides = FieldOverrides::new().field(a.field("name").unwrap(), constant("field"));
        let student = RecordType::of::<Student>();

        // Same name, position and schema, but declared by another record.
        assert_eq!(resolved(&overrides, student, &schema("Other")), None);
        assert_eq!(resolved(&overrides, student, &schema("A")), Some(Value::from("field")));

        let by_field = by_field(|field| {
            (field.record() == "A" && field.name() == "name").then(|| constant("a"))
        });
        assert_eq!(resolved(&by_field, student, &schema("Other")), None);
        assert_eq!(resolved(&by_field, student, &a), Some(Value::from("a")));
    }

    #[test]
    fn first_of_equal_entries_wins() {
        let overrides = FieldOverrides::new()
            .name("name", constant("first"))
            .name("name", constant("second"));
        let student = RecordType::of::<Student>();
        assert_eq!(resolved(&overrides, student, &schema("A")), Some(Value::from("first")));
    }

    #[test]
    fn resolution_shares_accessors() {
        let accessor: SharedAccessor = constant(1);
        let overrides = FieldOverrides::new().name("name", Arc::clone(&accessor));
        let schema = RecordSchema::builder("A")
            .field("name", Schema::Int)
            .build()
            .unwrap();
        let field = schema.field("name").unwrap();
        let cx = FieldContext::new(RecordType::of::<Student>(), &schema, field);
        let resolved = overrides.resolve(&cx).unwrap();
        assert!(Arc::ptr_eq(&resolved, &accessor));
    }
}
