use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{Field, RecordSchema, Schema, SchemaError};

/// Fluent builder for [`RecordSchema`].
///
/// Positions are assigned in declaration order. Validation is deferred to
/// [`build`](Self::build), so the chain reads like the schema it produces.
///
/// # Examples
///
/// ```
/// use bravo_schema::{RecordSchema, Schema};
///
/// let student = RecordSchema::builder("Student")
///     .required_long("serializationTime")
///     .required_string("name")
///     .record(
///         "scores",
///         RecordSchema::builder("Scores")
///             .required_int("mathScore")
///             .required_int("javaScore")
///             .required_int("total")
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(student.len(), 3);
/// assert!(matches!(student.field("scores").unwrap().schema(), Schema::Record(_)));
/// ```
pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<(String, Schema, Option<String>)>,
}

impl RecordSchemaBuilder {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field with the given schema.
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.fields.push((name.into(), schema, None));
        self
    }

    /// Appends a documented field.
    pub fn field_with_doc(
        mut self,
        name: impl Into<String>,
        schema: Schema,
        doc: impl Into<String>,
    ) -> Self {
        self.fields.push((name.into(), schema, Some(doc.into())));
        self
    }

    /// Appends a nested record field.
    #[inline]
    pub fn record(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.field(name, schema.into())
    }

    #[inline]
    pub fn required_boolean(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::Boolean)
    }

    #[inline]
    pub fn required_int(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::Int)
    }

    #[inline]
    pub fn required_long(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::Long)
    }

    #[inline]
    pub fn required_float(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::Float)
    }

    #[inline]
    pub fn required_double(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::Double)
    }

    #[inline]
    pub fn required_string(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::String)
    }

    #[inline]
    pub fn required_bytes(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::Bytes)
    }

    #[inline]
    pub fn optional_boolean(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::nullable(Schema::Boolean))
    }

    #[inline]
    pub fn optional_int(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::nullable(Schema::Int))
    }

    #[inline]
    pub fn optional_long(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::nullable(Schema::Long))
    }

    #[inline]
    pub fn optional_double(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::nullable(Schema::Double))
    }

    #[inline]
    pub fn optional_string(self, name: impl Into<String>) -> Self {
        self.field(name, Schema::nullable(Schema::String))
    }

    /// Validates the declaration and builds the schema.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::EmptyRecordName`] if the record name is empty.
    /// - [`SchemaError::EmptyFieldName`] if a field name is empty.
    /// - [`SchemaError::DuplicateField`] if two fields share a name.
    pub fn build(self) -> Result<RecordSchema, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyRecordName);
        }

        let owner: Box<str> = Box::from(self.name.as_str());
        let mut fields: Vec<Field> = Vec::with_capacity(self.fields.len());
        for (pos, (name, schema, doc)) in self.fields.into_iter().enumerate() {
            if name.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    record: self.name,
                    pos,
                });
            }
            if fields.iter().any(|f| f.name() == name) {
                return Err(SchemaError::DuplicateField {
                    record: self.name,
                    field: name,
                });
            }
            fields.push(Field::new(
                owner.clone(),
                name.into_boxed_str(),
                pos,
                schema,
                doc.map(String::into_boxed_str),
            ));
        }

        Ok(RecordSchema::from_validated(
            self.name.into_boxed_str(),
            Box::from(fields),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{RecordSchema, Schema, SchemaError};

    #[test]
    fn empty_record_is_valid() {
        let schema = RecordSchema::builder("Empty").build().unwrap();
        assert!(schema.is_empty());
        assert_eq!(schema.field_at(0), None);
    }

    #[test]
    fn rejects_duplicate_field() {
        let err = RecordSchema::builder("Student")
            .required_string("name")
            .required_int("name")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { ref field, .. } if field == "name"));
    }

    #[test]
    fn rejects_empty_names() {
        assert!(matches!(
            RecordSchema::builder("").build(),
            Err(SchemaError::EmptyRecordName)
        ));
        assert!(matches!(
            RecordSchema::builder("A").required_int("").build(),
            Err(SchemaError::EmptyFieldName { pos: 0, .. })
        ));
    }

    #[test]
    fn optional_fields_are_nullable_unions() {
        let schema = RecordSchema::builder("A").optional_string("nick").build().unwrap();
        let field = schema.field("nick").unwrap();
        assert!(field.schema().is_nullable());
        assert_eq!(field.schema().non_null_branch(), Some(&Schema::String));
    }
}
