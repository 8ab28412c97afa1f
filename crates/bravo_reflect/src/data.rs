use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::TypeId;

use bravo_schema::{Field, RecordSchema};

use crate::{Record, ReflectError, Value};

// -----------------------------------------------------------------------------
// RecordData

/// The pluggable data model behind the writers and readers.
///
/// A data model prepares a per-(record type, schema) state once, then reads
/// and writes individual schema fields of a record through it. Writers and
/// readers never touch a record directly.
pub trait RecordData: Send + Sync {
    /// Per-(record type, schema) state, prepared before any field access.
    type State: Send + Sync;

    /// Prepares the state used to access `record` through `schema`.
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<Self::State, ReflectError>;

    /// Reads the value of the schema field `field`.
    fn get_field<'r>(
        &self,
        record: &'r dyn Record,
        field: &Field,
        state: &Self::State,
    ) -> Result<Value<'r>, ReflectError>;

    /// Writes the value of the schema field `field`.
    fn set_field(
        &self,
        record: &mut dyn Record,
        field: &Field,
        value: Value<'_>,
        state: &Self::State,
    ) -> Result<(), ReflectError>;

    /// Returns the nested in-memory record behind `field`, if any.
    fn nested_record_mut<'r>(
        &self,
        record: &'r mut dyn Record,
        field: &Field,
        state: &Self::State,
    ) -> Option<&'r mut dyn Record>;
}

// -----------------------------------------------------------------------------
// ReflectState

/// Maps every position of a record schema onto a native field index.
///
/// Matching is by name. A schema field the record type does not have maps to
/// nothing, and accessing it raises [`ReflectError::MissingField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectState {
    record_type: TypeId,
    record_name: &'static str,
    slots: Box<[Option<usize>]>,
}

impl ReflectState {
    /// Resolves each field of `schema` against the fields of `record`.
    pub fn new(record: &dyn Record, schema: &RecordSchema) -> Self {
        let slots = schema
            .fields()
            .iter()
            .map(|field| record.index_of(field.name()))
            .collect();

        Self {
            record_type: record.record_type_id(),
            record_name: record.type_name(),
            slots,
        }
    }

    #[inline]
    pub fn record_type(&self) -> TypeId {
        self.record_type
    }

    #[inline]
    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    /// Returns the number of schema positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the native index behind a schema position.
    ///
    /// `Ok(None)` means the record type has no such field.
    #[inline]
    pub fn native_index(&self, pos: usize) -> Result<Option<usize>, ReflectError> {
        self.slots
            .get(pos)
            .copied()
            .ok_or(ReflectError::PositionOutOfRange {
                pos,
                len: self.slots.len(),
            })
    }

    fn check(&self, record: &dyn Record) -> Result<(), ReflectError> {
        if record.record_type_id() == self.record_type {
            Ok(())
        } else {
            Err(ReflectError::MismatchedRecord {
                expected: self.record_name,
                found: record.type_name(),
            })
        }
    }

    fn index_for(&self, record: &dyn Record, field: &Field) -> Result<usize, ReflectError> {
        self.check(record)?;
        self.native_index(field.pos())?
            .ok_or_else(|| ReflectError::MissingField {
                record: self.record_name,
                field: field.name().into(),
            })
    }
}

// -----------------------------------------------------------------------------
// ReflectData

/// The default reflective data model.
///
/// # Examples
///
/// ```
/// use bravo_reflect::{RecordData, ReflectData, Value, impl_record};
/// use bravo_schema::RecordSchema;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Scores {
///     math: i32,
/// }
///
/// impl_record!(Scores { math as "mathScore" });
///
/// let schema = Arc::new(
///     RecordSchema::builder("Scores")
///         .required_int("mathScore")
///         .required_int("total")
///         .build()
///         .unwrap(),
/// );
/// let scores = Scores { math: 35 };
/// let state = ReflectData.record_state(&scores, &schema).unwrap();
///
/// let math = schema.field("mathScore").unwrap();
/// assert_eq!(ReflectData.get_field(&scores, math, &state), Ok(Value::Int(35)));
///
/// let total = schema.field("total").unwrap();
/// assert!(ReflectData.get_field(&scores, total, &state).unwrap_err().is_missing_field());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectData;

impl RecordData for ReflectData {
    type State = ReflectState;

    #[inline]
    fn record_state(
        &self,
        record: &dyn Record,
        schema: &Arc<RecordSchema>,
    ) -> Result<ReflectState, ReflectError> {
        Ok(ReflectState::new(record, schema))
    }

    fn get_field<'r>(
        &self,
        record: &'r dyn Record,
        field: &Field,
        state: &ReflectState,
    ) -> Result<Value<'r>, ReflectError> {
        let index = state.index_for(record, field)?;
        record
            .field_at(index)
            .ok_or_else(|| ReflectError::IndexOutOfRange {
                record: record.type_name(),
                index,
                len: record.field_names().len(),
            })
    }

    fn set_field(
        &self,
        record: &mut dyn Record,
        field: &Field,
        value: Value<'_>,
        state: &ReflectState,
    ) -> Result<(), ReflectError> {
        let index = state.index_for(record, field)?;
        record.set_field_at(index, value)
    }

    fn nested_record_mut<'r>(
        &self,
        record: &'r mut dyn Record,
        field: &Field,
        state: &ReflectState,
    ) -> Option<&'r mut dyn Record> {
        let index = state.index_for(record, field).ok()?;
        record.record_at_mut(index)
    }
}

// -----------------------------------------------------------------------------
// Tests
