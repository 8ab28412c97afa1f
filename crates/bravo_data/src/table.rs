use alloc::boxed::Box;
use core::fmt;

use bravo_schema::RecordSchema;

use crate::{FieldContext, OverrideResolver, RecordType, SharedAccessor};

/// The resolved overrides of one (record type, record schema) pair.
///
/// Slot `i` holds the override of the field at position `i`, so a lookup
/// during writing is a plain index. The table is built once and never
/// mutated afterwards.
pub struct AccessorTable {
    slots: Box<[Option<SharedAccessor>]>,
}

impl AccessorTable {
    /// Asks `resolver` about every field of `schema`, in position order.
    pub fn build<R: OverrideResolver + ?Sized>(
        record_type: RecordType,
        schema: &RecordSchema,
        resolver: &R,
    ) -> Self {
        let slots = schema
            .fields()
            .iter()
            .map(|field| resolver.resolve(&FieldContext::new(record_type, schema, field)))
            .collect();
        Self { slots }
    }

    /// Returns the override for a position, `None` if the field is not
    /// overridden or the position is out of range.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<&SharedAccessor> {
        self.slots.get(pos)?.as_ref()
    }

    #[inline]
    pub fn is_overridden(&self, pos: usize) -> bool {
        self.get(pos).is_some()
    }

    /// Returns the number of positions, equal to the schema length.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the number of overridden positions.
    pub fn overridden(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(|slot| slot.is_some()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
