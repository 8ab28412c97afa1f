use bravo_reflect::ReflectState;

use crate::AccessorTable;

/// The state of one (record type, record schema) pair: the reflective
/// position mapping plus the resolved overrides.
///
/// Built once by the state cache and shared read-only afterwards.
#[derive(Debug)]
pub struct RecordState {
    reflect: ReflectState,
    table: AccessorTable,
}

impl RecordState {
    #[inline]
    pub fn new(reflect: ReflectState, table: AccessorTable) -> Self {
        Self { reflect, table }
    }

    /// The state of the default reflective path.
    #[inline]
    pub fn reflect(&self) -> &ReflectState {
        &self.reflect
    }

    #[inline]
    pub fn table(&self) -> &AccessorTable {
        &self.table
    }
}
