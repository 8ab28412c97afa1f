//! Provide `FixedHashState`, the hasher behind schema fingerprints.
//!
//! Based on the `foldhash` crate with a fixed seed, so a fingerprint only
//! depends on the shape of the schema, never on the process or the instance.

use core::hash::{BuildHasher, Hash};

use foldhash::fast::{FixedState, FoldHasher};

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5C4E_3A7D_B0A9_17F1);

/// A fixed hasher whose results only depend on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Fixed hash state based upon a random but fixed seed.
///
/// Used both for fingerprinting [`RecordSchema`](crate::RecordSchema) and as the
/// hash state of the field-name index.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use bravo_schema::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("total"), FixedHashState.hash_one("total"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// Hash a value with [`FixedHashState`].
#[inline]
pub(crate) fn fingerprint_of<T: Hash + ?Sized>(value: &T) -> u64 {
    FixedHashState.hash_one(value)
}
