use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use bravo_schema::{FixedHashState, RecordSchema};
use hashbrown::{Equivalent, HashMap};

// -----------------------------------------------------------------------------
// Keys

struct CacheKey {
    type_id: TypeId,
    schema: Arc<RecordSchema>,
}

impl PartialEq for CacheKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && *self.schema == *other.schema
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        state.write_u64(self.schema.fingerprint());
    }
}

/// A borrowed [`CacheKey`], so hits never touch the reference count.
struct KeyRef<'a> {
    type_id: TypeId,
    schema: &'a RecordSchema,
}

impl Hash for KeyRef<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        state.write_u64(self.schema.fingerprint());
    }
}

impl Equivalent<CacheKey> for KeyRef<'_> {
    #[inline]
    fn equivalent(&self, key: &CacheKey) -> bool {
        self.type_id == key.type_id && *self.schema == *key.schema
    }
}

// -----------------------------------------------------------------------------
// StateCache

/// A concurrent map from (record type, record schema) to a shared state.
///
/// Schemas are compared structurally, so two equal schemas built apart share
/// one entry. Hits take a shared read lock. On a miss the state is built
/// outside of any lock and inserted under the write lock; if another thread
/// inserted first, its state is kept and returned, so every caller observes
/// a single state per key.
pub struct StateCache<S> {
    map: RwLock<HashMap<CacheKey, Arc<S>, FixedHashState>>,
    builds: AtomicUsize,
}

impl<S> StateCache<S> {
    #[inline]
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(FixedHashState)),
            builds: AtomicUsize::new(0),
        }
    }

    /// Returns the cached state for a key, if any.
    pub fn get(&self, type_id: TypeId, schema: &RecordSchema) -> Option<Arc<S>> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&KeyRef { type_id, schema })
            .map(Arc::clone)
    }

    /// Returns the cached state for a key, building it with `f` on a miss.
    ///
    /// A failed build caches nothing.
    pub fn get_or_try_insert<E>(
        &self,
        type_id: TypeId,
        schema: &Arc<RecordSchema>,
        f: impl FnOnce() -> Result<S, E>,
    ) -> Result<Arc<S>, E> {
        if let Some(state) = self.get(type_id, schema) {
            return Ok(state);
        }

        self.builds.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(f()?);

        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = map.get(&KeyRef { type_id, schema }) {
            log::trace!("record state for `{schema}` was built concurrently, keeping the first");
            return Ok(Arc::clone(existing));
        }
        map.insert(
            CacheKey {
                type_id,
                schema: Arc::clone(schema),
            },
            Arc::clone(&state),
        );
        Ok(state)
    }

    /// Returns the number of cached states.
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many states were built, including those discarded after
    /// losing an insertion race.
    #[inline]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl<S> Default for StateCache<S> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for StateCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCache")
            .field("len", &self.len())
            .field("builds", &self.builds())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::TypeId;

    use bravo_schema::RecordSchema;

    use super::StateCache;

    fn scores() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::builder("Scores")
                .required_int("mathScore")
                .required_int("javaScore")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn equal_schemas_share_an_entry() {
        let cache = StateCache::<u32>::new();
        let a = cache
            .get_or_try_insert(TypeId::of::<u8>(), &scores(), || Ok::<_, ()>(1))
            .unwrap();
        let b = cache
            .get_or_try_insert(TypeId::of::<u8>(), &scores(), || Ok::<_, ()>(2))
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn keys_include_the_record_type() {
        let cache = StateCache::<u32>::new();
        let schema = scores();
        cache
            .get_or_try_insert(TypeId::of::<u8>(), &schema, || Ok::<_, ()>(1))
            .unwrap();
        cache
            .get_or_try_insert(TypeId::of::<u16>(), &schema, || Ok::<_, ()>(2))
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(TypeId::of::<u16>(), &schema).as_deref(), Some(&2));
        assert_eq!(cache.get(TypeId::of::<u32>(), &schema), None);
    }

    #[test]
    fn failed_builds_are_not_cached() {
        let cache = StateCache::<u32>::new();
        let schema = scores();
        let err = cache.get_or_try_insert(TypeId::of::<u8>(), &schema, || Err("boom"));
        assert_eq!(err, Err("boom"));
        assert!(cache.is_empty());

        let ok = cache.get_or_try_insert(TypeId::of::<u8>(), &schema, || Ok::<_, &str>(3));
        assert_eq!(ok.as_deref(), Ok(&3));
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn concurrent_callers_observe_one_state() {
        let cache = StateCache::<u32>::new();
        let schema = scores();
        let states: alloc::vec::Vec<_> = std::thread::scope(|s| {
            let handles: alloc::vec::Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    let schema = &schema;
                    s.spawn(move || {
                        cache
                            .get_or_try_insert(TypeId::of::<u8>(), schema, || Ok::<_, ()>(i))
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(cache.len(), 1);
        assert!(states.iter().all(|state| Arc::ptr_eq(state, &states[0])));
    }
}
