//! Call-scoped primary-key resolution.

use lattice_model::KeyValue;
use lattice_store::{RowHandle, Store, StoreResult};
use std::collections::HashMap;

/// Resolves primary-key values to rows within one top-level call.
///
/// Resolution checks the in-call cache first and queries the store only
/// on a miss; store hits are cached too, so a key recurring many times in
/// one graph costs a single lookup. The cache also guarantees that
/// repeated upserts of the same key within a call are observably
/// coalesced before the transaction commits. A null key participates in
/// dedup like any other value.
#[derive(Debug, Default)]
pub(crate) struct PrimaryKeyResolver {
    cache: HashMap<String, HashMap<KeyValue, RowHandle>>,
}

impl PrimaryKeyResolver {
    /// Creates an empty resolver.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the row holding the key, consulting the cache before the
    /// store.
    pub(crate) fn resolve(
        &mut self,
        store: &Store,
        type_name: &str,
        key: &KeyValue,
    ) -> StoreResult<Option<RowHandle>> {
        if let Some(handle) = self.cache.get(type_name).and_then(|keys| keys.get(key)) {
            return Ok(Some(*handle));
        }
        match store.find_row_by_key(type_name, key)? {
            Some(handle) => {
                self.register(type_name, key.clone(), handle);
                Ok(Some(handle))
            }
            None => Ok(None),
        }
    }

    /// Populates the cache for a freshly created row.
    pub(crate) fn register(&mut self, type_name: &str, key: KeyValue, handle: RowHandle) {
        self.cache
            .entry(type_name.to_string())
            .or_default()
            .insert(key, handle);
    }
}
