//! Call-scoped identity tracking.

use crate::object::ObjectTag;
use lattice_store::RowHandle;
use std::collections::HashMap;

/// Maps source-object identity to the row already created for it.
///
/// One tracker exists per top-level engine call and is discarded
/// wholesale at its end; entries are never removed and never survive a
/// call. Keying is strictly by identity tag, so structurally equal but
/// distinct instances get distinct entries.
#[derive(Debug, Default)]
pub(crate) struct IdentityTracker {
    entries: HashMap<ObjectTag, RowHandle>,
}

impl IdentityTracker {
    /// Creates an empty tracker.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the row registered for an identity, if any.
    pub(crate) fn get(&self, tag: ObjectTag) -> Option<RowHandle> {
        self.entries.get(&tag).copied()
    }

    /// Registers the row created for an identity.
    pub(crate) fn put(&mut self, tag: ObjectTag, handle: RowHandle) {
        self.entries.insert(tag, handle);
    }
}
