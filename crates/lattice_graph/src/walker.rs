//! Depth-first graph traversal and the public engine operations.

use crate::adapter::StoreWriter;
use crate::error::{GraphError, GraphResult};
use crate::identity::IdentityTracker;
use crate::object::{FieldValue, Object};
use crate::resolver::PrimaryKeyResolver;
use lattice_model::{FieldKind, TypeDescriptor, Value};
use lattice_store::{RowHandle, Store, StoreError};
use tracing::{debug, trace};

/// Insertion mode: whether primary keys reconcile against existing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Every node gets a fresh row; duplicate keys surface as constraint
    /// violations from the store.
    Insert,
    /// Keyed nodes merge into the row holding their key value, creating
    /// one only when none exists.
    Upsert,
}

/// Inserts one object graph, creating a fresh row per distinct identity.
///
/// Requires an open write transaction on `store`; the engine never
/// commits or cancels it. Fails with [`GraphError::UnknownType`] when the
/// object's type (or any reachable type) has no catalog entry.
pub fn insert(store: &Store, object: &Object) -> GraphResult<()> {
    let mut walker = GraphWalker::new(store, Mode::Insert)?;
    debug!(mode = ?Mode::Insert, "bulk insertion started");
    walker.walk(object)?;
    Ok(())
}

/// Inserts an ordered sequence of object graphs.
///
/// Elements are visited in order. A `None` element fails with
/// [`GraphError::InvalidArgument`] at the point it is reached; rows
/// already created for earlier elements remain in the open transaction —
/// the engine performs no rollback of its own, so discarding them is the
/// caller's [`Store::cancel`].
pub fn insert_all(store: &Store, objects: &[Option<Object>]) -> GraphResult<()> {
    let mut walker = GraphWalker::new(store, Mode::Insert)?;
    walker.walk_sequence(objects)
}

/// Inserts or updates one object graph.
///
/// Nodes of primary-key types are reconciled by key value: an existing
/// row with the node's key (from this call or already in the store) is
/// merged into, last write wins. Non-keyed types always get fresh rows.
/// Objects bound to a row via [`Object::bind_row`] merge into that row.
pub fn insert_or_update(store: &Store, object: &Object) -> GraphResult<()> {
    let mut walker = GraphWalker::new(store, Mode::Upsert)?;
    debug!(mode = ?Mode::Upsert, "bulk insertion started");
    walker.walk(object)?;
    Ok(())
}

/// Inserts or updates an ordered sequence of object graphs.
///
/// Null-element and partial-failure behavior match [`insert_all`]; key
/// reconciliation matches [`insert_or_update`].
pub fn insert_or_update_all(store: &Store, objects: &[Option<Object>]) -> GraphResult<()> {
    let mut walker = GraphWalker::new(store, Mode::Upsert)?;
    walker.walk_sequence(objects)
}

/// One top-level call's traversal state.
///
/// The identity tracker and key resolver live exactly as long as the
/// walker; nothing is carried across calls.
struct GraphWalker<'a> {
    writer: StoreWriter<'a>,
    mode: Mode,
    identities: IdentityTracker,
    resolver: PrimaryKeyResolver,
}

impl<'a> GraphWalker<'a> {
    fn new(store: &'a Store, mode: Mode) -> GraphResult<Self> {
        if !store.is_in_transaction() {
            return Err(GraphError::TransactionState);
        }
        Ok(Self {
            writer: StoreWriter::new(store),
            mode,
            identities: IdentityTracker::new(),
            resolver: PrimaryKeyResolver::new(),
        })
    }

    fn walk_sequence(&mut self, objects: &[Option<Object>]) -> GraphResult<()> {
        debug!(mode = ?self.mode, count = objects.len(), "bulk insertion started");
        for (position, slot) in objects.iter().enumerate() {
            let object = slot.as_ref().ok_or_else(|| {
                GraphError::invalid_argument(format!("object at position {position} is missing"))
            })?;
            self.walk(object)?;
        }
        Ok(())
    }

    /// Materializes one node and everything reachable from it, returning
    /// the node's row.
    fn walk(&mut self, object: &Object) -> GraphResult<RowHandle> {
        let type_name = object.type_name();
        let descriptor = self
            .writer
            .store()
            .catalog()
            .descriptor(&type_name)
            .ok_or_else(|| GraphError::unknown_type(&type_name))?;

        // Same instance seen again in this call: its row already carries
        // (or is in the middle of receiving) this node's data.
        if let Some(handle) = self.identities.get(object.tag()) {
            return Ok(handle);
        }

        let (handle, merged) = self.row_for(object, descriptor, &type_name)?;

        // Registered before descending, so a cyclic back-reference
        // resolves to this row instead of recursing.
        self.identities.put(object.tag(), handle);
        trace!(%handle, type_name, merged, "node materialized");

        self.write_scalars(handle, object, descriptor)?;
        self.write_references(handle, object, descriptor)?;
        self.write_object_lists(handle, object, descriptor)?;
        self.write_scalar_lists(handle, object, descriptor)?;
        Ok(handle)
    }

    /// Picks the row a node materializes into: a reused one (managed
    /// binding or key match, upsert only) or a fresh one.
    fn row_for(
        &mut self,
        object: &Object,
        descriptor: &TypeDescriptor,
        type_name: &str,
    ) -> GraphResult<(RowHandle, bool)> {
        if self.mode == Mode::Upsert {
            if let Some(bound) = object.bound_row() {
                return Ok((bound, true));
            }
            if descriptor.has_primary_key() {
                if let Some(key) = self.writer.primary_key_value(descriptor, object)? {
                    return match self.resolver.resolve(self.writer.store(), type_name, &key)? {
                        Some(existing) => Ok((existing, true)),
                        None => {
                            let created = self.writer.create_row(type_name)?;
                            self.resolver.register(type_name, key, created);
                            Ok((created, false))
                        }
                    };
                }
            }
        }
        Ok((self.writer.create_row(type_name)?, false))
    }

    fn write_scalars(
        &mut self,
        handle: RowHandle,
        object: &Object,
        descriptor: &TypeDescriptor,
    ) -> GraphResult<()> {
        for field in descriptor.fields() {
            if !matches!(field.kind, FieldKind::Scalar(_)) {
                continue;
            }
            let value = match object.field(&field.name) {
                Some(FieldValue::Scalar(value)) => value,
                Some(other) => return Err(shape_mismatch(descriptor, &field.name, &other)),
                None => Value::Null,
            };
            self.writer.write_scalar(handle, &field.name, value)?;
        }
        Ok(())
    }

    fn write_references(
        &mut self,
        handle: RowHandle,
        object: &Object,
        descriptor: &TypeDescriptor,
    ) -> GraphResult<()> {
        for field in descriptor.fields() {
            if !matches!(field.kind, FieldKind::Object { .. }) {
                continue;
            }
            match object.field(&field.name) {
                Some(FieldValue::Object(Some(child))) => {
                    let child_handle = self.walk(&child)?;
                    self.writer
                        .write_reference(handle, &field.name, Some(child_handle))?;
                }
                Some(FieldValue::Object(None)) | None => {
                    self.writer.write_reference(handle, &field.name, None)?;
                }
                Some(other) => return Err(shape_mismatch(descriptor, &field.name, &other)),
            }
        }
        Ok(())
    }

    fn write_object_lists(
        &mut self,
        handle: RowHandle,
        object: &Object,
        descriptor: &TypeDescriptor,
    ) -> GraphResult<()> {
        for field in descriptor.fields() {
            if !matches!(field.kind, FieldKind::ObjectList { .. }) {
                continue;
            }
            let elements = match object.field(&field.name) {
                Some(FieldValue::ObjectList(elements)) => elements,
                Some(other) => return Err(shape_mismatch(descriptor, &field.name, &other)),
                None => Vec::new(),
            };
            let list = self.writer.begin_list(handle, &field.name)?;
            for element in &elements {
                match element {
                    Some(child) => {
                        let child_handle = self.walk(child)?;
                        self.writer.append_object(list, Some(child_handle))?;
                    }
                    None => self.writer.append_object(list, None)?,
                }
            }
        }
        Ok(())
    }

    fn write_scalar_lists(
        &mut self,
        handle: RowHandle,
        object: &Object,
        descriptor: &TypeDescriptor,
    ) -> GraphResult<()> {
        for field in descriptor.fields() {
            if !matches!(field.kind, FieldKind::ScalarList(_)) {
                continue;
            }
            let values = match object.field(&field.name) {
                Some(FieldValue::ScalarList(values)) => values,
                Some(other) => return Err(shape_mismatch(descriptor, &field.name, &other)),
                None => Vec::new(),
            };
            self.writer.write_scalar_list(handle, &field.name, values)?;
        }
        Ok(())
    }
}

/// A field value whose shape disagrees with the declared field kind.
fn shape_mismatch(descriptor: &TypeDescriptor, field: &str, value: &FieldValue) -> GraphError {
    let actual = match value {
        FieldValue::Scalar(_) => "scalar",
        FieldValue::Object(_) => "object reference",
        FieldValue::ObjectList(_) => "object list",
        FieldValue::ScalarList(_) => "scalar list",
    };
    let expected = match descriptor.field(field).map(|(_, f)| &f.kind) {
        Some(FieldKind::Scalar(kind)) => format!("scalar({kind})"),
        Some(FieldKind::Object { target }) => format!("object({target})"),
        Some(FieldKind::ObjectList { target }) => format!("list<{target}>"),
        Some(FieldKind::ScalarList(kind)) => format!("list<{kind}>"),
        None => "declared kind".to_string(),
    };
    StoreError::type_mismatch(descriptor.name(), field, expected, actual).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_model::{FieldDescriptor, ScalarKind, SchemaCatalog, TypeDescriptor};

    fn store() -> Store {
        let mut catalog = SchemaCatalog::new();
        catalog
            .register(
                TypeDescriptor::new(
                    "Dog",
                    vec![FieldDescriptor::scalar("name", ScalarKind::Text).nullable()],
                )
                .unwrap(),
            )
            .unwrap();
        Store::new(catalog).unwrap()
    }

    #[test]
    fn requires_open_transaction() {
        let store = store();
        let object = Object::new("Dog");
        let result = insert(&store, &object);
        assert!(matches!(result, Err(GraphError::TransactionState)));
    }

    #[test]
    fn unknown_type_rejected_before_any_write() {
        let store = store();
        store.begin_write().unwrap();
        let result = insert(&store, &Object::new("Cat"));
        assert!(matches!(result, Err(GraphError::UnknownType { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_sequence_element_is_invalid_argument() {
        let store = store();
        store.begin_write().unwrap();
        let result = insert_all(&store, &[None]);
        assert!(matches!(result, Err(GraphError::InvalidArgument { .. })));
    }

    #[test]
    fn shape_mismatch_is_reported_not_coerced() {
        let store = store();
        store.begin_write().unwrap();
        let object = Object::new("Dog");
        object.set_scalar_list("name", vec![Value::from("Rex")]);
        let result = insert(&store, &object);
        assert!(matches!(
            result,
            Err(GraphError::Store(StoreError::TypeMismatch { .. }))
        ));
    }
}
