//! The store: tables, write transactions, field access.

use crate::error::{StoreError, StoreResult};
use crate::table::{Column, Table};
use crate::types::{ListHandle, RowHandle, TableId};
use lattice_model::{FieldDescriptor, FieldKind, KeyValue, SchemaCatalog, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};

/// A transactional in-memory row store.
///
/// A store holds one table per type registered in its catalog. All
/// mutation happens inside a single write transaction opened with
/// [`Store::begin_write`] and closed with [`Store::commit`] or
/// [`Store::cancel`]; cancellation restores the snapshot taken at begin.
/// Reads are allowed at any time and observe the current state (which,
/// inside a transaction, includes its uncommitted writes).
///
/// Transaction state is an explicit owned value inside the store; it is
/// created by `begin_write` and destroyed on both `commit` and `cancel`,
/// so there is no cleanup left to finalization. For scoped use, prefer
/// [`Store::write_transaction`], which releases the transaction on every
/// exit path.
///
/// # Example
///
/// ```rust,ignore
/// let store = Store::new(catalog)?;
/// store.write_transaction(|store| {
///     let row = store.create_row("Dog")?;
///     store.write_scalar(row, "name", Value::from("Rex"))?;
///     Ok(())
/// })?;
/// ```
pub struct Store {
    /// Immutable schema, fixed at construction.
    catalog: SchemaCatalog,
    /// Mutable table state.
    state: RwLock<StoreState>,
}

struct StoreState {
    tables: Vec<Table>,
    ids: HashMap<String, TableId>,
    version: u64,
    txn: Option<TxnState>,
}

/// Owned state of the open write transaction.
struct TxnState {
    snapshot: Vec<Table>,
}

impl StoreState {
    fn ensure_txn(&self) -> StoreResult<()> {
        if self.txn.is_none() {
            return Err(StoreError::transaction_state(
                "no write transaction is open",
            ));
        }
        Ok(())
    }

    fn table_id(&self, name: &str) -> StoreResult<TableId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::unknown_type(name))
    }

    fn table(&self, name: &str) -> StoreResult<(TableId, &Table)> {
        let id = self.table_id(name)?;
        Ok((id, &self.tables[id.as_index()]))
    }

    /// Resolves a handle's field declaration and current column value.
    fn column(&self, handle: RowHandle, field: &str) -> StoreResult<(&FieldDescriptor, &Column)> {
        let table = self
            .tables
            .get(handle.table.as_index())
            .ok_or(StoreError::RowNotFound { handle })?;
        let (index, descriptor) = table
            .descriptor
            .field(field)
            .ok_or_else(|| StoreError::unknown_field(table.descriptor.name(), field))?;
        let row = table
            .rows
            .get(&handle.row)
            .ok_or(StoreError::RowNotFound { handle })?;
        Ok((descriptor, &row.columns[index]))
    }

    /// Checks that `target` is a live row of the named type.
    fn check_target(
        &self,
        type_name: &str,
        field: &str,
        target_type: &str,
        target: RowHandle,
    ) -> StoreResult<()> {
        let expected = self.table_id(target_type)?;
        if target.table != expected {
            let actual = self
                .tables
                .get(target.table.as_index())
                .map_or_else(|| target.table.to_string(), |t| t.descriptor.name().to_string());
            return Err(StoreError::type_mismatch(
                type_name,
                field,
                target_type,
                actual,
            ));
        }
        let table = &self.tables[expected.as_index()];
        if !table.rows.contains_key(&target.row) {
            return Err(StoreError::RowNotFound { handle: target });
        }
        Ok(())
    }
}

impl Store {
    /// Creates a store with one table per catalog type.
    ///
    /// The catalog is validated first: every object reference must target
    /// a registered type.
    pub fn new(catalog: SchemaCatalog) -> StoreResult<Self> {
        catalog.validate()?;
        let mut tables = Vec::with_capacity(catalog.len());
        let mut ids = HashMap::new();
        for descriptor in catalog.iter() {
            let id = TableId::new(tables.len() as u32);
            ids.insert(descriptor.name().to_string(), id);
            tables.push(Table::new(descriptor.clone()));
        }
        Ok(Self {
            catalog,
            state: RwLock::new(StoreState {
                tables,
                ids,
                version: 0,
                txn: None,
            }),
        })
    }

    /// Returns the schema catalog the store was built from.
    #[must_use]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    // === Transaction lifecycle ===

    /// Opens the write transaction.
    ///
    /// Fails if a transaction is already open. The current table state is
    /// snapshotted and restored wholesale by [`Store::cancel`].
    pub fn begin_write(&self) -> StoreResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        if state.txn.is_some() {
            return Err(StoreError::transaction_state(
                "a write transaction is already open",
            ));
        }
        let snapshot = state.tables.clone();
        state.txn = Some(TxnState { snapshot });
        debug!(version = state.version, "write transaction started");
        Ok(())
    }

    /// Commits the open write transaction and bumps the store version.
    pub fn commit(&self) -> StoreResult<u64> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        if state.txn.take().is_none() {
            return Err(StoreError::transaction_state(
                "no write transaction to commit",
            ));
        }
        state.version += 1;
        debug!(version = state.version, "write transaction committed");
        Ok(state.version)
    }

    /// Cancels the open write transaction, discarding every row created
    /// and every field written since [`Store::begin_write`].
    pub fn cancel(&self) -> StoreResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        match state.txn.take() {
            Some(txn) => {
                state.tables = txn.snapshot;
                debug!(version = state.version, "write transaction cancelled");
                Ok(())
            }
            None => Err(StoreError::transaction_state(
                "no write transaction to cancel",
            )),
        }
    }

    /// Returns true while the write transaction is open.
    #[must_use]
    pub fn is_in_transaction(&self) -> bool {
        self.state.read().txn.is_some()
    }

    /// Executes a function within a write transaction.
    ///
    /// If the function returns `Ok`, the transaction is committed.
    /// If it returns `Err`, the transaction is cancelled.
    pub fn write_transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Store) -> StoreResult<T>,
    {
        self.begin_write()?;
        match f(self) {
            Ok(result) => {
                self.commit()?;
                Ok(result)
            }
            Err(e) => {
                // Try to cancel, but don't mask the original error
                let _ = self.cancel();
                Err(e)
            }
        }
    }

    // === Row creation and key lookup ===

    /// Allocates a row of the named type with all columns empty.
    pub fn create_row(&self, type_name: &str) -> StoreResult<RowHandle> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.ensure_txn()?;
        let id = state.table_id(type_name)?;
        let row = state.tables[id.as_index()].create_row();
        let handle = RowHandle::new(id, row);
        trace!(%handle, type_name, "row created");
        Ok(handle)
    }

    /// Finds the row of the named type holding the given primary-key
    /// value, if any.
    ///
    /// Fails if the type declares no primary key.
    pub fn find_row_by_key(
        &self,
        type_name: &str,
        key: &KeyValue,
    ) -> StoreResult<Option<RowHandle>> {
        let guard = self.state.read();
        let (id, table) = guard.table(type_name)?;
        if !table.descriptor.has_primary_key() {
            return Err(StoreError::NoPrimaryKey {
                name: type_name.to_string(),
            });
        }
        Ok(table
            .key_index
            .get(key)
            .map(|row| RowHandle::new(id, *row)))
    }

    // === Field writes ===

    /// Writes a scalar field, enforcing kind, nullability and any key or
    /// unique constraint on the field.
    ///
    /// Writing a primary-key or unique value held by a *different* row of
    /// the same table is a [`StoreError::ConstraintViolation`].
    pub fn write_scalar(&self, handle: RowHandle, field: &str, value: Value) -> StoreResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.ensure_txn()?;
        let table = state
            .tables
            .get_mut(handle.table.as_index())
            .ok_or(StoreError::RowNotFound { handle })?;
        let type_name = table.descriptor.name().to_string();
        let (index, kind, nullable, is_key, is_unique) = {
            let (index, descriptor) = table
                .descriptor
                .field(field)
                .ok_or_else(|| StoreError::unknown_field(&type_name, field))?;
            let kind = match descriptor.kind {
                FieldKind::Scalar(kind) => kind,
                ref other => {
                    return Err(StoreError::type_mismatch(
                        &type_name,
                        field,
                        kind_description(other),
                        format!("scalar {}", value.kind_name()),
                    ))
                }
            };
            (
                index,
                kind,
                descriptor.nullable,
                descriptor.primary_key,
                descriptor.unique && !descriptor.primary_key,
            )
        };
        if !table.rows.contains_key(&handle.row) {
            return Err(StoreError::RowNotFound { handle });
        }

        if value.is_null() {
            if !nullable {
                return Err(StoreError::null_disallowed(&type_name, field));
            }
        } else if !kind.accepts(&value) {
            return Err(StoreError::type_mismatch(
                &type_name,
                field,
                kind.name(),
                value.kind_name(),
            ));
        }

        if is_key || is_unique {
            let new_key = match KeyValue::from_value(&value) {
                Some(key) => key,
                None => {
                    return Err(StoreError::type_mismatch(
                        &type_name,
                        field,
                        kind.name(),
                        value.kind_name(),
                    ))
                }
            };
            let old_key = table.rows.get(&handle.row).and_then(|row| {
                match &row.columns[index] {
                    Column::Scalar(old) => KeyValue::from_value(old),
                    _ => None,
                }
            });
            let index_map = if is_key {
                &mut table.key_index
            } else {
                table.unique_indexes.entry(index).or_default()
            };
            if let Some(existing) = index_map.get(&new_key) {
                if *existing != handle.row {
                    return Err(StoreError::constraint_violation(&type_name, field, new_key));
                }
            }
            if let Some(old) = old_key {
                if index_map.get(&old) == Some(&handle.row) {
                    index_map.remove(&old);
                }
            }
            index_map.insert(new_key, handle.row);
        }

        let row = table
            .rows
            .get_mut(&handle.row)
            .ok_or(StoreError::RowNotFound { handle })?;
        row.columns[index] = Column::Scalar(value);
        Ok(())
    }

    /// Writes a single-object reference field (or clears it with `None`).
    pub fn write_reference(
        &self,
        handle: RowHandle,
        field: &str,
        target: Option<RowHandle>,
    ) -> StoreResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.ensure_txn()?;
        let (type_name, index, target_type) = {
            let (descriptor, _) = state.column(handle, field)?;
            let target_type = match &descriptor.kind {
                FieldKind::Object { target } => target.clone(),
                other => {
                    return Err(StoreError::type_mismatch(
                        table_name(state, handle),
                        field,
                        kind_description(other),
                        "object reference",
                    ))
                }
            };
            let table = &state.tables[handle.table.as_index()];
            let (index, _) = table
                .descriptor
                .field(field)
                .ok_or_else(|| StoreError::unknown_field(table.descriptor.name(), field))?;
            (table.descriptor.name().to_string(), index, target_type)
        };
        if let Some(target_handle) = target {
            state.check_target(&type_name, field, &target_type, target_handle)?;
        }
        let table = state
            .tables
            .get_mut(handle.table.as_index())
            .ok_or(StoreError::RowNotFound { handle })?;
        let row = table
            .rows
            .get_mut(&handle.row)
            .ok_or(StoreError::RowNotFound { handle })?;
        row.columns[index] = Column::Reference(target);
        Ok(())
    }

    /// Resets an object-list field to empty and returns a handle for
    /// appending, replacing any previous contents.
    pub fn create_list(&self, handle: RowHandle, field: &str) -> StoreResult<ListHandle> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.ensure_txn()?;
        let index = {
            let (descriptor, _) = state.column(handle, field)?;
            if !matches!(descriptor.kind, FieldKind::ObjectList { .. }) {
                return Err(StoreError::type_mismatch(
                    table_name(state, handle),
                    field,
                    kind_description(&descriptor.kind),
                    "object list",
                ));
            }
            let table = &state.tables[handle.table.as_index()];
            table
                .descriptor
                .field(field)
                .map(|(index, _)| index)
                .ok_or_else(|| StoreError::unknown_field(table.descriptor.name(), field))?
        };
        let table = &mut state.tables[handle.table.as_index()];
        let row = table
            .rows
            .get_mut(&handle.row)
            .ok_or(StoreError::RowNotFound { handle })?;
        row.columns[index] = Column::ObjectList(Vec::new());
        Ok(ListHandle {
            row: handle,
            field: index,
        })
    }

    /// Appends a row reference (or a null element) to an object list.
    ///
    /// Null elements are accepted only when the list field is declared
    /// nullable.
    pub fn append_object(&self, list: ListHandle, element: Option<RowHandle>) -> StoreResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.ensure_txn()?;
        let handle = list.row;
        let (type_name, target_type, nullable) = {
            let table = state
                .tables
                .get(handle.table.as_index())
                .ok_or(StoreError::RowNotFound { handle })?;
            let descriptor = table
                .descriptor
                .fields()
                .get(list.field)
                .ok_or_else(|| StoreError::unknown_field(table.descriptor.name(), "<list>"))?;
            let target_type = match &descriptor.kind {
                FieldKind::ObjectList { target } => target.clone(),
                other => {
                    return Err(StoreError::type_mismatch(
                        table.descriptor.name(),
                        &descriptor.name,
                        kind_description(other),
                        "object list",
                    ))
                }
            };
            (
                table.descriptor.name().to_string(),
                target_type,
                descriptor.nullable,
            )
        };
        let field_name = state.tables[handle.table.as_index()].descriptor.fields()[list.field]
            .name
            .clone();
        match element {
            Some(target_handle) => {
                state.check_target(&type_name, &field_name, &target_type, target_handle)?;
            }
            None => {
                if !nullable {
                    return Err(StoreError::null_disallowed(&type_name, &field_name));
                }
            }
        }
        let table = &mut state.tables[handle.table.as_index()];
        let row = table
            .rows
            .get_mut(&handle.row)
            .ok_or(StoreError::RowNotFound { handle })?;
        match &mut row.columns[list.field] {
            Column::ObjectList(items) => {
                items.push(element);
                Ok(())
            }
            _ => Err(StoreError::type_mismatch(
                type_name,
                field_name,
                "object list",
                "non-list column",
            )),
        }
    }

    /// Replaces a scalar-list field with the given ordered values.
    ///
    /// Each element must match the declared element kind; null elements
    /// require the field to be declared nullable.
    pub fn write_scalar_list(
        &self,
        handle: RowHandle,
        field: &str,
        values: Vec<Value>,
    ) -> StoreResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.ensure_txn()?;
        let (type_name, index, kind, nullable) = {
            let (descriptor, _) = state.column(handle, field)?;
            let kind = match descriptor.kind {
                FieldKind::ScalarList(kind) => kind,
                ref other => {
                    return Err(StoreError::type_mismatch(
                        table_name(state, handle),
                        field,
                        kind_description(other),
                        "scalar list",
                    ))
                }
            };
            let table = &state.tables[handle.table.as_index()];
            let (index, _) = table
                .descriptor
                .field(field)
                .ok_or_else(|| StoreError::unknown_field(table.descriptor.name(), field))?;
            (
                table.descriptor.name().to_string(),
                index,
                kind,
                descriptor.nullable,
            )
        };
        for value in &values {
            if value.is_null() {
                if !nullable {
                    return Err(StoreError::null_disallowed(&type_name, field));
                }
            } else if !kind.accepts(value) {
                return Err(StoreError::type_mismatch(
                    &type_name,
                    field,
                    kind.name(),
                    value.kind_name(),
                ));
            }
        }
        let table = &mut state.tables[handle.table.as_index()];
        let row = table
            .rows
            .get_mut(&handle.row)
            .ok_or(StoreError::RowNotFound { handle })?;
        row.columns[index] = Column::ScalarList(values);
        Ok(())
    }

    // === Reads ===

    /// Reads a scalar field.
    pub fn scalar(&self, handle: RowHandle, field: &str) -> StoreResult<Value> {
        let guard = self.state.read();
        let (descriptor, column) = guard.column(handle, field)?;
        match column {
            Column::Scalar(value) => Ok(value.clone()),
            _ => Err(StoreError::type_mismatch(
                table_name(&guard, handle),
                &descriptor.name,
                kind_description(&descriptor.kind),
                "scalar",
            )),
        }
    }

    /// Reads a single-object reference field.
    pub fn reference(&self, handle: RowHandle, field: &str) -> StoreResult<Option<RowHandle>> {
        let guard = self.state.read();
        let (descriptor, column) = guard.column(handle, field)?;
        match column {
            Column::Reference(target) => Ok(*target),
            _ => Err(StoreError::type_mismatch(
                table_name(&guard, handle),
                &descriptor.name,
                kind_description(&descriptor.kind),
                "object reference",
            )),
        }
    }

    /// Reads an object-list field in list order.
    pub fn object_list(&self, handle: RowHandle, field: &str) -> StoreResult<Vec<Option<RowHandle>>> {
        let guard = self.state.read();
        let (descriptor, column) = guard.column(handle, field)?;
        match column {
            Column::ObjectList(items) => Ok(items.clone()),
            _ => Err(StoreError::type_mismatch(
                table_name(&guard, handle),
                &descriptor.name,
                kind_description(&descriptor.kind),
                "object list",
            )),
        }
    }

    /// Reads a scalar-list field in list order.
    pub fn scalar_list(&self, handle: RowHandle, field: &str) -> StoreResult<Vec<Value>> {
        let guard = self.state.read();
        let (descriptor, column) = guard.column(handle, field)?;
        match column {
            Column::ScalarList(values) => Ok(values.clone()),
            _ => Err(StoreError::type_mismatch(
                table_name(&guard, handle),
                &descriptor.name,
                kind_description(&descriptor.kind),
                "scalar list",
            )),
        }
    }

    // === Introspection ===

    /// Returns all rows of the named type in creation order.
    pub fn rows(&self, type_name: &str) -> StoreResult<Vec<RowHandle>> {
        let guard = self.state.read();
        let (id, table) = guard.table(type_name)?;
        Ok(table.row_ids().map(|row| RowHandle::new(id, row)).collect())
    }

    /// Returns the number of rows of the named type.
    pub fn count(&self, type_name: &str) -> StoreResult<usize> {
        let guard = self.state.read();
        let (_, table) = guard.table(type_name)?;
        Ok(table.len())
    }

    /// Returns the total number of rows across all types.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.state.read().tables.iter().map(Table::len).sum()
    }

    /// Returns true if no rows exist in any table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }

    /// Returns true if the store has a table for the named type.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    /// Returns the commit version, bumped once per committed transaction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.read().version
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("types", &self.catalog.len())
            .field("total_rows", &self.total_rows())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

fn table_name(state: &StoreState, handle: RowHandle) -> String {
    state
        .tables
        .get(handle.table.as_index())
        .map_or_else(|| handle.table.to_string(), |t| t.descriptor.name().to_string())
}

fn kind_description(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Scalar(kind) => format!("scalar({kind})"),
        FieldKind::Object { target } => format!("object({target})"),
        FieldKind::ObjectList { target } => format!("list<{target}>"),
        FieldKind::ScalarList(kind) => format!("list<{kind}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_model::{FieldDescriptor, ScalarKind, TypeDescriptor};

    fn catalog() -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new();
        catalog
            .register(
                TypeDescriptor::new(
                    "Dog",
                    vec![
                        FieldDescriptor::scalar("id", ScalarKind::Int).primary_key(),
                        FieldDescriptor::scalar("name", ScalarKind::Text).nullable(),
                        FieldDescriptor::scalar("chip", ScalarKind::Text).unique().nullable(),
                        FieldDescriptor::object("friend", "Dog"),
                        FieldDescriptor::object_list("pups", "Dog").nullable(),
                        FieldDescriptor::scalar_list("nicknames", ScalarKind::Text),
                    ],
                )
                .unwrap(),
            )
            .unwrap();
        catalog
    }

    fn store() -> Store {
        Store::new(catalog()).unwrap()
    }

    #[test]
    fn create_row_requires_transaction() {
        let store = store();
        let result = store.create_row("Dog");
        assert!(matches!(result, Err(StoreError::TransactionState { .. })));
    }

    #[test]
    fn begin_twice_fails() {
        let store = store();
        store.begin_write().unwrap();
        assert!(matches!(
            store.begin_write(),
            Err(StoreError::TransactionState { .. })
        ));
    }

    #[test]
    fn commit_without_transaction_fails() {
        let store = store();
        assert!(matches!(
            store.commit(),
            Err(StoreError::TransactionState { .. })
        ));
        assert!(matches!(
            store.cancel(),
            Err(StoreError::TransactionState { .. })
        ));
    }

    #[test]
    fn write_and_read_scalar() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        store.write_scalar(row, "id", Value::Int(1)).unwrap();
        store.write_scalar(row, "name", Value::from("Rex")).unwrap();
        store.commit().unwrap();

        assert_eq!(store.scalar(row, "name").unwrap(), Value::from("Rex"));
        assert_eq!(store.scalar(row, "id").unwrap(), Value::Int(1));
    }

    #[test]
    fn cancel_restores_snapshot() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        store.write_scalar(row, "id", Value::Int(1)).unwrap();
        store.commit().unwrap();
        assert_eq!(store.count("Dog").unwrap(), 1);

        store.begin_write().unwrap();
        store.create_row("Dog").unwrap();
        store.create_row("Dog").unwrap();
        assert_eq!(store.count("Dog").unwrap(), 3);
        store.cancel().unwrap();

        assert_eq!(store.count("Dog").unwrap(), 1);
        assert_eq!(store.scalar(row, "id").unwrap(), Value::Int(1));
    }

    #[test]
    fn version_bumps_on_commit_only() {
        let store = store();
        assert_eq!(store.version(), 0);

        store.begin_write().unwrap();
        store.create_row("Dog").unwrap();
        store.commit().unwrap();
        assert_eq!(store.version(), 1);

        store.begin_write().unwrap();
        store.cancel().unwrap();
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn duplicate_primary_key_rejected() {
        let store = store();
        store.begin_write().unwrap();
        let first = store.create_row("Dog").unwrap();
        store.write_scalar(first, "id", Value::Int(7)).unwrap();
        let second = store.create_row("Dog").unwrap();
        let result = store.write_scalar(second, "id", Value::Int(7));
        assert!(matches!(
            result,
            Err(StoreError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn rewriting_same_key_to_same_row_is_allowed() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        store.write_scalar(row, "id", Value::Int(7)).unwrap();
        store.write_scalar(row, "id", Value::Int(7)).unwrap();
        store.write_scalar(row, "id", Value::Int(8)).unwrap();

        // Old key entry is released when the row moves to a new key.
        let free = store.create_row("Dog").unwrap();
        store.write_scalar(free, "id", Value::Int(7)).unwrap();
    }

    #[test]
    fn unique_field_rejected_on_duplicate() {
        let store = store();
        store.begin_write().unwrap();
        let first = store.create_row("Dog").unwrap();
        store
            .write_scalar(first, "chip", Value::from("abc"))
            .unwrap();
        let second = store.create_row("Dog").unwrap();
        let result = store.write_scalar(second, "chip", Value::from("abc"));
        assert!(matches!(
            result,
            Err(StoreError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn find_row_by_key() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        store.write_scalar(row, "id", Value::Int(42)).unwrap();

        let found = store.find_row_by_key("Dog", &KeyValue::Int(42)).unwrap();
        assert_eq!(found, Some(row));
        let missing = store.find_row_by_key("Dog", &KeyValue::Int(43)).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn type_mismatch_is_not_coerced() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        let result = store.write_scalar(row, "id", Value::from("7"));
        assert!(matches!(result, Err(StoreError::TypeMismatch { .. })));
    }

    #[test]
    fn null_rejected_on_non_nullable_field() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        let result = store.write_scalar(row, "id", Value::Null);
        assert!(matches!(result, Err(StoreError::NullDisallowed { .. })));

        // "name" is nullable.
        store.write_scalar(row, "name", Value::Null).unwrap();
        assert_eq!(store.scalar(row, "name").unwrap(), Value::Null);
    }

    #[test]
    fn reference_write_and_read() {
        let store = store();
        store.begin_write().unwrap();
        let a = store.create_row("Dog").unwrap();
        let b = store.create_row("Dog").unwrap();
        store.write_reference(a, "friend", Some(b)).unwrap();
        assert_eq!(store.reference(a, "friend").unwrap(), Some(b));

        store.write_reference(a, "friend", None).unwrap();
        assert_eq!(store.reference(a, "friend").unwrap(), None);
    }

    #[test]
    fn list_create_append_and_replace() {
        let store = store();
        store.begin_write().unwrap();
        let parent = store.create_row("Dog").unwrap();
        let pup = store.create_row("Dog").unwrap();

        let list = store.create_list(parent, "pups").unwrap();
        store.append_object(list, Some(pup)).unwrap();
        store.append_object(list, None).unwrap();
        assert_eq!(
            store.object_list(parent, "pups").unwrap(),
            vec![Some(pup), None]
        );

        // Recreating the list replaces its contents.
        store.create_list(parent, "pups").unwrap();
        assert!(store.object_list(parent, "pups").unwrap().is_empty());
    }

    #[test]
    fn scalar_list_round_trip() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        let values = vec![Value::from("Rexy"), Value::from("Boss")];
        store
            .write_scalar_list(row, "nicknames", values.clone())
            .unwrap();
        assert_eq!(store.scalar_list(row, "nicknames").unwrap(), values);
    }

    #[test]
    fn scalar_list_element_kind_enforced() {
        let store = store();
        store.begin_write().unwrap();
        let row = store.create_row("Dog").unwrap();
        let result = store.write_scalar_list(row, "nicknames", vec![Value::Int(1)]);
        assert!(matches!(result, Err(StoreError::TypeMismatch { .. })));
    }

    #[test]
    fn unknown_type_and_field() {
        let store = store();
        store.begin_write().unwrap();
        assert!(matches!(
            store.create_row("Cat"),
            Err(StoreError::UnknownType { .. })
        ));
        let row = store.create_row("Dog").unwrap();
        assert!(matches!(
            store.write_scalar(row, "missing", Value::Int(1)),
            Err(StoreError::UnknownField { .. })
        ));
    }

    #[test]
    fn write_transaction_commits_on_ok() {
        let store = store();
        store
            .write_transaction(|store| {
                let row = store.create_row("Dog")?;
                store.write_scalar(row, "id", Value::Int(1))?;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.count("Dog").unwrap(), 1);
        assert!(!store.is_in_transaction());
    }

    #[test]
    fn write_transaction_cancels_on_err() {
        let store = store();
        let result: StoreResult<()> = store.write_transaction(|store| {
            store.create_row("Dog")?;
            Err(StoreError::transaction_state("boom"))
        });
        assert!(result.is_err());
        assert_eq!(store.count("Dog").unwrap(), 0);
        assert!(!store.is_in_transaction());
    }

    #[test]
    fn introspection() {
        let store = store();
        assert!(store.is_empty());
        assert!(store.has_type("Dog"));
        assert!(!store.has_type("Cat"));

        store.begin_write().unwrap();
        store.create_row("Dog").unwrap();
        store.commit().unwrap();
        assert_eq!(store.total_rows(), 1);
        assert!(!store.is_empty());
    }
}
