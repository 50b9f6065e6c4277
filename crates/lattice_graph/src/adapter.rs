//! Store-facing write adapter.

use crate::error::GraphResult;
use crate::object::{FieldValue, Object};
use lattice_model::{KeyValue, TypeDescriptor, Value};
use lattice_store::{ListHandle, RowHandle, Store, StoreError};

/// The thin write surface the walker drives.
///
/// Every call is synchronous and valid only while the enclosing write
/// transaction is open; the store enforces that precondition.
pub(crate) struct StoreWriter<'a> {
    store: &'a Store,
}

impl<'a> StoreWriter<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub(crate) fn store(&self) -> &'a Store {
        self.store
    }

    /// Creates an empty row of the named type.
    pub(crate) fn create_row(&self, type_name: &str) -> GraphResult<RowHandle> {
        Ok(self.store.create_row(type_name)?)
    }

    /// Writes one scalar column.
    pub(crate) fn write_scalar(
        &self,
        handle: RowHandle,
        field: &str,
        value: Value,
    ) -> GraphResult<()> {
        Ok(self.store.write_scalar(handle, field, value)?)
    }

    /// Links (or clears) one reference column.
    pub(crate) fn write_reference(
        &self,
        handle: RowHandle,
        field: &str,
        target: Option<RowHandle>,
    ) -> GraphResult<()> {
        Ok(self.store.write_reference(handle, field, target)?)
    }

    /// Resets an object-list column, returning the handle to append to.
    pub(crate) fn begin_list(&self, handle: RowHandle, field: &str) -> GraphResult<ListHandle> {
        Ok(self.store.create_list(handle, field)?)
    }

    /// Appends one element (row reference or null) in list order.
    pub(crate) fn append_object(
        &self,
        list: ListHandle,
        element: Option<RowHandle>,
    ) -> GraphResult<()> {
        Ok(self.store.append_object(list, element)?)
    }

    /// Replaces a scalar-list column with the given ordered values.
    pub(crate) fn write_scalar_list(
        &self,
        handle: RowHandle,
        field: &str,
        values: Vec<Value>,
    ) -> GraphResult<()> {
        Ok(self.store.write_scalar_list(handle, field, values)?)
    }

    /// Extracts the node's primary-key value against its descriptor.
    ///
    /// Returns `None` when the type declares no primary key. An unset key
    /// field reads as a null key; a value of the wrong shape or kind is a
    /// type mismatch, reported here so no row is created for the node.
    pub(crate) fn primary_key_value(
        &self,
        descriptor: &TypeDescriptor,
        object: &Object,
    ) -> GraphResult<Option<KeyValue>> {
        let (_, field) = match descriptor.primary_key() {
            Some(found) => found,
            None => return Ok(None),
        };
        let value = match object.field(&field.name) {
            Some(FieldValue::Scalar(value)) => value,
            Some(_) => {
                return Err(StoreError::type_mismatch(
                    descriptor.name(),
                    &field.name,
                    "scalar primary key",
                    "non-scalar value",
                )
                .into())
            }
            None => Value::Null,
        };
        let kind = match field.scalar_kind() {
            Some(kind) => kind,
            None => {
                // Unreachable for validated descriptors; reported rather
                // than assumed.
                return Err(StoreError::type_mismatch(
                    descriptor.name(),
                    &field.name,
                    "scalar primary key",
                    "non-scalar field",
                )
                .into());
            }
        };
        if !value.is_null() && !kind.accepts(&value) {
            return Err(StoreError::type_mismatch(
                descriptor.name(),
                &field.name,
                kind.name(),
                value.kind_name(),
            )
            .into());
        }
        match KeyValue::from_value(&value) {
            Some(key) => Ok(Some(key)),
            None => Err(StoreError::type_mismatch(
                descriptor.name(),
                &field.name,
                kind.name(),
                value.kind_name(),
            )
            .into()),
        }
    }
}
