//! Row storage per registered type.

use crate::types::{RowHandle, RowId};
use lattice_model::{FieldKind, KeyValue, TypeDescriptor, Value};
use std::collections::{BTreeMap, HashMap};

/// One materialized column of a row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Column {
    /// A scalar value.
    Scalar(Value),
    /// A reference to another row, or null.
    Reference(Option<RowHandle>),
    /// An ordered list of row references.
    ObjectList(Vec<Option<RowHandle>>),
    /// An ordered list of scalars.
    ScalarList(Vec<Value>),
}

impl Column {
    fn empty_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Scalar(_) => Column::Scalar(Value::Null),
            FieldKind::Object { .. } => Column::Reference(None),
            FieldKind::ObjectList { .. } => Column::ObjectList(Vec::new()),
            FieldKind::ScalarList(_) => Column::ScalarList(Vec::new()),
        }
    }
}

/// One materialized row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub(crate) columns: Vec<Column>,
}

/// Rows of one type, with key and unique indexes.
///
/// Rows are kept in a `BTreeMap` so iteration is in creation order; row
/// IDs are sequential and never reused. Index entries exist only for
/// values that have actually been written.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) rows: BTreeMap<RowId, Row>,
    pub(crate) key_index: HashMap<KeyValue, RowId>,
    pub(crate) unique_indexes: HashMap<usize, HashMap<KeyValue, RowId>>,
    next_row: u64,
}

impl Table {
    /// Creates an empty table for the given type.
    pub(crate) fn new(descriptor: TypeDescriptor) -> Self {
        let unique_indexes = descriptor
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.unique && !f.primary_key)
            .map(|(index, _)| (index, HashMap::new()))
            .collect();
        Self {
            descriptor,
            rows: BTreeMap::new(),
            key_index: HashMap::new(),
            unique_indexes,
            next_row: 0,
        }
    }

    /// Allocates a row with every column at its empty value.
    pub(crate) fn create_row(&mut self) -> RowId {
        let id = RowId::new(self.next_row);
        self.next_row += 1;
        let columns = self
            .descriptor
            .fields()
            .iter()
            .map(|f| Column::empty_for(&f.kind))
            .collect();
        self.rows.insert(id, Row { columns });
        id
    }

    /// Returns the row IDs in creation order.
    pub(crate) fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.keys().copied()
    }

    /// Returns the number of rows.
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}
