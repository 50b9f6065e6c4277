//! Error types for the store.

use crate::types::RowHandle;
use lattice_model::KeyValue;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Schema error from the model layer.
    #[error("schema error: {0}")]
    Schema(#[from] lattice_model::ModelError),

    /// Operation requires a different transaction state.
    #[error("transaction state error: {message}")]
    TransactionState {
        /// Description of the violated precondition.
        message: String,
    },

    /// No table exists for the named type.
    #[error("unknown type: {name}")]
    UnknownType {
        /// Name of the type.
        name: String,
    },

    /// The type has no field with the given name.
    #[error("unknown field '{field}' on type '{type_name}'")]
    UnknownField {
        /// The type addressed.
        type_name: String,
        /// The missing field name.
        field: String,
    },

    /// A row handle does not resolve to a live row.
    #[error("row not found: {handle}")]
    RowNotFound {
        /// The stale handle.
        handle: RowHandle,
    },

    /// A field value does not match the declared field kind.
    #[error("type mismatch on '{type_name}.{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// The type addressed.
        type_name: String,
        /// The field addressed.
        field: String,
        /// The declared kind.
        expected: String,
        /// The supplied kind.
        actual: String,
    },

    /// Null written to a non-nullable field.
    #[error("null value not allowed for '{type_name}.{field}'")]
    NullDisallowed {
        /// The type addressed.
        type_name: String,
        /// The non-nullable field.
        field: String,
    },

    /// A uniqueness constraint was violated.
    #[error("value {value} already exists for '{type_name}.{field}'")]
    ConstraintViolation {
        /// The type addressed.
        type_name: String,
        /// The constrained field.
        field: String,
        /// The duplicated value.
        value: KeyValue,
    },

    /// Key lookup on a type without a primary key.
    #[error("type '{name}' has no primary key")]
    NoPrimaryKey {
        /// Name of the type.
        name: String,
    },
}

impl StoreError {
    /// Creates a transaction state error.
    pub fn transaction_state(message: impl Into<String>) -> Self {
        Self::TransactionState {
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        type_name: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            type_name: type_name.into(),
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a null-disallowed error.
    pub fn null_disallowed(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::NullDisallowed {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Creates a constraint violation error.
    pub fn constraint_violation(
        type_name: impl Into<String>,
        field: impl Into<String>,
        value: KeyValue,
    ) -> Self {
        Self::ConstraintViolation {
            type_name: type_name.into(),
            field: field.into(),
            value,
        }
    }
}
