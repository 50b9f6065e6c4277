//! Error types for the insertion engine.

use thiserror::Error;

/// Result type for engine operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during bulk insertion.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// An object's type has no descriptor in the store's catalog.
    #[error("unknown type: {name}")]
    UnknownType {
        /// Name of the unmapped type.
        name: String,
    },

    /// The engine was invoked without an open write transaction.
    #[error("bulk insertion requires an open write transaction")]
    TransactionState,

    /// Store failure (constraint violations, type mismatches, ...),
    /// propagated unmodified.
    #[error("store error: {0}")]
    Store(#[from] lattice_store::StoreError),
}

impl GraphError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }
}
