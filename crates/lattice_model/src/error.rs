//! Error types for the model layer.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or validating schemas.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A type declares two fields with the same name.
    #[error("duplicate field '{field}' in type '{type_name}'")]
    DuplicateField {
        /// The type being declared.
        type_name: String,
        /// The repeated field name.
        field: String,
    },

    /// A type was registered twice in the same catalog.
    #[error("duplicate type '{name}' in catalog")]
    DuplicateType {
        /// Name of the type.
        name: String,
    },

    /// A type declares more than one primary-key field.
    #[error("type '{type_name}' declares more than one primary key")]
    MultiplePrimaryKeys {
        /// The type being declared.
        type_name: String,
    },

    /// The primary-key field has an unsupported kind.
    #[error("field '{field}' of type '{type_name}' cannot be a primary key: {message}")]
    InvalidPrimaryKey {
        /// The type being declared.
        type_name: String,
        /// The offending field.
        field: String,
        /// Why the field cannot carry the key.
        message: String,
    },

    /// A unique field has an unsupported kind.
    #[error("field '{field}' of type '{type_name}' cannot be unique: {message}")]
    InvalidUniqueField {
        /// The type being declared.
        type_name: String,
        /// The offending field.
        field: String,
        /// Why the field cannot be unique.
        message: String,
    },

    /// An object or object-list field targets an unregistered type.
    #[error("field '{field}' of type '{type_name}' references unknown type '{target}'")]
    UnknownTargetType {
        /// The type being validated.
        type_name: String,
        /// The referencing field.
        field: String,
        /// The missing target type.
        target: String,
    },
}

impl ModelError {
    /// Creates an invalid primary key error.
    pub fn invalid_primary_key(
        type_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPrimaryKey {
            type_name: type_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid unique field error.
    pub fn invalid_unique_field(
        type_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidUniqueField {
            type_name: type_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
