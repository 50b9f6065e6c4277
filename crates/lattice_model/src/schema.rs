//! Type descriptors and the schema catalog.

use crate::error::{ModelError, ModelResult};
use crate::value::ScalarKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The kind of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// A single scalar column.
    Scalar(ScalarKind),
    /// A reference to one object of the target type.
    Object {
        /// Name of the referenced type.
        target: String,
    },
    /// An ordered list of references to objects of the target type.
    ObjectList {
        /// Name of the referenced type.
        target: String,
    },
    /// An ordered list of scalars.
    ScalarList(ScalarKind),
}

/// Declaration of one field of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within the type.
    pub name: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Whether the field (or its list elements) may hold null.
    pub nullable: bool,
    /// Whether the field enforces uniqueness besides any primary key.
    pub unique: bool,
    /// Whether this field is the type's primary key.
    pub primary_key: bool,
}

impl FieldDescriptor {
    /// Declares a scalar field.
    #[must_use]
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(kind),
            nullable: false,
            unique: false,
            primary_key: false,
        }
    }

    /// Declares a single-object reference field.
    ///
    /// References are always nullable: a missing target is written as a
    /// null link.
    #[must_use]
    pub fn object(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object {
                target: target.into(),
            },
            nullable: true,
            unique: false,
            primary_key: false,
        }
    }

    /// Declares a list-of-objects field.
    #[must_use]
    pub fn object_list(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::ObjectList {
                target: target.into(),
            },
            nullable: false,
            unique: false,
            primary_key: false,
        }
    }

    /// Declares a list-of-scalars field.
    #[must_use]
    pub fn scalar_list(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::ScalarList(kind),
            nullable: false,
            unique: false,
            primary_key: false,
        }
    }

    /// Marks the field (or its list elements) as accepting null.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the field as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the field as the type's primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Returns the scalar kind if this is a scalar field.
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    fn is_keyable(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Scalar(ScalarKind::Int) | FieldKind::Scalar(ScalarKind::Text)
        )
    }
}

/// Declaration of an object type: name plus ordered field list.
///
/// Construction validates the declaration: field names must be unique, at
/// most one field may carry the primary key, and key/unique fields must be
/// int or text scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Builds a validated type descriptor.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> ModelResult<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        let mut key_count = 0usize;
        for field in &fields {
            if !seen.insert(field.name.clone()) {
                return Err(ModelError::DuplicateField {
                    type_name: name,
                    field: field.name.clone(),
                });
            }
            if field.primary_key {
                key_count += 1;
                if key_count > 1 {
                    return Err(ModelError::MultiplePrimaryKeys { type_name: name });
                }
                if !field.is_keyable() {
                    return Err(ModelError::invalid_primary_key(
                        name,
                        field.name.clone(),
                        "primary keys must be int or text scalars",
                    ));
                }
            } else if field.unique && !field.is_keyable() {
                return Err(ModelError::invalid_unique_field(
                    name,
                    field.name.clone(),
                    "unique fields must be int or text scalars",
                ));
            }
        }

        Ok(Self { name, fields })
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name, returning its column index and descriptor.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
    }

    /// Returns the primary-key field, if the type declares one.
    #[must_use]
    pub fn primary_key(&self) -> Option<(usize, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.primary_key)
    }

    /// Returns true if the type declares a primary key.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        self.primary_key().is_some()
    }
}

/// Registry of type descriptors, keyed by type name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    types: BTreeMap<String, TypeDescriptor>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type descriptor.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> ModelResult<()> {
        if self.types.contains_key(descriptor.name()) {
            return Err(ModelError::DuplicateType {
                name: descriptor.name().to_string(),
            });
        }
        self.types.insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Looks up a descriptor by type name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Returns true if the catalog knows the type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterates descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Checks that every object and object-list field targets a
    /// registered type.
    pub fn validate(&self) -> ModelResult<()> {
        for descriptor in self.types.values() {
            for field in descriptor.fields() {
                let target = match &field.kind {
                    FieldKind::Object { target } | FieldKind::ObjectList { target } => target,
                    _ => continue,
                };
                if !self.types.contains_key(target) {
                    return Err(ModelError::UnknownTargetType {
                        type_name: descriptor.name().to_string(),
                        field: field.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
