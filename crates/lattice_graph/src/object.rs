//! Dynamic application objects and their identity tags.

use lattice_model::Value;
use lattice_store::RowHandle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Opaque per-instance identity tag.
///
/// Tags are assigned once at construction and shared by every clone of
/// the handle: two clones are "the same instance", while two separately
/// constructed objects with identical field values are not. Identity is
/// never derived from field values.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectTag(Uuid);

impl ObjectTag {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for ObjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectTag({})", self.0)
    }
}

impl fmt::Display for ObjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The value held by one field of an [`Object`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A scalar value.
    Scalar(Value),
    /// A single object reference; `None` is a null link.
    Object(Option<Object>),
    /// An ordered list of object references; `None` elements are written
    /// through subject to the target field's nullability.
    ObjectList(Vec<Option<Object>>),
    /// An ordered list of scalars.
    ScalarList(Vec<Value>),
}

struct ObjectInner {
    type_name: String,
    tag: ObjectTag,
    fields: HashMap<String, FieldValue>,
    bound_row: Option<RowHandle>,
}

/// A live application object being inserted.
///
/// An `Object` is a cheaply-cloneable shared handle over a declared type
/// name and a set of field values. Cloning shares the identity tag and
/// the data; the insertion engine dedups on the tag, so a graph that
/// references the same handle twice materializes one row.
///
/// A field never set reads as its kind's empty value during insertion
/// (scalar fields as null, references as a null link, lists as empty).
///
/// Handles hold strong references to the objects they point at; breaking
/// reference cycles after use is the caller's concern.
#[derive(Clone)]
pub struct Object {
    inner: Rc<RefCell<ObjectInner>>,
}

impl Object {
    /// Creates an object of the named type with no fields set.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                type_name: type_name.into(),
                tag: ObjectTag::new(),
                fields: HashMap::new(),
                bound_row: None,
            })),
        }
    }

    /// Returns the declared type name.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.inner.borrow().type_name.clone()
    }

    /// Returns the identity tag.
    #[must_use]
    pub fn tag(&self) -> ObjectTag {
        self.inner.borrow().tag
    }

    /// Sets a field to an explicit [`FieldValue`].
    pub fn set(&self, field: impl Into<String>, value: FieldValue) {
        self.inner.borrow_mut().fields.insert(field.into(), value);
    }

    /// Sets a scalar field.
    pub fn set_scalar(&self, field: impl Into<String>, value: impl Into<Value>) {
        self.set(field, FieldValue::Scalar(value.into()));
    }

    /// Sets a single-object reference field (`None` writes a null link).
    pub fn set_object(&self, field: impl Into<String>, target: Option<&Object>) {
        self.set(field, FieldValue::Object(target.cloned()));
    }

    /// Sets an object-list field from non-null elements.
    pub fn set_objects<'a, I>(&self, field: impl Into<String>, objects: I)
    where
        I: IntoIterator<Item = &'a Object>,
    {
        let elements = objects.into_iter().map(|o| Some(o.clone())).collect();
        self.set(field, FieldValue::ObjectList(elements));
    }

    /// Sets an object-list field, null elements included.
    pub fn set_object_list(&self, field: impl Into<String>, elements: Vec<Option<Object>>) {
        self.set(field, FieldValue::ObjectList(elements));
    }

    /// Sets a scalar-list field.
    pub fn set_scalar_list(&self, field: impl Into<String>, values: Vec<Value>) {
        self.set(field, FieldValue::ScalarList(values));
    }

    /// Returns the value currently set for a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.inner.borrow().fields.get(name).cloned()
    }

    /// Binds this object to an existing row, marking it managed.
    ///
    /// The upsert operations treat a bound object as already having a row
    /// identity: its field values merge into that row instead of creating
    /// a duplicate. Plain insert ignores the binding.
    pub fn bind_row(&self, handle: RowHandle) {
        self.inner.borrow_mut().bound_row = Some(handle);
    }

    /// Returns the row this object is bound to, if any.
    #[must_use]
    pub fn bound_row(&self) -> Option<RowHandle> {
        self.inner.borrow().bound_row
    }
}

/// Instance equality: two handles are equal when they share a tag.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for Object {}

// Fields may form cycles, so Debug prints the handle only.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Object")
            .field("type_name", &inner.type_name)
            .field("tag", &inner.tag)
            .field("fields", &inner.fields.len())
            .finish()
    }
}
