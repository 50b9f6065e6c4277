//! Behavioral tests for plain bulk insertion: graph materialization,
//! identity dedup, cycle termination and null-element handling.

use chrono::{TimeZone, Utc};
use lattice_graph::{insert, insert_all, GraphError, Object};
use lattice_model::{FieldDescriptor, ScalarKind, SchemaCatalog, TypeDescriptor, Value};
use lattice_store::Store;

fn catalog() -> SchemaCatalog {
    let mut catalog = SchemaCatalog::new();
    catalog
        .register(
            TypeDescriptor::new(
                "Entry",
                vec![
                    FieldDescriptor::scalar("title", ScalarKind::Text).nullable(),
                    FieldDescriptor::scalar("rank", ScalarKind::Int).nullable(),
                    FieldDescriptor::scalar("ratio", ScalarKind::Float).nullable(),
                    FieldDescriptor::scalar("flag", ScalarKind::Bool).nullable(),
                    FieldDescriptor::scalar("payload", ScalarKind::Bytes).nullable(),
                    FieldDescriptor::scalar("created_at", ScalarKind::Timestamp).nullable(),
                    FieldDescriptor::object("link", "Entry"),
                    FieldDescriptor::object_list("entries", "Entry").nullable(),
                    FieldDescriptor::scalar_list("notes", ScalarKind::Text),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    catalog
        .register(
            TypeDescriptor::new(
                "Dog",
                vec![FieldDescriptor::scalar("name", ScalarKind::Text).nullable()],
            )
            .unwrap(),
        )
        .unwrap();
    catalog
        .register(
            TypeDescriptor::new(
                "Node",
                vec![
                    FieldDescriptor::scalar("name", ScalarKind::Text).nullable(),
                    FieldDescriptor::object("next", "Node"),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    catalog
}

fn open_store() -> Store {
    let store = Store::new(catalog()).unwrap();
    store.begin_write().unwrap();
    store
}

fn dog(name: &str) -> Object {
    let dog = Object::new("Dog");
    dog.set_scalar("name", name);
    dog
}

#[test]
fn insert_materializes_full_graph() {
    let store = open_store();
    let created_at = Utc.timestamp_millis_opt(1_000_000).unwrap();

    let child = Object::new("Entry");
    child.set_scalar("title", "obj1");
    child.set_scalar("rank", 42i64);

    let entry = Object::new("Entry");
    entry.set_scalar("title", "String");
    entry.set_scalar("rank", 1i64);
    entry.set_scalar("ratio", 1.5f64);
    entry.set_scalar("flag", true);
    entry.set_scalar("payload", vec![1u8, 2, 3]);
    entry.set_scalar("created_at", Value::Timestamp(created_at));
    entry.set_object("link", Some(&child));
    entry.set_objects("entries", [&child]);
    entry.set_scalar_list("notes", vec![Value::from("a"), Value::from("b")]);

    insert(&store, &entry).unwrap();
    store.commit().unwrap();

    // The shared child was reached twice but materialized once.
    assert_eq!(store.count("Entry").unwrap(), 2);

    let roots = store.rows("Entry").unwrap();
    let root = roots[0];
    assert_eq!(store.scalar(root, "title").unwrap(), Value::from("String"));
    assert_eq!(store.scalar(root, "rank").unwrap(), Value::Int(1));
    assert_eq!(store.scalar(root, "ratio").unwrap(), Value::Float(1.5));
    assert_eq!(store.scalar(root, "flag").unwrap(), Value::Bool(true));
    assert_eq!(
        store.scalar(root, "payload").unwrap(),
        Value::Bytes(vec![1, 2, 3])
    );
    assert_eq!(
        store.scalar(root, "created_at").unwrap(),
        Value::Timestamp(created_at)
    );
    assert_eq!(
        store.scalar_list(root, "notes").unwrap(),
        vec![Value::from("a"), Value::from("b")]
    );

    let linked = store.reference(root, "link").unwrap().unwrap();
    assert_eq!(store.scalar(linked, "title").unwrap(), Value::from("obj1"));
    assert_eq!(store.scalar(linked, "rank").unwrap(), Value::Int(42));

    let listed = store.object_list(root, "entries").unwrap();
    assert_eq!(listed, vec![Some(linked)]);
}

#[test]
fn undeclared_object_fields_are_ignored() {
    let store = open_store();
    let entry = Object::new("Entry");
    entry.set_scalar("title", "kept");
    entry.set_scalar("ignored", "cookie");

    insert(&store, &entry).unwrap();

    let root = store.rows("Entry").unwrap()[0];
    assert_eq!(store.scalar(root, "title").unwrap(), Value::from("kept"));
}

#[test]
fn cyclic_graph_yields_two_cross_referencing_rows() {
    let store = open_store();
    let one = Object::new("Node");
    one.set_scalar("name", "One");
    let two = Object::new("Node");
    two.set_scalar("name", "Two");
    one.set_object("next", Some(&two));
    two.set_object("next", Some(&one));

    insert(&store, &one).unwrap();
    store.commit().unwrap();

    assert_eq!(store.count("Node").unwrap(), 2);
    let rows = store.rows("Node").unwrap();
    let (first, second) = (rows[0], rows[1]);
    assert_eq!(store.scalar(first, "name").unwrap(), Value::from("One"));
    assert_eq!(store.scalar(second, "name").unwrap(), Value::from("Two"));
    assert_eq!(store.reference(first, "next").unwrap(), Some(second));
    assert_eq!(store.reference(second, "next").unwrap(), Some(first));
}

#[test]
fn self_reference_terminates() {
    let store = open_store();
    let node = Object::new("Node");
    node.set_scalar("name", "loop");
    node.set_object("next", Some(&node));

    insert(&store, &node).unwrap();

    assert_eq!(store.count("Node").unwrap(), 1);
    let row = store.rows("Node").unwrap()[0];
    assert_eq!(store.reference(row, "next").unwrap(), Some(row));
}

#[test]
fn same_handle_twice_in_a_list_yields_one_row() {
    let store = open_store();
    let shared = Object::new("Entry");
    shared.set_scalar("title", "shared");

    let entry = Object::new("Entry");
    entry.set_objects("entries", [&shared, &shared]);

    insert(&store, &entry).unwrap();

    assert_eq!(store.count("Entry").unwrap(), 2);
    let root = store.rows("Entry").unwrap()[0];
    let listed = store.object_list(root, "entries").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], listed[1]);
}

#[test]
fn structurally_identical_objects_are_never_deduped() {
    let store = open_store();
    insert(&store, &dog("Rex")).unwrap();
    insert(&store, &dog("Rex")).unwrap();

    assert_eq!(store.count("Dog").unwrap(), 2);
}

#[test]
fn insert_all_visits_elements_in_order() {
    let store = open_store();
    let list = vec![Some(dog("Dog 1")), Some(dog("Dog 2"))];

    insert_all(&store, &list).unwrap();
    store.commit().unwrap();

    let rows = store.rows("Dog").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(store.scalar(rows[0], "name").unwrap(), Value::from("Dog 1"));
    assert_eq!(store.scalar(rows[1], "name").unwrap(), Value::from("Dog 2"));
}

#[test]
fn missing_element_fails_without_corrupting_earlier_rows() {
    let store = open_store();
    let list = vec![Some(dog("Dog 1")), None, Some(dog("Dog 2"))];

    let result = insert_all(&store, &list);
    assert!(matches!(result, Err(GraphError::InvalidArgument { .. })));

    // The element before the hole was inserted and stays intact until the
    // caller decides; cancelling the transaction discards it.
    assert_eq!(store.count("Dog").unwrap(), 1);
    let row = store.rows("Dog").unwrap()[0];
    assert_eq!(store.scalar(row, "name").unwrap(), Value::from("Dog 1"));

    store.cancel().unwrap();
    assert_eq!(store.count("Dog").unwrap(), 0);
}

#[test]
fn null_reference_and_null_list_element_written_through() {
    let store = open_store();
    let entry = Object::new("Entry");
    entry.set_object("link", None);
    entry.set_object_list("entries", vec![None]);

    insert(&store, &entry).unwrap();

    let root = store.rows("Entry").unwrap()[0];
    assert_eq!(store.reference(root, "link").unwrap(), None);
    assert_eq!(store.object_list(root, "entries").unwrap(), vec![None]);
}

#[test]
fn unset_fields_materialize_as_empty() {
    let store = open_store();
    insert(&store, &Object::new("Entry")).unwrap();

    let root = store.rows("Entry").unwrap()[0];
    assert_eq!(store.scalar(root, "title").unwrap(), Value::Null);
    assert_eq!(store.reference(root, "link").unwrap(), None);
    assert!(store.object_list(root, "entries").unwrap().is_empty());
    assert!(store.scalar_list(root, "notes").unwrap().is_empty());
}
