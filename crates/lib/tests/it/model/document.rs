//! Echo suppression and edit sessions on plain documents

use journo::{
    doc::{Doc, Value},
    model::{Document, Property, PropertyKind},
    store::DocRef,
    sync::Outbox,
};

use crate::helpers::*;

fn document() -> (Document, tokio::sync::mpsc::UnboundedReceiver<journo::sync::WriteCommand>) {
    let (outbox, rx) = Outbox::detached();
    let mut doc = Document::new(DocRef::new("users/u/read/r1").unwrap(), outbox);
    doc.new_prop("title", PropertyKind::Scalar, Some(Value::from("")));
    doc.new_prop("author", PropertyKind::Scalar, None);
    doc.add_prop(Property::tags("tags"));
    doc.new_prop("meta.pages", PropertyKind::Scalar, None);
    (doc, rx)
}

#[test]
fn reads_of_any_shape_never_write() {
    let (mut doc, mut rx) = document();
    let shapes = [
        Doc::new(),
        Doc::new().with("title", "Dune").with("tags", strings(&["sf", "classic"])),
        Doc::new().with("title", 7).with("tags", "not a list"),
        Doc::new().with("meta.pages", 412).with("author", Value::Null),
        Doc::new().with("meta", "flattened").with("tags", Value::List(vec![])),
        Doc::new().with("title", Value::Doc(Doc::new().with("x", 1))),
    ];
    for data in &shapes {
        doc.read(data);
    }
    assert!(drain(&mut rx).is_empty());
    assert!(!doc.is_reading());
}

#[test]
fn remote_values_replace_live_values_and_absent_fields_reset() {
    let (mut doc, _rx) = document();
    doc.read(&Doc::new().with("title", "Dune").with("meta.pages", 412));
    assert_eq!(doc.value("title"), Some(&Value::from("Dune")));
    assert_eq!(doc.value("meta.pages"), Some(&Value::Int(412)));

    doc.read(&Doc::new());
    assert_eq!(doc.value("title"), Some(&Value::from("")));
    assert_eq!(doc.value("meta.pages"), None);
}

#[test]
fn unchanged_edit_round_trip_writes_nothing() {
    let (mut doc, mut rx) = document();
    doc.read(&Doc::new().with("title", "Dune").with("tags", strings(&["sf"])));
    doc.start_edit();
    doc.commit_edit();
    assert!(drain(&mut rx).is_empty());
    assert_eq!(doc.prop("tags").unwrap().tag_list(), ["sf"]);
}

#[test]
fn emptying_tags_writes_a_delete() {
    let (mut doc, mut rx) = document();
    doc.read(&Doc::new().with("tags", strings(&["sf"])));
    doc.start_edit();
    doc.set_draft("tags", "   ").unwrap();
    doc.commit_edit();
    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].patch().unwrap().get("tags"), Some(&Value::Delete));
}

#[test]
fn empty_tags_staying_empty_is_not_a_write() {
    let (mut doc, mut rx) = document();
    doc.start_edit();
    doc.set_draft("tags", "").unwrap();
    doc.commit_edit();
    assert!(doc.assign("tags", Some(Value::List(vec![]))).is_ok_and(|changed| !changed));
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn cancel_keeps_live_values() {
    let (mut doc, mut rx) = document();
    doc.read(&Doc::new().with("title", "Dune"));
    doc.start_edit();
    doc.set_draft("title", "Dune Messiah").unwrap();
    doc.cancel_edit();
    doc.commit_edit();
    assert_eq!(doc.value("title"), Some(&Value::from("Dune")));
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn batched_writes_form_one_update() {
    let (mut doc, mut rx) = document();
    doc.batch(|doc| {
        doc.assign("title", Some("Dune".into())).unwrap();
        doc.assign("author", Some("Herbert".into())).unwrap();
        doc.stage("meta.pages", 412);
    });
    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].patch().unwrap().len(), 3);
}
