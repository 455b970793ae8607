//! Query-backed item collections

use journo::{
    Stamp,
    doc::{Doc, Value},
    model::{Item, ItemKind, ItemsQuery},
    store::{Change, DocumentStore, QuerySnapshot},
    sync::Outbox,
};

use crate::helpers::*;

#[tokio::test]
async fn modified_snapshot_updates_the_same_item() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Read, ItemsQuery::Incomplete);
    assert!(items.is_pending());

    let reference = ctx.session().collection(ItemKind::Read).collection().doc("x");
    let first = Doc::new()
        .with("title", "Dune")
        .with("completed", Value::Null)
        .with("created", Value::Timestamp(1));
    items.apply(QuerySnapshot::new(vec![Change::added(reference.clone(), first, 0)]));
    assert!(!items.is_pending());
    let instance = items.items()[0].instance();

    let second = Doc::new()
        .with("title", "Dune Messiah")
        .with("completed", Value::Null)
        .with("created", Value::Timestamp(1));
    items.apply(QuerySnapshot::new(vec![Change::modified(reference, second, 0, 0)]));

    assert_eq!(items.len(), 1);
    assert_eq!(items.items()[0].instance(), instance);
    assert_eq!(items.items()[0].title(), "Dune Messiah");
    assert!(!items.is_pending());
}

#[tokio::test]
async fn created_items_appear_and_local_edits_echo_quietly() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Build, ItemsQuery::Incomplete);
    items.sync();
    assert!(items.is_empty());

    let reference = items.add_item("shed").await.unwrap();
    items.sync();
    assert_eq!(items.len(), 1);
    let item = items.item(reference.id()).unwrap();
    assert_eq!(item.title(), "shed");
    assert!(!item.is_completed());
    let instance = item.instance();

    let item = items.item_mut(reference.id()).unwrap();
    item.set("text", "bigger shed").unwrap();
    item.set("tags", strings(&["garden"])).unwrap();
    ctx.flush().await;
    assert_eq!(items.sync(), 2);

    let item = items.item(reference.id()).unwrap();
    assert_eq!(item.instance(), instance);
    assert_eq!(item.title(), "bigger shed");
    assert_eq!(item.tags(), ["garden"]);
    let stored = ctx.store().peek(&reference).unwrap();
    assert_eq!(stored.get_as::<&str>("text"), Some("bigger shed"));
}

#[tokio::test]
async fn completing_moves_an_item_between_queries() {
    let ctx = TestContext::new().with_session();
    let mut pending = ctx.session().items(ItemKind::Do, ItemsQuery::Incomplete);
    let mut done = ctx.session().items(ItemKind::Do, ItemsQuery::CompletedIn(2024));
    let reference = pending.add_item("taxes").await.unwrap();
    pending.sync();
    done.sync();
    assert!(done.is_empty());

    pending
        .item_mut(reference.id())
        .unwrap()
        .complete(test_day())
        .unwrap();
    ctx.flush().await;
    pending.sync();
    done.sync();

    assert!(pending.is_empty());
    assert_eq!(done.len(), 1);
    assert_eq!(done.items()[0].completed(), Some(TEST_DAY));
    let history = done.history_by_year();
    assert_eq!(history[&2024].len(), 1);
}

#[tokio::test]
async fn delete_then_undo_restores_the_document() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Read, ItemsQuery::Incomplete);
    let reference = items.add_item("Dune").await.unwrap();
    items.sync();
    items
        .item_mut(reference.id())
        .unwrap()
        .set("author", "Herbert")
        .unwrap();
    ctx.flush().await;
    items.sync();
    let before = ctx.store().peek(&reference).unwrap();

    let undo = items.delete_item(reference.id()).unwrap();
    assert_eq!(undo.label(), "Deleted 'Dune'");
    ctx.flush().await;
    items.sync();
    assert!(items.is_empty());
    assert!(ctx.store().peek(&reference).is_none());

    undo.run();
    ctx.flush().await;
    items.sync();
    assert_eq!(items.len(), 1);
    let restored = ctx.store().peek(&reference).unwrap();
    assert_eq!(restored.get("author"), before.get("author"));
    assert_eq!(restored.get("created"), before.get("created"));
    assert_eq!(restored.get("completed"), Some(&Value::Null));
}

#[tokio::test]
async fn deleting_an_unknown_item_is_not_found() {
    let ctx = TestContext::new().with_session();
    let items = ctx.session().items(ItemKind::Read, ItemsQuery::Incomplete);
    assert!(items.delete_item("nope").unwrap_err().is_not_found());
}

#[tokio::test]
async fn closed_collections_ignore_snapshots() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Build, ItemsQuery::Incomplete);
    items.close();
    items.close();
    assert!(items.is_closed());
    ctx.session()
        .collection(ItemKind::Build)
        .create("shed")
        .await
        .unwrap();
    assert_eq!(items.sync(), 0);
    assert!(items.is_empty());
    assert!(!items.next().await);
}

#[tokio::test]
async fn changing_the_year_reopens_the_query() {
    let ctx = TestContext::new().with_session();
    let collection = ctx.session().collection(ItemKind::Watch);
    for (id, completed) in [("old", "2023-06-01"), ("new", "2024-02-01")] {
        ctx.store()
            .set(
                &collection.collection().doc(id),
                Doc::new()
                    .with("title", id)
                    .with("completed", completed)
                    .with("created", Value::Timestamp(1)),
            )
            .await
            .unwrap();
    }
    let mut items = collection.items(ItemsQuery::CompletedIn(2024));
    items.sync();
    assert_eq!(items.items()[0].id(), "new");
    let watchers = ctx.store().watcher_count();

    items.set_query(ItemsQuery::CompletedIn(2023));
    assert!(items.is_pending());
    items.sync();
    assert_eq!(items.len(), 1);
    assert_eq!(items.items()[0].id(), "old");
    assert_eq!(ctx.store().watcher_count(), watchers);
}

#[tokio::test]
async fn started_items_partition_apart() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Play, ItemsQuery::Incomplete);
    let a = items.add_item("Outer Wilds").await.unwrap();
    ctx.clock().advance(1_000);
    let b = items.add_item("Tunic").await.unwrap();
    items.sync();
    items
        .item_mut(b.id())
        .unwrap()
        .start(Stamp::parse("2024-02-20").unwrap())
        .unwrap();

    let parts = items.partitions();
    assert_eq!(parts.started.len(), 1);
    assert_eq!(parts.started[0].id(), b.id());
    assert_eq!(parts.pending[0].id(), a.id());
    assert_eq!(items.search("tunic").len(), 1);
}

#[tokio::test]
async fn failed_writes_are_swallowed() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Do, ItemsQuery::Incomplete);
    let reference = items.add_item("call mom").await.unwrap();
    items.sync();

    ctx.store().fail_next_writes(1);
    items
        .item_mut(reference.id())
        .unwrap()
        .set("text", "call dad")
        .unwrap();
    ctx.flush().await;
    items.sync();

    // local state keeps the optimistic value, the store never saw it
    assert_eq!(items.item(reference.id()).unwrap().title(), "call dad");
    assert_eq!(
        ctx.store().peek(&reference).unwrap().get_as::<&str>("text"),
        Some("call mom")
    );

    ctx.store().fail_next_writes(1);
    assert!(items.add_item("dropped").await.is_none());
}

#[test]
fn unchanged_edit_keeps_explicit_null_completed() {
    for kind in ItemKind::ALL {
        let (outbox, mut rx) = Outbox::detached();
        let reference = journal_collection("test_user").doc("x");
        let data = Doc::new()
            .with(kind.descriptor().title_field, "x")
            .with("completed", Value::Null)
            .with("created", Value::Timestamp(1));
        let mut item = Item::new(kind, reference, &data, outbox, 1);

        item.start_edit();
        item.commit_edit();

        assert!(drain(&mut rx).is_empty(), "{kind} wrote on an unchanged edit");
        assert_eq!(item.get("completed"), Some(&Value::Null));
        assert!(!item.is_completed());
    }
}

#[tokio::test]
async fn edited_items_stay_incomplete() {
    let ctx = TestContext::new().with_session();
    let mut items = ctx.session().items(ItemKind::Read, ItemsQuery::Incomplete);
    let reference = items.add_item("Dune").await.unwrap();
    items.sync();

    let item = items.item_mut(reference.id()).unwrap();
    item.start_edit();
    item.set_draft("title", "Dune Messiah").unwrap();
    item.commit_edit();
    ctx.flush().await;
    items.sync();

    assert_eq!(items.len(), 1);
    assert_eq!(items.item(reference.id()).unwrap().title(), "Dune Messiah");
    let stored = ctx.store().peek(&reference).unwrap();
    assert_eq!(stored.get("completed"), Some(&Value::Null));

    // un-completing writes the null back instead of dropping the field
    let item = items.item_mut(reference.id()).unwrap();
    item.complete(test_day()).unwrap();
    item.uncomplete().unwrap();
    ctx.flush().await;
    items.sync();
    let stored = ctx.store().peek(&reference).unwrap();
    assert_eq!(stored.get("completed"), Some(&Value::Null));
    assert_eq!(items.len(), 1);
}
