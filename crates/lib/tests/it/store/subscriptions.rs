//! Document and query subscriptions

use journo::{
    doc::{Doc, Patch, Value},
    store::{ChangeKind, CollectionRef, DocumentStore, Query},
};

use crate::helpers::*;

fn build_collection() -> CollectionRef {
    CollectionRef::new("users/u/build").unwrap()
}

fn task(text: &str, created: i64) -> Doc {
    Doc::new()
        .with("text", text)
        .with("created", Value::Timestamp(created))
        .with("completed", Value::Null)
}

#[tokio::test]
async fn document_subscription_sees_every_write_in_order() {
    let ctx = TestContext::new();
    let day = day_ref("u", TEST_DAY);
    let mut sub = ctx.store().watch_document(&day);
    assert!(!sub.try_next().unwrap().exists());

    ctx.store().set(&day, day_doc(TEST_DAY, &[], &[])).await.unwrap();
    ctx.store()
        .update(&day, &Patch::single("entries.5", Doc::new().with("text", "x")))
        .await
        .unwrap();
    ctx.store().delete(&day).await.unwrap();

    assert!(sub.try_next().unwrap().exists());
    let second = sub.try_next().unwrap().data.unwrap();
    assert_eq!(second.get_as::<&str>("entries.5.text"), Some("x"));
    assert!(!sub.try_next().unwrap().exists());
    assert!(sub.try_next().is_none());
}

#[tokio::test]
async fn query_initial_snapshot_is_ordered_and_filtered() {
    let ctx = TestContext::new();
    let store = ctx.store();
    store.set(&build_collection().doc("late"), task("late", 30)).await.unwrap();
    store.set(&build_collection().doc("early"), task("early", 10)).await.unwrap();
    store
        .set(
            &build_collection().doc("done"),
            task("done", 20).with("completed", "2024-01-01"),
        )
        .await
        .unwrap();

    let query = Query::new(build_collection())
        .filter_eq("completed", Value::Null)
        .order_by("created");
    let mut sub = store.watch_query(&query);
    let snapshot = sub.try_next().unwrap();
    let ids: Vec<&str> = snapshot.changes.iter().map(|c| c.reference.id()).collect();
    assert_eq!(ids, ["early", "late"]);
    assert!(snapshot.changes.iter().all(|c| c.kind == ChangeKind::Added));
    assert_eq!(snapshot.changes[1].new_index, Some(1));
}

#[tokio::test]
async fn query_deltas_track_membership() {
    let ctx = TestContext::new();
    let store = ctx.store();
    let query = Query::new(build_collection())
        .filter_eq("completed", Value::Null)
        .order_by("created");
    let mut sub = store.watch_query(&query);
    assert!(sub.try_next().unwrap().changes.is_empty());

    let doc = build_collection().doc("a");
    store.set(&doc, task("a", 10)).await.unwrap();
    let added = sub.try_next().unwrap().changes.remove(0);
    assert_eq!((added.kind, added.new_index), (ChangeKind::Added, Some(0)));

    store.update(&doc, &Patch::single("text", "a2")).await.unwrap();
    let modified = sub.try_next().unwrap().changes.remove(0);
    assert_eq!(modified.kind, ChangeKind::Modified);
    assert_eq!(modified.data.get_as::<&str>("text"), Some("a2"));

    // rewriting identical data is not a change
    store.update(&doc, &Patch::single("text", "a2")).await.unwrap();
    assert!(sub.try_next().is_none());

    store
        .update(&doc, &Patch::single("completed", "2024-03-01"))
        .await
        .unwrap();
    let removed = sub.try_next().unwrap().changes.remove(0);
    assert_eq!((removed.kind, removed.old_index), (ChangeKind::Removed, Some(0)));
}

#[tokio::test]
async fn range_query_selects_one_year() {
    let ctx = TestContext::new();
    let store = ctx.store();
    for (id, completed) in [("a", "2023-12-31"), ("b", "2024-01-01"), ("c", "2024-12-31"), ("d", "2025-01-01")] {
        store
            .set(&build_collection().doc(id), task(id, 1).with("completed", completed))
            .await
            .unwrap();
    }
    let query = Query::new(build_collection())
        .filter_gte("completed", "2024-01-01")
        .filter_lt("completed", "2025-01-01")
        .order_by("completed");
    let mut sub = store.watch_query(&query);
    let ids: Vec<String> = sub
        .try_next()
        .unwrap()
        .changes
        .iter()
        .map(|c| c.reference.id().to_string())
        .collect();
    assert_eq!(ids, strings(&["b", "c"]));
}

#[tokio::test]
async fn dropping_a_subscription_unsubscribes() {
    let ctx = TestContext::new();
    let sub = ctx.store().watch_document(&day_ref("u", TEST_DAY));
    let query = ctx.store().watch_query(&Query::new(build_collection()));
    assert_eq!(ctx.store().watcher_count(), 2);
    drop(sub);
    drop(query);
    assert_eq!(ctx.store().watcher_count(), 0);
}
