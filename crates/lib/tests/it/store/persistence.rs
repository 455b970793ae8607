//! JSON persistence of the MemoryStore

use journo::{
    doc::Value,
    store::{DocumentStore, MemoryStore},
};

use crate::helpers::*;

#[tokio::test]
async fn save_and_load_keeps_documents() {
    let ctx = TestContext::new();
    let day = day_ref("u", TEST_DAY);
    ctx.store()
        .set(
            &day,
            day_doc(TEST_DAY, &[("3600", "coffee")], &["3600"]).with("stamped", Value::Timestamp(42)),
        )
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journo.json");
    ctx.store().save_to_file(&path).await.unwrap();

    let loaded = MemoryStore::load_from_file(&path, ctx.clock().clone()).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.peek(&day), ctx.store().peek(&day));
    let snapshot = loaded.get(&day).await.unwrap();
    assert_eq!(
        snapshot.data.unwrap().get_as::<&str>("entries.3600.text"),
        Some("coffee")
    );
}

#[tokio::test]
async fn missing_file_is_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = TestContext::new();
    let loaded = MemoryStore::load_from_file(dir.path().join("absent.json"), ctx.clock().clone())
        .await
        .unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let ctx = TestContext::new();
    assert!(
        MemoryStore::load_from_file(&path, ctx.clock().clone())
            .await
            .is_err()
    );
}
