//! Login, logout and notices

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use journo::{
    model::{ItemKind, ItemsQuery},
    notice::Notice,
    session::{Session, SessionConfig},
    sync::Undo,
};

use crate::helpers::*;

#[tokio::test]
async fn users_see_only_their_own_data() {
    let ctx = TestContext::new().with_session();
    let other = Session::login(
        SessionConfig::new("someone_else"),
        ctx.store().clone(),
        ctx.clock().clone(),
    )
    .unwrap();

    let mut mine = ctx.session().items(ItemKind::Read, ItemsQuery::Incomplete);
    let mut theirs = other.items(ItemKind::Read, ItemsQuery::Incomplete);
    mine.add_item("Dune").await.unwrap();
    mine.sync();
    theirs.sync();
    assert_eq!(mine.len(), 1);
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn logout_flushes_pending_writes() {
    let mut ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().today().await.unwrap();
    let reference = cursor.current().unwrap().reference().clone();
    let key = cursor
        .current_mut()
        .unwrap()
        .add_entry("last words", &[])
        .unwrap();

    ctx.take_session().logout().await;
    let stored = ctx.store().peek(&reference).unwrap();
    assert!(stored.contains(format!("entries.{key}")));
}

#[tokio::test]
async fn custom_root_scopes_collections() {
    let ctx = TestContext::new();
    let session = Session::login(
        SessionConfig::new("ann").with_root("accounts"),
        ctx.store().clone(),
        ctx.clock().clone(),
    )
    .unwrap();
    assert_eq!(session.user().path(), "accounts/ann");
    assert_eq!(
        session.collection(ItemKind::Dine).collection().path(),
        "accounts/ann/dine"
    );
}

#[tokio::test]
async fn notices_queue_and_undo_in_order() {
    let mut ctx = TestContext::new().with_session();
    let undone = Arc::new(AtomicBool::new(false));
    let flag = undone.clone();

    let notices = ctx.session_mut().notices_mut();
    notices.push(Notice::with_undo(Undo::new("Deleted entry 1", move || {
        flag.store(true, Ordering::SeqCst);
    })));
    notices.push(Notice::new("Saved"));
    assert_eq!(notices.len(), 2);

    // a second notice never replaces the first
    assert_eq!(notices.current().unwrap().message, "Deleted entry 1");
    assert!(notices.undo_current());
    assert!(undone.load(Ordering::SeqCst));
    assert_eq!(notices.current().unwrap().message, "Saved");
    assert!(!notices.undo_current());
    assert!(ctx.session().notices().is_empty());
}

#[tokio::test]
async fn journal_delete_undo_through_notices() {
    let mut ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().today().await.unwrap();
    let journum = cursor.current_mut().unwrap();
    let key = journum.add_entry("oops", &[]).unwrap();
    let undo = journum.delete_entry(&key).unwrap();
    ctx.session_mut().notices_mut().push(Notice::with_undo(undo));
    ctx.flush().await;
    journum.sync().unwrap();
    assert!(journum.is_empty());

    assert!(ctx.session_mut().notices_mut().undo_current());
    ctx.flush().await;
    journum.sync().unwrap();
    assert_eq!(journum.entry(&key).unwrap().text(), "oops");
}
