//! Moving between journal days

use journo::Stamp;

use crate::helpers::*;

#[tokio::test]
async fn rolling_dates_opens_one_day_at_a_time() {
    let ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().today().await.unwrap();
    assert_eq!(cursor.date(), Some(test_day()));
    let watchers = ctx.store().watcher_count();

    cursor.roll_date(-1).await.unwrap();
    assert_eq!(cursor.date(), Stamp::parse("2024-02-29").ok());
    assert_eq!(ctx.store().watcher_count(), watchers);

    cursor.roll_date(2).await.unwrap();
    assert_eq!(cursor.date(), Stamp::parse("2024-03-02").ok());

    cursor.go_today().await.unwrap();
    assert_eq!(cursor.date(), Some(test_day()));

    let journal = ctx.session().journal_collection();
    assert_eq!(ctx.store().list(&journal).len(), 3);
}

#[tokio::test]
async fn days_keep_their_own_entries() {
    let ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().today().await.unwrap();
    cursor
        .current_mut()
        .unwrap()
        .add_entry("today", &[])
        .unwrap();
    ctx.flush().await;

    cursor.roll_date(1).await.unwrap();
    assert!(cursor.current().unwrap().is_empty());
    // entries on a future day count back from that day's midnight
    let key = cursor
        .current_mut()
        .unwrap()
        .add_entry("tomorrow", &[])
        .unwrap();
    assert!(key.starts_with('-'));
    ctx.flush().await;

    cursor.go_today().await.unwrap();
    let today = cursor.current().unwrap();
    let texts: Vec<&str> = today.entries().iter().map(|e| e.text()).collect();
    assert_eq!(texts, ["today"]);
}

#[tokio::test]
async fn remote_edits_to_the_open_day_arrive() {
    let ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().today().await.unwrap();
    let reference = cursor.current().unwrap().reference().clone();

    // another device writes straight to the store
    let other = journo::session::Session::login(
        journo::session::SessionConfig::new(crate::context::TEST_USER),
        ctx.store().clone(),
        ctx.clock().clone(),
    )
    .unwrap();
    let mut remote = other.journal(test_day()).await.unwrap();
    let key = remote
        .current_mut()
        .unwrap()
        .add_entry("from the phone", &strings(&["mobile"]))
        .unwrap();
    other.logout().await;

    let journum = cursor.current_mut().unwrap();
    assert!(journum.next().await.unwrap());
    assert_eq!(journum.reference(), &reference);
    let entry = journum.entry(&key).unwrap();
    assert_eq!(entry.text(), "from the phone");
    assert_eq!(entry.tags(), ["mobile"]);
    assert_eq!(journum.order(), [key]);
}
