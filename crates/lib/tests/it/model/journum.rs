//! Journal day reconciliation and entry mutations

use std::{collections::BTreeSet, sync::Arc};

use journo::{
    Clock, FixedClock,
    doc::{Doc, Value},
    model::{Journum, repair_order},
    store::DocumentStore,
    sync::{Outbox, WriteCommand},
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::helpers::*;

/// A day opened straight from `data`, writing to a detached outbox.
fn detached_day(data: Doc) -> (Journum, UnboundedReceiver<WriteCommand>, Arc<FixedClock>) {
    let (outbox, rx) = Outbox::detached();
    let clock = test_clock();
    let journum = Journum::open(day_ref("u", TEST_DAY), &data, outbox, clock.clone()).unwrap();
    (journum, rx, clock)
}

fn key_set(journum: &Journum) -> BTreeSet<String> {
    journum.keys().cloned().collect()
}

fn assert_permutation(journum: &Journum) {
    let order: BTreeSet<String> = journum.order().iter().cloned().collect();
    assert_eq!(order.len(), journum.order().len(), "duplicate keys in {:?}", journum.order());
    assert_eq!(order, key_set(journum));
}

#[tokio::test]
async fn add_entry_to_an_empty_day() {
    let ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().journal(test_day()).await.unwrap();
    let journum = cursor.current_mut().unwrap();
    assert!(journum.is_empty());

    let key = journum.add_entry("buy milk", &strings(&["errand"])).unwrap();
    ctx.flush().await;

    let stored = ctx.store().peek(journum.reference()).unwrap();
    let entries = stored.get_doc("entries").unwrap();
    assert_eq!(entries.len(), 1);
    let entry = entries.get_doc(&key).unwrap();
    assert_eq!(entry.get_as::<&str>("text"), Some("buy milk"));
    assert_eq!(entry.get_as::<Vec<String>>("tags").unwrap(), ["errand"]);
    assert_eq!(stored.get_as::<Vec<String>>("order").unwrap(), [key.clone()]);

    // the echo of our own write is a no-op
    assert_eq!(journum.sync().unwrap(), 1);
    assert_eq!(journum.order(), [key.clone()]);
    assert_eq!(journum.entry(&key).unwrap().text(), "buy milk");
    assert_eq!(journum.entry(&key).unwrap().tags(), ["errand"]);
}

#[tokio::test]
async fn opening_a_missing_day_creates_it() {
    let ctx = TestContext::new().with_session();
    let day = day_ref(crate::context::TEST_USER, TEST_DAY);
    assert!(ctx.store().peek(&day).is_none());

    let cursor = ctx.session().journal(test_day()).await.unwrap();
    assert_eq!(cursor.date(), Some(test_day()));
    let stored = ctx.store().peek(&day).unwrap();
    assert_eq!(stored.get_as::<&str>("date"), Some(TEST_DAY));
    assert!(stored.get_doc("entries").unwrap().is_empty());
    assert_eq!(stored.get("order"), Some(&order_value(&[])));
}

#[test]
fn stale_order_is_repaired_without_creating_entries() {
    let data = day_doc(TEST_DAY, &[("a", "x"), ("b", "y")], &["b", "c"]);
    let (journum, mut rx, _) = detached_day(data);
    assert_eq!(journum.order(), ["b", "a"]);
    assert!(journum.entry("c").is_none());
    assert_eq!(journum.len(), 2);
    let texts: Vec<&str> = journum.entries().iter().map(|e| e.text()).collect();
    assert_eq!(texts, ["y", "x"]);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn delete_then_undo_issues_inverse_patches() {
    let data = day_doc(TEST_DAY, &[("a", "x"), ("b", "y")], &["a", "b"])
        .with("entries.a.tags", strings(&["t"]))
        .with("entries.a.item", "users/u/read/r1");
    let (mut journum, mut rx, _) = detached_day(data);

    let undo = journum.delete_entry("a").unwrap();
    assert_eq!(journum.order(), ["b"]);
    assert!(journum.entry("a").is_none());

    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    let patch = commands[0].patch().unwrap();
    assert_eq!(patch.get("entries.a"), Some(&Value::Delete));
    assert_eq!(patch.get("order"), Some(&order_value(&["b"])));

    undo.run();
    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    let patch = commands[0].patch().unwrap();
    let restored = patch.get("entries.a").unwrap().as_doc().unwrap();
    assert_eq!(restored.get_as::<&str>("text"), Some("x"));
    assert_eq!(restored.get_as::<Vec<String>>("tags").unwrap(), ["t"]);
    assert_eq!(restored.get_as::<&str>("item"), Some("users/u/read/r1"));
    assert_eq!(patch.get("order"), Some(&order_value(&["a", "b"])));
}

#[tokio::test]
async fn undo_round_trips_through_the_store() {
    let ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().journal(test_day()).await.unwrap();
    let journum = cursor.current_mut().unwrap();
    let first = journum.add_entry("first", &[]).unwrap();
    ctx.clock().advance(5_000);
    let second = journum.add_entry("second", &[]).unwrap();
    ctx.flush().await;
    journum.sync().unwrap();

    let undo = journum.delete_entry(&first).unwrap();
    ctx.flush().await;
    journum.sync().unwrap();
    let stored = ctx.store().peek(journum.reference()).unwrap();
    assert!(!stored.contains(format!("entries.{first}")));
    assert_eq!(journum.order(), [second.clone()]);

    undo.run();
    ctx.flush().await;
    journum.sync().unwrap();
    assert_eq!(journum.order(), [first.clone(), second]);
    assert_eq!(journum.entry(&first).unwrap().text(), "first");
}

#[test]
fn move_clamps_and_skips_noops() {
    let data = day_doc(TEST_DAY, &[("1", "a"), ("2", "b"), ("3", "c")], &["1", "2", "3"]);
    let (mut journum, mut rx, _) = detached_day(data);

    assert!(!journum.move_entry("3", 1).unwrap());
    assert!(!journum.move_entry("1", -1).unwrap());
    assert!(drain(&mut rx).is_empty());

    assert!(journum.move_entry("3", -10).unwrap());
    assert_eq!(journum.order(), ["3", "1", "2"]);
    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    assert_eq!(
        commands[0].patch().unwrap().get("order"),
        Some(&order_value(&["3", "1", "2"]))
    );
}

#[test]
fn extreme_move_deltas_clamp_to_the_ends() {
    let data = day_doc(TEST_DAY, &[("1", "a"), ("2", "b")], &["1", "2"]);
    let (mut journum, mut rx, _) = detached_day(data);

    assert!(!journum.move_entry("2", i64::MAX).unwrap());
    assert!(!journum.move_entry("1", i64::MIN).unwrap());
    assert!(drain(&mut rx).is_empty());

    assert!(journum.move_entry("1", i64::MAX).unwrap());
    assert_eq!(journum.order(), ["2", "1"]);
    assert!(journum.move_entry("1", i64::MIN).unwrap());
    assert_eq!(journum.order(), ["1", "2"]);
    assert_eq!(drain(&mut rx).len(), 2);
}

#[test]
fn keys_are_unique_for_a_single_writer() {
    let (mut journum, _rx, clock) = detached_day(day_doc(TEST_DAY, &[], &[]));
    let mut keys = BTreeSet::new();
    for i in 0..50 {
        let key = journum.add_entry(&format!("entry {i}"), &[]).unwrap();
        assert!(keys.insert(key));
        clock.advance(1_100);
    }
    assert_eq!(journum.len(), 50);
    assert_permutation(&journum);
}

#[test]
fn keys_within_one_second_are_bumped() {
    let (mut journum, _rx, clock) = detached_day(day_doc(TEST_DAY, &[], &[]));
    let _hold = clock.hold();
    let a = journum.add_entry("a", &[]).unwrap();
    let b = journum.add_entry("b", &[]).unwrap();
    assert_eq!(a, "32400");
    assert_eq!(b, "32401");
}

#[test]
fn keys_count_from_local_midnight() {
    let (outbox, _rx) = Outbox::detached();
    // 09:00 UTC is 11:00 at +02:00
    let clock = Arc::new(FixedClock::at(test_day(), 9, 0, 0).with_offset_secs(2 * 3600));
    let clock: Arc<dyn Clock> = clock;
    let mut journum = Journum::open(
        day_ref("u", TEST_DAY),
        &day_doc(TEST_DAY, &[], &[]),
        outbox,
        clock,
    )
    .unwrap();
    assert_eq!(journum.add_entry("x", &[]).unwrap(), "39600");
}

#[test]
fn keys_use_the_offset_of_the_day_itself() {
    let (outbox, _rx) = Outbox::detached();
    // the clock is at UTC now, but the day began at +01:00
    let clock = Arc::new(FixedClock::at(test_day(), 9, 0, 0).with_offset_on(test_day(), 3600));
    let clock: Arc<dyn Clock> = clock;
    let mut journum = Journum::open(
        day_ref("u", TEST_DAY),
        &day_doc(TEST_DAY, &[], &[]),
        outbox,
        clock,
    )
    .unwrap();
    assert_eq!(journum.add_entry("x", &[]).unwrap(), "36000");
}

#[test]
fn reads_never_write() {
    let (mut journum, mut rx, _) = detached_day(day_doc(TEST_DAY, &[("1", "a")], &["1"]));
    let shapes = [
        day_doc(TEST_DAY, &[("1", "changed"), ("2", "new")], &["2"]),
        day_doc(TEST_DAY, &[], &["1", "2", "1"]),
        Doc::new().with("date", TEST_DAY),
        day_doc(TEST_DAY, &[("3", "c")], &[]).with("order", "garbage"),
        day_doc(TEST_DAY, &[("4", "d")], &["4"]).with("entries.4.tags", "not a list"),
    ];
    for data in &shapes {
        journum.read(data).unwrap();
        assert_permutation(&journum);
    }
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn order_stays_a_permutation_through_operations_and_corrupt_reads() {
    let (mut journum, _rx, clock) = detached_day(day_doc(TEST_DAY, &[], &[]));
    let mut keys = Vec::new();
    for i in 0..6 {
        keys.push(journum.add_entry(&format!("e{i}"), &[]).unwrap());
        clock.advance(2_000);
    }
    journum.delete_entry(&keys[2]).unwrap();
    journum.move_entry(&keys[5], -3).unwrap();
    journum.move_entry(&keys[0], 2).unwrap();
    assert_permutation(&journum);

    // remote has every entry but a corrupt order
    let mut data = Doc::new().with("date", TEST_DAY);
    for key in journum.keys() {
        data = data.with(format!("entries.{key}.text"), "t");
    }
    let corrupt = vec![
        Value::from("nope"),
        Value::from(keys[4].as_str()),
        Value::Int(7),
        Value::from(keys[4].as_str()),
    ];
    let data = data.with("order", Value::List(corrupt));
    journum.read(&data).unwrap();
    assert_permutation(&journum);
    assert_eq!(journum.order()[0], keys[4]);

    let once = journum.order().to_vec();
    journum.read(&data).unwrap();
    assert_eq!(journum.order(), once);
}

#[test]
fn repair_is_idempotent() {
    let keys: BTreeSet<String> = strings(&["1", "2", "10", "b"]).into_iter().collect();
    for order in [
        strings(&[]),
        strings(&["b", "x", "b"]),
        strings(&["10", "2", "1", "b"]),
        strings(&["zz", "1", "zz"]),
    ] {
        let once = repair_order(&order, &keys);
        assert_eq!(repair_order(&once, &keys), once);
    }
}

#[test]
fn removed_entries_stop_syncing() {
    let (mut journum, mut rx, _) = detached_day(day_doc(TEST_DAY, &[("1", "a"), ("2", "b")], &["1", "2"]));
    let props_before = journum.document().props().count();

    journum.read(&day_doc(TEST_DAY, &[("2", "b")], &["1", "2"])).unwrap();
    assert_eq!(journum.order(), ["2"]);
    assert_eq!(journum.document().props().count(), props_before - 2);
    assert!(journum.set_text("1", "ghost").unwrap_err().is_not_found());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn remote_text_changes_apply_in_place() {
    let (mut journum, _rx, _) = detached_day(day_doc(TEST_DAY, &[("1", "a")], &["1"]));
    journum
        .read(&day_doc(TEST_DAY, &[("1", "edited elsewhere")], &["1"]).with("entries.1.tags", strings(&["x"])))
        .unwrap();
    let entry = journum.entry("1").unwrap();
    assert_eq!(entry.text(), "edited elsewhere");
    assert_eq!(entry.tags(), ["x"]);
}

#[test]
fn entry_edit_session_commits_one_patch() {
    let (mut journum, mut rx, _) = detached_day(day_doc(TEST_DAY, &[("1", "a")], &["1"]));
    journum.start_edit("1").unwrap();
    assert!(journum.entry("1").unwrap().is_editing());
    journum.commit_edit("1").unwrap();
    assert!(drain(&mut rx).is_empty());

    journum.start_edit("1").unwrap();
    journum.set_text_draft("1", "b").unwrap();
    journum.set_tags_draft("1", "one two one").unwrap();
    assert_eq!(journum.entry("1").unwrap().draft_text(), Some("b"));
    journum.commit_edit("1").unwrap();
    assert!(!journum.entry("1").unwrap().is_editing());

    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    let patch = commands[0].patch().unwrap();
    assert_eq!(patch.get("entries.1.text"), Some(&Value::from("b")));
    assert_eq!(patch.get("entries.1.tags"), Some(&Value::from(strings(&["one", "two"]))));

    journum.start_edit("1").unwrap();
    journum.set_text_draft("1", "discarded").unwrap();
    journum.cancel_edit("1").unwrap();
    assert_eq!(journum.entry("1").unwrap().text(), "b");
}

#[test]
fn unparsable_date_is_fatal() {
    let (outbox, _rx) = Outbox::detached();
    let clock: Arc<dyn Clock> = test_clock();
    let err = Journum::open(
        day_ref("u", TEST_DAY),
        &Doc::new().with("date", "yesterday").with("entries", Doc::new()),
        outbox,
        clock,
    )
    .unwrap_err();
    assert!(err.is_malformed_data());
}

#[tokio::test]
async fn a_corrupt_day_fails_to_load() {
    let ctx = TestContext::new().with_session();
    let day = day_ref(crate::context::TEST_USER, TEST_DAY);
    ctx.store()
        .set(&day, Doc::new().with("date", "not a date"))
        .await
        .unwrap();
    let err = ctx.session().journal(test_day()).await.unwrap_err();
    assert!(err.is_malformed_data());
}

#[tokio::test]
async fn closed_days_ignore_remote_changes() {
    let ctx = TestContext::new().with_session();
    let mut cursor = ctx.session().journal(test_day()).await.unwrap();
    let reference = cursor.current().unwrap().reference().clone();
    cursor.current_mut().unwrap().close();

    ctx.store()
        .update(&reference, &journo::doc::Patch::single("entries.9", Doc::new().with("text", "late")))
        .await
        .unwrap();
    let journum = cursor.current_mut().unwrap();
    assert_eq!(journum.sync().unwrap(), 0);
    assert!(!journum.next().await.unwrap());
    assert!(journum.is_empty());
}
