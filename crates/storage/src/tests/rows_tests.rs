#![allow(clippy::unwrap_used, reason = "test code")]

use super::*;
use crate::StorageError;

#[test]
fn append_then_scan_returns_fields_and_vector() {
    let (storage, _dir) = create_test_storage();
    let t = table("tweets");
    storage.ensure_table(&t, TEST_DIM).unwrap();

    let mut row = embedded("u", "hello", 5, [0.1, 0.2, 0.3, 0.4]);
    row.tweet.metrics.likes = 7;
    row.tweet.lang = "de".to_owned();
    storage.append(&t, &row).unwrap();

    let rows = storage.scan(&t, 10, true).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tweet, row.tweet);
    assert_eq!(rows[0].vector.as_deref(), Some(&[0.1_f32, 0.2, 0.3, 0.4][..]));

    let rows = storage.scan(&t, 10, false).unwrap();
    assert!(rows[0].vector.is_none());
}

#[test]
fn duplicate_appends_store_two_rows() {
    let (storage, _dir) = create_test_storage();
    let t = table("tweets");
    storage.ensure_table(&t, TEST_DIM).unwrap();
    let row = embedded("u", "again", 0, [1.0, 0.0, 0.0, 0.0]);
    let first = storage.append(&t, &row).unwrap();
    let second = storage.append(&t, &row).unwrap();
    assert_ne!(first, second);
    assert_eq!(storage.count(&t).unwrap(), 2);
}

#[test]
fn append_rejects_wrong_dimension() {
    let (storage, _dir) = create_test_storage();
    let t = table("tweets");
    storage.ensure_table(&t, TEST_DIM).unwrap();
    let mut row = embedded("u", "bad", 0, [1.0, 0.0, 0.0, 0.0]);
    row.vector.push(1.0);
    let err = storage.append(&t, &row).unwrap_err();
    assert!(matches!(err, StorageError::DimensionMismatch { expected: 4, actual: 5, .. }));
    assert_eq!(storage.count(&t).unwrap(), 0);
}

#[test]
fn insert_batch_is_all_or_nothing() {
    let (storage, _dir) = create_test_storage();
    let t = table("seed");
    storage.ensure_table(&t, TEST_DIM).unwrap();

    let good: Vec<_> = (0..5)
        .map(|i| embedded("seed", &format!("tweet {i}"), i, [1.0, 0.0, 0.0, 0.0]))
        .collect();
    assert_eq!(storage.insert_batch(&t, &good).unwrap(), 5);
    assert_eq!(storage.count(&t).unwrap(), 5);

    let mut bad = good.clone();
    bad[3].vector.truncate(2);
    assert!(storage.insert_batch(&t, &bad).is_err());
    assert_eq!(storage.count(&t).unwrap(), 5);
}

#[test]
fn scan_respects_limit_and_insertion_order() {
    let (storage, _dir) = create_test_storage();
    let t = table("tweets");
    storage.ensure_table(&t, TEST_DIM).unwrap();
    for i in 0..4 {
        storage.append(&t, &embedded("u", &format!("n{i}"), 10 - i, [1.0, 0.0, 0.0, 0.0])).unwrap();
    }
    let contents: Vec<String> =
        storage.scan(&t, 3, false).unwrap().into_iter().map(|r| r.tweet.content).collect();
    assert_eq!(contents, vec!["n0", "n1", "n2"]);
}

#[test]
fn recent_orders_by_date_and_filters_author() {
    let (storage, _dir) = create_test_storage();
    let t = table("tweets");
    storage.ensure_table(&t, TEST_DIM).unwrap();
    storage.append(&t, &embedded("Alice_1", "old", 1, [1.0, 0.0, 0.0, 0.0])).unwrap();
    storage.append(&t, &embedded("bob", "newest", 30, [1.0, 0.0, 0.0, 0.0])).unwrap();
    storage.append(&t, &embedded("alice_2", "newer", 20, [1.0, 0.0, 0.0, 0.0])).unwrap();
    storage.append(&t, &embedded("aliceX1", "underscore literal", 25, [1.0, 0.0, 0.0, 0.0])).unwrap();

    let all: Vec<String> =
        storage.recent(&t, 10, None).unwrap().into_iter().map(|r| r.tweet.content).collect();
    assert_eq!(all, vec!["newest", "underscore literal", "newer", "old"]);

    let alice: Vec<String> = storage
        .recent(&t, 10, Some("ALICE_"))
        .unwrap()
        .into_iter()
        .map(|r| r.tweet.content)
        .collect();
    assert_eq!(alice, vec!["newer", "old"]);
}
