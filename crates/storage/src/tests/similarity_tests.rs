#![allow(clippy::unwrap_used, reason = "test code")]

use super::*;
use crate::StorageError;

fn seeded() -> (Storage, tempfile::TempDir, TableName) {
    let (storage, dir) = create_test_storage();
    let t = table("tweets");
    storage.ensure_table(&t, TEST_DIM).unwrap();
    let rows = vec![
        embedded("rustacean", "borrow checker", 0, [1.0, 0.0, 0.0, 0.0]),
        embedded("gopher", "goroutines", 1, [0.0, 1.0, 0.0, 0.0]),
        embedded("rustacean", "lifetimes", 2, [0.9, 0.1, 0.0, 0.0]),
        embedded("pythonista", "indentation", 3, [0.0, 0.0, 1.0, 0.0]),
    ];
    storage.insert_batch(&t, &rows).unwrap();
    (storage, dir, t)
}

#[test]
fn search_ranks_by_cosine_similarity() {
    let (storage, _dir, t) = seeded();
    let hits = storage.search(&t, &[1.0, 0.0, 0.0, 0.0], 2, None).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].tweet.content, "borrow checker");
    assert_eq!(hits[1].tweet.content, "lifetimes");
    assert!((hits[0].similarity - 1.0).abs() < 1e-6);
    assert!(hits[0].similarity >= hits[1].similarity);
}

#[test]
fn search_filters_by_username() {
    let (storage, _dir, t) = seeded();
    let hits = storage.search(&t, &[1.0, 0.0, 0.0, 0.0], 10, Some("GOPH")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].tweet.author, "gopher");
}

#[test]
fn search_rejects_wrong_query_dimension() {
    let (storage, _dir, t) = seeded();
    let err = storage.search(&t, &[1.0, 0.0], 10, None).unwrap_err();
    assert!(matches!(err, StorageError::DimensionMismatch { expected: 4, actual: 2, .. }));
}
