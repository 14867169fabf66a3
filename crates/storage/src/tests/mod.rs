//! Test utilities and module declarations for storage tests.

#![allow(clippy::unwrap_used, reason = "test code")]

use chrono::{TimeZone as _, Utc};
use tempfile::TempDir;
use tweetvec_core::{EmbeddedTweet, Tweet};

use crate::{Storage, TableName};

pub const TEST_DIM: usize = 4;

pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("test.db");
    let storage = Storage::new(&db_path, 2).unwrap();
    (storage, temp_dir)
}

pub fn table(name: &str) -> TableName {
    TableName::new(name).unwrap()
}

/// Tweet created `minute` minutes past a fixed hour, with a 4-d vector.
pub fn embedded(author: &str, content: &str, minute: u32, vector: [f32; TEST_DIM]) -> EmbeddedTweet {
    let mut tweet = Tweet::new(author, content);
    tweet.created_at = Utc.with_ymd_and_hms(2025, 3, 12, 16, minute, 0).unwrap();
    EmbeddedTweet::new(tweet, vector.to_vec())
}

mod rows_tests;
mod similarity_tests;
