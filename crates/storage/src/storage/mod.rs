//! `SQLite` storage implementation
//!
//! Split into table management, row writes/reads, and similarity search.

// SQLite uses i64 for counts/limits, Rust uses usize - safe conversions within DB context
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust usize conversions are safe within DB row counts"
)]

mod rows;
mod search;
mod tables;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tweetvec_core::{EngagementMetrics, Tweet};

use crate::error::StorageError;
use crate::migrations;
use crate::vec_init::init_sqlite_vec;

pub use search::SearchHit;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// A row read back from a vector table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTweet {
    pub rowid: i64,
    pub tweet: Tweet,
    /// Present only when the caller asked for vectors
    pub vector: Option<Vec<f32>>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Log row read errors and filter them out
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Row read error: {}", e);
            None
        },
    }
}

/// Escape special characters for LIKE pattern matching
pub(crate) fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Decode a little-endian `f32` blob as stored by sqlite-vec.
pub(crate) fn blob_to_f32_vec(blob: &[u8]) -> Result<Vec<f32>, StorageError> {
    if blob.len() % 4 != 0 {
        return Err(StorageError::DataCorruption(format!(
            "vector blob of {} bytes is not a whole number of f32 values",
            blob.len()
        )));
    }
    Ok(blob.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

/// Column list shared by every row query; `r` aliases the row table.
pub(crate) const TWEET_COLUMNS: &str = "r.id, r.tweet_id, r.author, r.author_id, r.content, \
     r.retweet_count, r.like_count, r.reply_count, r.quote_count, r.bookmark_count, \
     r.impression_count, r.created_at, r.lang";

/// Number of columns in [`TWEET_COLUMNS`].
pub(crate) const TWEET_COLUMN_COUNT: usize = 13;

/// Map the leading [`TWEET_COLUMNS`] of a row to `(rowid, Tweet)`.
pub(crate) fn row_to_tweet(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, Tweet)> {
    let created_raw: String = row.get(11)?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(e))
        })?;
    let count = |idx: usize| row.get::<_, i64>(idx).map(|v| v.max(0) as u64);
    let tweet = Tweet {
        tweet_id: row.get(1)?,
        author: row.get(2)?,
        author_id: row.get(3)?,
        content: row.get(4)?,
        metrics: EngagementMetrics {
            retweets: count(5)?,
            likes: count(6)?,
            replies: count(7)?,
            quotes: count(8)?,
            bookmarks: count(9)?,
            impressions: count(10)?,
        },
        created_at,
        lang: row.get(12)?,
    };
    Ok((row.get(0)?, tweet))
}

/// Custom connection initializer for sqlite-vec and concurrency settings
fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    init_sqlite_vec();
    conn.execute_batch(
        "PRAGMA busy_timeout = 30000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

impl Storage {
    /// Open (or create) the store at `db_path` with a pool of `pool_size` connections.
    ///
    /// # Errors
    /// Returns `StorageError` if the directory, pool or schema can't be set up.
    pub fn new(db_path: &Path, pool_size: u32) -> Result<Self, StorageError> {
        init_sqlite_vec();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        let conn = pool.get()?;
        migrations::run_migrations(&conn)?;
        drop(conn);

        tracing::info!(path = %db_path.display(), pool_size, "Storage initialized with connection pool");

        Ok(Self { pool })
    }
}
