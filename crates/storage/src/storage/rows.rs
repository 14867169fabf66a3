use rusqlite::{params, Connection};
use tweetvec_core::{format_timestamp, EmbeddedTweet, MAX_QUERY_LIMIT};
use zerocopy::IntoBytes;

use super::tables::require_dimension;
use super::{
    blob_to_f32_vec, escape_like_pattern, get_conn, log_row_error, row_to_tweet, Storage,
    StoredTweet, TWEET_COLUMNS, TWEET_COLUMN_COUNT,
};
use crate::error::StorageError;
use crate::table::TableName;

fn check_dimension(
    table: &TableName,
    expected: usize,
    row: &EmbeddedTweet,
) -> Result<(), StorageError> {
    if row.dimension() == expected {
        Ok(())
    } else {
        Err(StorageError::DimensionMismatch {
            table: table.to_string(),
            expected,
            actual: row.dimension(),
        })
    }
}

/// Insert one row into both tables; the caller owns the transaction.
fn insert_row(conn: &Connection, table: &TableName, row: &EmbeddedTweet) -> Result<i64, StorageError> {
    let t = &row.tweet;
    let m = &t.metrics;
    conn.execute(
        &format!(
            "INSERT INTO {} (tweet_id, author, author_id, content, retweet_count, like_count,
                 reply_count, quote_count, bookmark_count, impression_count, created_at, lang)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            table.rows_ident()
        ),
        params![
            t.tweet_id,
            t.author,
            t.author_id,
            t.content,
            m.retweets as i64,
            m.likes as i64,
            m.replies as i64,
            m.quotes as i64,
            m.bookmarks as i64,
            m.impressions as i64,
            format_timestamp(&t.created_at),
            t.lang,
        ],
    )?;
    let rowid = conn.last_insert_rowid();
    conn.execute(
        &format!("INSERT INTO {}(rowid, embedding) VALUES (?1, ?2)", table.vec_ident()),
        params![rowid, row.vector.as_bytes()],
    )?;
    Ok(rowid)
}

impl Storage {
    /// Append one embedded tweet. Returns the new rowid.
    ///
    /// No deduplication: appending the same tweet twice stores two rows.
    ///
    /// # Errors
    /// `TableNotFound`, `DimensionMismatch`, or a database failure.
    pub fn append(&self, table: &TableName, row: &EmbeddedTweet) -> Result<i64, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let dimension = require_dimension(&tx, table)?;
        check_dimension(table, dimension, row)?;
        let rowid = insert_row(&tx, table, row)?;
        tx.commit()?;
        tracing::debug!(table = %table, rowid, tweet_id = %row.tweet.tweet_id, "Appended row");
        Ok(rowid)
    }

    /// Insert all rows in one transaction; nothing is written if any row fails.
    ///
    /// # Errors
    /// `TableNotFound`, `DimensionMismatch` (checked before any write), or a database failure.
    pub fn insert_batch(
        &self,
        table: &TableName,
        rows: &[EmbeddedTweet],
    ) -> Result<usize, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let dimension = require_dimension(&tx, table)?;
        for row in rows {
            check_dimension(table, dimension, row)?;
        }
        for row in rows {
            insert_row(&tx, table, row)?;
        }
        tx.commit()?;
        tracing::info!(table = %table, rows = rows.len(), "Inserted batch");
        Ok(rows.len())
    }

    /// First `limit` rows in insertion order, optionally with their vectors.
    ///
    /// # Errors
    /// `TableNotFound` or a database failure.
    pub fn scan(
        &self,
        table: &TableName,
        limit: usize,
        include_vectors: bool,
    ) -> Result<Vec<StoredTweet>, StorageError> {
        let conn = get_conn(&self.pool)?;
        require_dimension(&conn, table)?;
        let limit = limit.min(MAX_QUERY_LIMIT) as i64;

        if !include_vectors {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TWEET_COLUMNS} FROM {} r ORDER BY r.id LIMIT ?1",
                table.rows_ident()
            ))?;
            let rows = stmt
                .query_map(params![limit], row_to_tweet)?
                .filter_map(log_row_error)
                .map(|(rowid, tweet)| StoredTweet { rowid, tweet, vector: None })
                .collect();
            return Ok(rows);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {TWEET_COLUMNS}, v.embedding FROM {} r
             JOIN {} v ON v.rowid = r.id
             ORDER BY r.id LIMIT ?1",
            table.rows_ident(),
            table.vec_ident()
        ))?;
        let raw: Vec<((i64, tweetvec_core::Tweet), Vec<u8>)> = stmt
            .query_map(params![limit], |row| {
                Ok((row_to_tweet(row)?, row.get::<_, Vec<u8>>(TWEET_COLUMN_COUNT)?))
            })?
            .filter_map(log_row_error)
            .collect();
        raw.into_iter()
            .map(|((rowid, tweet), blob)| {
                Ok(StoredTweet { rowid, tweet, vector: Some(blob_to_f32_vec(&blob)?) })
            })
            .collect()
    }

    /// Most recent tweets by creation time, optionally filtered by a
    /// case-insensitive author substring.
    ///
    /// # Errors
    /// `TableNotFound` or a database failure.
    pub fn recent(
        &self,
        table: &TableName,
        limit: usize,
        username: Option<&str>,
    ) -> Result<Vec<StoredTweet>, StorageError> {
        let conn = get_conn(&self.pool)?;
        require_dimension(&conn, table)?;
        let limit = limit.min(MAX_QUERY_LIMIT) as i64;
        let pattern = username.map(|u| format!("%{}%", escape_like_pattern(&u.to_lowercase())));

        let mut stmt = conn.prepare(&format!(
            "SELECT {TWEET_COLUMNS} FROM {} r
             WHERE ?1 IS NULL OR LOWER(r.author) LIKE ?1 ESCAPE '\\'
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ?2",
            table.rows_ident()
        ))?;
        let rows = stmt
            .query_map(params![pattern, limit], row_to_tweet)?
            .filter_map(log_row_error)
            .map(|(rowid, tweet)| StoredTweet { rowid, tweet, vector: None })
            .collect();
        Ok(rows)
    }
}
