use rusqlite::params;
use tweetvec_core::{Tweet, MAX_QUERY_LIMIT};
use zerocopy::IntoBytes;

use super::tables::require_dimension;
use super::{
    escape_like_pattern, get_conn, log_row_error, row_to_tweet, Storage, TWEET_COLUMNS,
    TWEET_COLUMN_COUNT,
};
use crate::error::StorageError;
use crate::table::TableName;

/// A nearest-neighbour match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub rowid: i64,
    pub tweet: Tweet,
    /// Cosine similarity, 1.0 for identical direction
    pub similarity: f64,
}

impl Storage {
    /// Rows nearest to `query` by cosine similarity, best first.
    ///
    /// `username` filters by case-insensitive author substring before ranking.
    ///
    /// # Errors
    /// `TableNotFound`, `DimensionMismatch` for a wrong-sized query, or a database failure.
    pub fn search(
        &self,
        table: &TableName,
        query: &[f32],
        limit: usize,
        username: Option<&str>,
    ) -> Result<Vec<SearchHit>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let dimension = require_dimension(&conn, table)?;
        if query.len() != dimension {
            return Err(StorageError::DimensionMismatch {
                table: table.to_string(),
                expected: dimension,
                actual: query.len(),
            });
        }
        let limit = limit.min(MAX_QUERY_LIMIT) as i64;
        let pattern = username.map(|u| format!("%{}%", escape_like_pattern(&u.to_lowercase())));

        let mut stmt = conn.prepare(&format!(
            "SELECT {TWEET_COLUMNS}, (1.0 - vec_distance_cosine(v.embedding, ?1)) AS similarity
             FROM {vec} v
             JOIN {rows} r ON r.id = v.rowid
             WHERE ?2 IS NULL OR LOWER(r.author) LIKE ?2 ESCAPE '\\'
             ORDER BY similarity DESC
             LIMIT ?3",
            vec = table.vec_ident(),
            rows = table.rows_ident(),
        ))?;
        let hits = stmt
            .query_map(params![query.as_bytes(), pattern, limit], |row| {
                let (rowid, tweet) = row_to_tweet(row)?;
                Ok(SearchHit { rowid, tweet, similarity: row.get(TWEET_COLUMN_COUNT)? })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(hits)
    }
}
