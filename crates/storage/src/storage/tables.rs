use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tweetvec_core::format_timestamp;

use super::{get_conn, log_row_error, Storage};
use crate::error::StorageError;
use crate::table::{TableInfo, TableName, TableStatus};

/// Dimension recorded for `table`, or `None` if it was never created.
pub(crate) fn recorded_dimension(
    conn: &Connection,
    table: &TableName,
) -> Result<Option<usize>, StorageError> {
    let dim: Option<i64> = conn
        .query_row(
            "SELECT dimension FROM vector_tables WHERE name = ?1",
            params![table.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(dim.map(|d| d as usize))
}

/// Like [`recorded_dimension`] but a missing table is an error.
pub(crate) fn require_dimension(conn: &Connection, table: &TableName) -> Result<usize, StorageError> {
    recorded_dimension(conn, table)?.ok_or_else(|| StorageError::TableNotFound(table.to_string()))
}

impl Storage {
    /// Create `table` for `dimension`-sized vectors unless it already exists.
    ///
    /// # Errors
    /// `DimensionMismatch` if the table exists with another dimension.
    pub fn ensure_table(
        &self,
        table: &TableName,
        dimension: usize,
    ) -> Result<TableStatus, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;

        if let Some(existing) = recorded_dimension(&tx, table)? {
            if existing != dimension {
                return Err(StorageError::DimensionMismatch {
                    table: table.to_string(),
                    expected: existing,
                    actual: dimension,
                });
            }
            return Ok(TableStatus::Existing);
        }

        let rows = table.rows_ident();
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {rows} (
                id INTEGER PRIMARY KEY,
                tweet_id TEXT NOT NULL,
                author TEXT NOT NULL,
                author_id TEXT NOT NULL,
                content TEXT NOT NULL,
                retweet_count INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0,
                reply_count INTEGER NOT NULL DEFAULT 0,
                quote_count INTEGER NOT NULL DEFAULT 0,
                bookmark_count INTEGER NOT NULL DEFAULT 0,
                impression_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                lang TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS {author_idx} ON {rows}(author);
            CREATE INDEX IF NOT EXISTS {created_idx} ON {rows}(created_at);
            CREATE VIRTUAL TABLE IF NOT EXISTS {vec} USING vec0(embedding float[{dimension}]);",
            author_idx = table.index_ident("author"),
            created_idx = table.index_ident("created_at"),
            vec = table.vec_ident(),
        ))?;
        tx.execute(
            "INSERT INTO vector_tables (name, dimension, created_at) VALUES (?1, ?2, ?3)",
            params![table.as_str(), dimension as i64, format_timestamp(&Utc::now())],
        )?;
        tx.commit()?;

        tracing::info!(table = %table, dimension, "Created vector table");
        Ok(TableStatus::Created)
    }

    /// Vector dimension of `table`, if it exists.
    ///
    /// # Errors
    /// Returns error on database failure.
    pub fn table_dimension(&self, table: &TableName) -> Result<Option<usize>, StorageError> {
        let conn = get_conn(&self.pool)?;
        recorded_dimension(&conn, table)
    }

    /// # Errors
    /// `TableNotFound` if the table was never created.
    pub fn count(&self, table: &TableName) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        require_dimension(&conn, table)?;
        let n: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.rows_ident()), [], |row| {
                row.get(0)
            })?;
        Ok(n as usize)
    }

    /// All vector tables with their dimension and row count, by name.
    ///
    /// # Errors
    /// Returns error on database failure.
    pub fn list_tables(&self) -> Result<Vec<TableInfo>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT name, dimension, created_at FROM vector_tables ORDER BY name")?;
        let registered: Vec<(String, i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .filter_map(log_row_error)
            .collect();

        let mut tables = Vec::with_capacity(registered.len());
        for (name, dimension, created_at) in registered {
            let Ok(table) = TableName::new(&name) else {
                tracing::warn!(name, "Skipping registry entry with invalid table name");
                continue;
            };
            let rows: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table.rows_ident()),
                [],
                |row| row.get(0),
            )?;
            tables.push(TableInfo {
                name,
                dimension: dimension as usize,
                rows: rows as usize,
                created_at,
            });
        }
        Ok(tables)
    }

    /// Drop `table` and its vector index. Returns `false` if it didn't exist.
    ///
    /// # Errors
    /// Returns error on database failure.
    pub fn drop_table(&self, table: &TableName) -> Result<bool, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        if recorded_dimension(&tx, table)?.is_none() {
            return Ok(false);
        }
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {vec}; DROP TABLE IF EXISTS {rows};",
            vec = table.vec_ident(),
            rows = table.rows_ident(),
        ))?;
        tx.execute("DELETE FROM vector_tables WHERE name = ?1", params![table.as_str()])?;
        tx.commit()?;
        tracing::info!(table = %table, "Dropped vector table");
        Ok(true)
    }
}
