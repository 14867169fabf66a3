//! Typed error enum for the storage layer.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection pool exhausted or failed to open a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// SQL failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid table name {name:?}: {reason}")]
    InvalidTableName { name: String, reason: &'static str },

    #[error("table {0} does not exist")]
    TableNotFound(String),

    /// Vector length differs from the dimension the table was created with.
    #[error("table {table} stores {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { table: String, expected: usize, actual: usize },

    /// Stored data could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
}
