//! Logical vector tables and their names.

use std::fmt;

use crate::error::StorageError;

const MAX_NAME_LEN: usize = 59;
const VEC_SUFFIX: &str = "_vec";
const RESERVED: &[&str] = &["vector_tables"];

/// A validated table name, safe to splice into SQL as a quoted identifier.
///
/// Names are stored in ASCII lowercase: SQLite resolves identifiers case-insensitively, so
/// `Tweets` and `tweets` are the same table and must share one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// # Errors
    /// Returns `StorageError::InvalidTableName` unless the name is an ASCII identifier
    /// that doesn't collide with internal tables.
    pub fn new(name: &str) -> Result<Self, StorageError> {
        let invalid = |reason| StorageError::InvalidTableName { name: name.to_owned(), reason };
        let mut chars = name.chars();
        match chars.next() {
            None => return Err(invalid("empty")),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(invalid("must start with a letter or underscore"));
            },
            Some(_) => {},
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("only ASCII letters, digits and underscores are allowed"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("too long"));
        }
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("sqlite_") || RESERVED.contains(&lower.as_str()) {
            return Err(invalid("reserved name"));
        }
        if lower.ends_with(VEC_SUFFIX) {
            return Err(invalid("the _vec suffix is reserved for vector indexes"));
        }
        Ok(Self(lower))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted identifier of the row table.
    pub(crate) fn rows_ident(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Quoted identifier of the `vec0` index.
    pub(crate) fn vec_ident(&self) -> String {
        format!("\"{}{VEC_SUFFIX}\"", self.0)
    }

    pub(crate) fn index_ident(&self, column: &str) -> String {
        format!("\"{}_{column}_idx\"", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of [`crate::Storage::ensure_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Created,
    Existing,
}

/// Summary row for `tables` listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub dimension: usize,
    pub rows: usize,
    pub created_at: String,
}
