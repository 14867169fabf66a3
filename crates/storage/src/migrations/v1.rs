//! Migration v1: registry of vector tables and their dimensions

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS vector_tables (
    name TEXT PRIMARY KEY,
    dimension INTEGER NOT NULL CHECK (dimension > 0),
    created_at TEXT NOT NULL
);
";
