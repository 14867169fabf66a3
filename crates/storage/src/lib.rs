//! Vector store for tweetvec
//!
//! `SQLite` with the sqlite-vec extension. Each logical table is a plain row table holding
//! the tweet fields plus a `vec0` virtual table holding the embeddings under the same rowid.
//! All methods are synchronous; async callers go through `spawn_blocking`.

mod error;
mod migrations;
mod storage;
mod table;
#[cfg(test)]
mod tests;
mod vec_init;

pub use error::StorageError;
pub use storage::{SearchHit, Storage, StoredTweet};
pub use table::{TableInfo, TableName, TableStatus};
pub use vec_init::init_sqlite_vec;
