use std::sync::Arc;

use async_trait::async_trait;
use tweetvec_core::{decode_tweet, EmbeddedTweet};
use tweetvec_embeddings::EmbeddingProvider;
use tweetvec_storage::{Storage, TableName};

use crate::error::ServiceError;
use crate::subscriber::MessageHandler;

/// Online path: bus payload in, one vector-store row out.
pub struct IngestService {
    embedder: Arc<dyn EmbeddingProvider>,
    storage: Arc<Storage>,
    table: TableName,
}

impl IngestService {
    /// Prepares `table` for the embedder's dimension.
    ///
    /// Fails if the table already exists with a different dimension.
    pub async fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        storage: Arc<Storage>,
        table: TableName,
    ) -> Result<Self, ServiceError> {
        let dimension = embedder.dimension();
        let status = {
            let storage = Arc::clone(&storage);
            let table = table.clone();
            tokio::task::spawn_blocking(move || storage.ensure_table(&table, dimension)).await??
        };
        tracing::info!(
            table = %table,
            dimension,
            model = embedder.model_name(),
            ?status,
            "Ingest target ready"
        );
        Ok(Self { embedder, storage, table })
    }

    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }

    /// Decodes, embeds and appends one message. Returns the new rowid.
    pub async fn handle_message(&self, payload: &str) -> Result<i64, ServiceError> {
        let tweet = decode_tweet(payload)?;
        tracing::debug!(tweet_id = %tweet.tweet_id, author = %tweet.author, "Received tweet");

        let embedder = Arc::clone(&self.embedder);
        let text = tweet.content.clone();
        let vector = tokio::task::spawn_blocking(move || embedder.embed(&text)).await??;

        let storage = Arc::clone(&self.storage);
        let table = self.table.clone();
        let row = EmbeddedTweet::new(tweet, vector);
        let tweet_id = row.tweet.tweet_id.clone();
        let rowid = tokio::task::spawn_blocking(move || storage.append(&table, &row)).await??;
        tracing::info!(tweet_id = %tweet_id, rowid, "Stored tweet embedding");
        Ok(rowid)
    }
}

#[async_trait]
impl MessageHandler for IngestService {
    async fn handle(&mut self, payload: &str) -> Result<(), ServiceError> {
        self.handle_message(payload).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
