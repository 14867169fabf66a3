use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tweetvec_core::{Dataset, EmbeddedTweet, Tweet};
use tweetvec_embeddings::{check_vectors, EmbeddingProvider};
use tweetvec_storage::{Storage, TableName, TableStatus};

use crate::error::ServiceError;

/// Texts per call into the embedding model.
const EMBED_CHUNK: usize = 256;

/// What a seed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub table: String,
    pub files: usize,
    /// Records that passed validation and were inserted
    pub inserted: usize,
    /// Records dropped as malformed
    pub skipped: usize,
    pub table_status: TableStatus,
}

/// Offline path: dataset files in, one bulk insert out.
pub struct SeedLoader {
    embedder: Arc<dyn EmbeddingProvider>,
    storage: Arc<Storage>,
}

impl SeedLoader {
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, storage: Arc<Storage>) -> Self {
        Self { embedder, storage }
    }

    /// Reads every file, embeds every valid record, then inserts them in one transaction.
    ///
    /// Any unreadable file or embedding failure aborts before anything is written.
    pub async fn load(&self, files: &[PathBuf], table: &TableName) -> Result<SeedReport, ServiceError> {
        let (tweets, skipped) = read_datasets(files)?;
        tracing::info!(
            files = files.len(),
            records = tweets.len(),
            skipped,
            "Loaded dataset records"
        );

        let rows = self.embed_all(tweets).await?;

        let storage = Arc::clone(&self.storage);
        let target = table.clone();
        let dimension = self.embedder.dimension();
        let (table_status, inserted) = tokio::task::spawn_blocking(move || {
            let status = storage.ensure_table(&target, dimension)?;
            let inserted = storage.insert_batch(&target, &rows)?;
            Ok::<_, ServiceError>((status, inserted))
        })
        .await??;

        tracing::info!(table = %table, inserted, "Seed load complete");
        Ok(SeedReport { table: table.to_string(), files: files.len(), inserted, skipped, table_status })
    }

    async fn embed_all(&self, tweets: Vec<Tweet>) -> Result<Vec<EmbeddedTweet>, ServiceError> {
        let dimension = self.embedder.dimension();
        let mut rows = Vec::with_capacity(tweets.len());
        let mut pending = tweets.into_iter().peekable();

        while pending.peek().is_some() {
            let chunk: Vec<Tweet> = pending.by_ref().take(EMBED_CHUNK).collect();
            let texts: Vec<String> = chunk.iter().map(|t| t.content.clone()).collect();
            let embedder = Arc::clone(&self.embedder);
            let vectors = tokio::task::spawn_blocking(move || {
                let vectors = embedder.embed_batch(&texts)?;
                check_vectors(vectors, texts.len(), dimension)
            })
            .await??;
            rows.extend(chunk.into_iter().zip(vectors).map(|(t, v)| EmbeddedTweet::new(t, v)));
            tracing::debug!(embedded = rows.len(), "Embedding progress");
        }
        Ok(rows)
    }
}

fn read_datasets(files: &[PathBuf]) -> Result<(Vec<Tweet>, usize), ServiceError> {
    let now = Utc::now();
    let mut tweets = Vec::new();
    let mut skipped = 0_usize;
    for path in files {
        let (mut parsed, bad) = Dataset::read(path)?.into_tweets(now);
        tweets.append(&mut parsed);
        skipped = skipped.saturating_add(bad);
    }
    Ok((tweets, skipped))
}
