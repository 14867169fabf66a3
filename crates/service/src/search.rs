use std::sync::Arc;

use tweetvec_core::Tweet;
use tweetvec_embeddings::EmbeddingProvider;
use tweetvec_storage::{Storage, StoredTweet, TableInfo, TableName};

use crate::error::ServiceError;

/// One search result; `similarity` is set for vector matches only.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub tweet: Tweet,
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Natural-language query; `None` lists the most recent tweets
    pub text: Option<String>,
    /// Case-insensitive author substring
    pub username: Option<String>,
    pub limit: usize,
    /// Re-sort vector matches newest first
    pub sort_by_date: bool,
}

/// Read-side operations on the vector store: search, view, list and drop tables.
pub struct SearchService {
    storage: Arc<Storage>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl SearchService {
    /// `embedder` is only needed for text queries.
    #[must_use]
    pub fn new(storage: Arc<Storage>, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self { storage, embedder }
    }

    pub async fn search(&self, table: &TableName, query: &SearchQuery) -> Result<Vec<SearchResult>, ServiceError> {
        let storage = Arc::clone(&self.storage);
        let target = table.clone();
        let username = query.username.clone();
        let limit = query.limit;

        let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            let rows = tokio::task::spawn_blocking(move || {
                storage.recent(&target, limit, username.as_deref())
            })
            .await??;
            return Ok(rows.into_iter().map(|row| SearchResult { tweet: row.tweet, similarity: None }).collect());
        };

        let embedder = self.embedder.clone().ok_or_else(|| {
            ServiceError::InvalidInput("text search needs an embedding model".to_owned())
        })?;
        let text = text.to_owned();
        let hits = tokio::task::spawn_blocking(move || {
            let vector = embedder.embed(&text)?;
            Ok::<_, ServiceError>(storage.search(&target, &vector, limit, username.as_deref())?)
        })
        .await??;
        tracing::debug!(table = %table, hits = hits.len(), "Vector search complete");

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .map(|hit| SearchResult { tweet: hit.tweet, similarity: Some(hit.similarity) })
            .collect();
        if query.sort_by_date {
            results.sort_by(|a, b| b.tweet.created_at.cmp(&a.tweet.created_at));
        }
        Ok(results)
    }

    pub async fn view(&self, table: &TableName, limit: usize, include_vectors: bool) -> Result<Vec<StoredTweet>, ServiceError> {
        let storage = Arc::clone(&self.storage);
        let table = table.clone();
        Ok(tokio::task::spawn_blocking(move || storage.scan(&table, limit, include_vectors)).await??)
    }

    pub async fn tables(&self) -> Result<Vec<TableInfo>, ServiceError> {
        let storage = Arc::clone(&self.storage);
        Ok(tokio::task::spawn_blocking(move || storage.list_tables()).await??)
    }

    /// Returns `false` when the table did not exist.
    pub async fn drop_table(&self, table: &TableName) -> Result<bool, ServiceError> {
        let storage = Arc::clone(&self.storage);
        let target = table.clone();
        let dropped = tokio::task::spawn_blocking(move || storage.drop_table(&target)).await??;
        if dropped {
            tracing::info!(table = %table, "Dropped table");
        }
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use chrono::{Duration, Utc};
    use tweetvec_core::EmbeddedTweet;

    use super::*;
    use crate::test_support::{embedder, storage, table, FakeEmbedder};

    fn seed(storage: &Storage) {
        let fake = FakeEmbedder;
        let base = Utc::now();
        let rows: Vec<EmbeddedTweet> = [("Paul_G", "startups"), ("naval", "wealth"), ("pg_fan", "startups!")]
            .iter()
            .enumerate()
            .map(|(i, (author, content))| {
                let mut tweet = Tweet::new(*author, *content);
                tweet.created_at = base - Duration::minutes(10 - i64::try_from(i).unwrap());
                EmbeddedTweet::new(tweet, fake.embed(content).unwrap())
            })
            .collect();
        storage.ensure_table(&table("tweets"), 4).unwrap();
        storage.insert_batch(&table("tweets"), &rows).unwrap();
    }

    #[tokio::test]
    async fn test_text_query_ranks_by_similarity() {
        let (storage, _dir) = storage();
        seed(&storage);
        let service = SearchService::new(storage, Some(embedder()));
        let query = SearchQuery { text: Some("startups".to_owned()), limit: 3, ..SearchQuery::default() };
        let results = service.search(&table("tweets"), &query).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].tweet.content, "startups");
        assert!(results[0].similarity.unwrap() > results[2].similarity.unwrap());
    }

    #[tokio::test]
    async fn test_username_filter_and_date_sort() {
        let (storage, _dir) = storage();
        seed(&storage);
        let service = SearchService::new(storage, Some(embedder()));
        let query = SearchQuery {
            text: Some("startups".to_owned()),
            username: Some("P".to_owned()),
            limit: 10,
            sort_by_date: true,
        };
        let results = service.search(&table("tweets"), &query).await.unwrap();
        let authors: Vec<&str> = results.iter().map(|r| r.tweet.author.as_str()).collect();
        assert_eq!(authors, vec!["pg_fan", "Paul_G"]);
    }

    #[tokio::test]
    async fn test_no_query_lists_recent() {
        let (storage, _dir) = storage();
        seed(&storage);
        let service = SearchService::new(storage, None);
        let query = SearchQuery { text: Some("  ".to_owned()), limit: 2, ..SearchQuery::default() };
        let results = service.search(&table("tweets"), &query).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tweet.author, "pg_fan");
        assert!(results[0].similarity.is_none());
    }

    #[tokio::test]
    async fn test_text_query_without_model_is_rejected() {
        let (storage, _dir) = storage();
        seed(&storage);
        let service = SearchService::new(storage, None);
        let query = SearchQuery { text: Some("wealth".to_owned()), limit: 2, ..SearchQuery::default() };
        assert!(matches!(
            service.search(&table("tweets"), &query).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_view_tables_and_drop() {
        let (storage, _dir) = storage();
        seed(&storage);
        let service = SearchService::new(storage, None);

        let rows = service.view(&table("tweets"), 2, true).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].vector.as_ref().unwrap().len(), 4);

        let tables = service.tables().await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, 3);

        assert!(service.drop_table(&table("tweets")).await.unwrap());
        assert!(!service.drop_table(&table("tweets")).await.unwrap());
        assert!(service.tables().await.unwrap().is_empty());
    }
}
