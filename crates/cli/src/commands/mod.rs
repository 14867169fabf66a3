pub(crate) mod agents;
pub(crate) mod collect;
pub(crate) mod ingest;
pub(crate) mod publish;
pub(crate) mod search;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tweetvec_bus::RedisBus;
use tweetvec_core::AppConfig;
use tweetvec_embeddings::{EmbeddingProvider, EmbeddingService};
use tweetvec_storage::{Storage, TableName};

use crate::StoreArgs;

pub(crate) fn open_storage(config: &AppConfig, db_path: Option<PathBuf>) -> Result<Arc<Storage>> {
    let path = db_path.unwrap_or_else(|| config.store.db_path.clone());
    let storage = Storage::new(&path, config.store.pool_size)
        .with_context(|| format!("opening vector store at {}", path.display()))?;
    Ok(Arc::new(storage))
}

pub(crate) async fn connect_bus(config: &AppConfig) -> Result<RedisBus> {
    RedisBus::connect(&config.bus)
        .await
        .with_context(|| format!("connecting to pub/sub at {}", config.bus.addr))
}

pub(crate) fn table_name(config: &AppConfig, store: &StoreArgs) -> Result<TableName> {
    let name = store.table.as_deref().unwrap_or(&config.store.table);
    Ok(TableName::new(name)?)
}

/// Loads the embedding model off the async runtime.
pub(crate) async fn load_embedder(config: &AppConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    tracing::info!("Initializing embedding model (first run downloads it)");
    let cache_dir = config.embedding.cache_dir.clone();
    let service = tokio::task::spawn_blocking(move || EmbeddingService::new(cache_dir))
        .await?
        .context("loading embedding model")?;
    Ok(Arc::new(service))
}

/// Resolves on Ctrl-C.
pub(crate) async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
