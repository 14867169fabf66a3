use std::path::{Path, PathBuf};

use anyhow::Result;
use tweetvec_core::AppConfig;
use tweetvec_service::{run_subscriber, ArchiveWriter, IngestService, SeedLoader};

use super::{connect_bus, ctrl_c, load_embedder, open_storage, table_name};
use crate::StoreArgs;

/// Long-running subscriber: every valid tweet on the channel becomes a row.
pub(crate) async fn run_embed(config: &AppConfig, store: &StoreArgs) -> Result<()> {
    let storage = open_storage(config, store.db_path.clone())?;
    let table = table_name(config, store)?;
    let embedder = load_embedder(config).await?;
    let bus = connect_bus(config).await?;

    let mut service = IngestService::new(embedder, storage, table).await?;
    tracing::info!(table = %service.table(), channel = %bus.channel(), "Embedding service ready");
    let stats = run_subscriber(&bus, &mut service, ctrl_c()).await?;
    tracing::info!(?stats, "Embedding service stopped");
    Ok(())
}

pub(crate) async fn run_seed(config: &AppConfig, files: &[PathBuf], store: &StoreArgs) -> Result<()> {
    let storage = open_storage(config, store.db_path.clone())?;
    let table = table_name(config, store)?;
    let embedder = load_embedder(config).await?;

    let report = SeedLoader::new(embedder, storage).load(files, &table).await?;
    println!(
        "Seeded {} tweets into '{}' from {} file(s), skipped {} ({:?})",
        report.inserted, report.table, report.files, report.skipped, report.table_status
    );
    Ok(())
}

pub(crate) async fn run_archive(config: &AppConfig, dest_dir: &Path) -> Result<()> {
    let bus = connect_bus(config).await?;
    let mut writer = ArchiveWriter::new(dest_dir)?;
    tracing::info!(dir = %dest_dir.display(), channel = %bus.channel(), "Archiving tweets");

    let result = run_subscriber(&bus, &mut writer, ctrl_c()).await;
    let flushed = writer.flush();
    let stats = result?;
    if let Some(path) = flushed? {
        tracing::info!(path = %path.display(), "Flushed remaining tweets");
    }
    tracing::info!(?stats, "Archive stopped");
    Ok(())
}
