use std::path::PathBuf;

use anyhow::{bail, Result};
use serde_json::{json, Value};
use tweetvec_core::{format_timestamp, AppConfig, Tweet};
use tweetvec_service::{SearchQuery, SearchService};
use tweetvec_storage::TableName;

use super::{load_embedder, open_storage, table_name};
use crate::StoreArgs;

fn tweet_json(tweet: &Tweet) -> Value {
    json!({
        "tweet_id": tweet.tweet_id,
        "author": tweet.author,
        "content": tweet.content,
        "created_at": format_timestamp(&tweet.created_at),
        "metrics": tweet.metrics,
    })
}

pub(crate) async fn run_search(config: &AppConfig, store: &StoreArgs, query: SearchQuery) -> Result<()> {
    let storage = open_storage(config, store.db_path.clone())?;
    let table = table_name(config, store)?;
    let wants_model = query.text.as_deref().is_some_and(|t| !t.trim().is_empty());
    let embedder = if wants_model { Some(load_embedder(config).await?) } else { None };

    let service = SearchService::new(storage, embedder);
    let results = service.search(&table, &query).await?;
    let rows: Vec<Value> = results
        .iter()
        .map(|r| {
            let mut row = tweet_json(&r.tweet);
            if let (Some(similarity), Some(obj)) = (r.similarity, row.as_object_mut()) {
                obj.insert("similarity".to_owned(), json!(similarity));
            }
            row
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

pub(crate) async fn run_view(
    config: &AppConfig,
    store: &StoreArgs,
    limit: usize,
    vectors: bool,
) -> Result<()> {
    let storage = open_storage(config, store.db_path.clone())?;
    let table = table_name(config, store)?;
    let rows = SearchService::new(storage, None).view(&table, limit, vectors).await?;
    let rows: Vec<Value> = rows
        .iter()
        .map(|stored| {
            let mut row = tweet_json(&stored.tweet);
            if let Some(obj) = row.as_object_mut() {
                obj.insert("rowid".to_owned(), json!(stored.rowid));
                if let Some(vector) = &stored.vector {
                    obj.insert("vector".to_owned(), json!(vector));
                }
            }
            row
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

pub(crate) async fn run_tables(config: &AppConfig, db_path: Option<PathBuf>) -> Result<()> {
    let storage = open_storage(config, db_path)?;
    let tables = SearchService::new(storage, None).tables().await?;
    let rows: Vec<Value> = tables
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "dimension": t.dimension,
                "rows": t.rows,
                "created_at": t.created_at,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

pub(crate) async fn run_drop_table(config: &AppConfig, name: &str, db_path: Option<PathBuf>) -> Result<()> {
    let storage = open_storage(config, db_path)?;
    let table = TableName::new(name)?;
    if !SearchService::new(storage, None).drop_table(&table).await? {
        bail!("table '{table}' does not exist");
    }
    println!("Dropped table '{table}'");
    Ok(())
}
