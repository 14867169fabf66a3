use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::Utc;
use tweetvec_core::{AppConfig, Dataset};
use tweetvec_service::{publish_test_tweet, Replayer, Simulation};
use tweetvec_storage::TableName;

use super::connect_bus;

pub(crate) async fn run_publish(config: &AppConfig, username: Option<&str>, text: Option<&str>) -> Result<()> {
    let bus = connect_bus(config).await?;
    let (message, receivers) = publish_test_tweet(&bus, username, text).await?;
    println!("{}", serde_json::to_string_pretty(&message)?);
    println!("Delivered to {receivers} subscriber(s)");
    Ok(())
}

pub(crate) async fn run_replay(
    config: &AppConfig,
    file: &Path,
    pace_ms: u64,
    max_tweets: Option<usize>,
) -> Result<()> {
    let dataset = Dataset::read(file).with_context(|| format!("reading {}", file.display()))?;
    let (tweets, skipped) = dataset.into_tweets(Utc::now());
    if skipped > 0 {
        tracing::warn!(skipped, "Skipped invalid records");
    }
    let bus = connect_bus(config).await?;
    let sent = Replayer::new(Duration::from_millis(pace_ms), max_tweets).replay(&bus, &tweets).await?;
    println!("Replayed {sent} tweets from {}", file.display());
    Ok(())
}

pub(crate) async fn run_simulate(
    config: &AppConfig,
    simulation_id: &str,
    tweets_file: &Path,
    seed_memory_id: &str,
    pace_ms: u64,
) -> Result<()> {
    TableName::new(seed_memory_id).context("--seed-memory-id must be a valid table name")?;
    let simulation = Simulation::from_file(simulation_id, seed_memory_id, tweets_file)?;
    let bus = connect_bus(config).await?;
    let sent = simulation.run(&bus, Duration::from_millis(pace_ms)).await?;
    println!("Simulation {simulation_id} published {sent} events");
    Ok(())
}
