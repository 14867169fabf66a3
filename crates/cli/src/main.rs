use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tweetvec_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "tweetvec")]
#[command(about = "Tweet pipeline: pub/sub ingest, local embeddings and a sqlite-vec store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for where rows are read from or written to.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct StoreArgs {
    /// SQLite database file (default: $TWEETVEC_DB_PATH)
    #[arg(long)]
    pub db_path: Option<PathBuf>,
    /// Table name (default: $TWEETVEC_TABLE_NAME)
    #[arg(short, long)]
    pub table: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum ModeArg {
    Topics,
    Authors,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to the tweet channel and store an embedding for every tweet
    Embed {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Embed dataset files and bulk-insert them into a table
    Seed {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Collect tweets from the Twitter API into a dataset file
    Collect {
        #[arg(long, value_enum, default_value = "topics")]
        mode: ModeArg,
        /// Search queries (topic mode)
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Handles (author mode)
        #[arg(long, num_args = 1..)]
        authors: Vec<String>,
        /// Tweets per topic or author
        #[arg(long, default_value = "100")]
        max_results: usize,
        /// Hard cap on API requests for the run
        #[arg(long, default_value = "50")]
        max_requests: usize,
        #[arg(long, default_value = "data/datasets")]
        output_dir: PathBuf,
        #[arg(long)]
        output_file: Option<String>,
    },
    /// Publish one test tweet
    Publish {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Publish every tweet of a dataset file at a fixed pace
    Replay {
        file: PathBuf,
        #[arg(long, default_value = "100")]
        pace_ms: u64,
        #[arg(long)]
        max_tweets: Option<usize>,
    },
    /// Print rows of a table
    View {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Include embedding vectors
        #[arg(long)]
        vectors: bool,
    },
    /// List tables with dimension and row count
    Tables {
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Delete a table and its vector index
    DropTable {
        name: String,
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Semantic search; without a query, list the most recent tweets
    Search {
        query: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
        /// Case-insensitive author substring
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long, default_value = "10")]
        limit: usize,
        #[arg(long)]
        sort_by_date: bool,
    },
    /// Archive validated tweets from the channel into JSONL files
    Archive {
        dest_dir: PathBuf,
    },
    /// Run one cringe-detecting agent per personality
    Agents {
        /// Existing profile set; a new one is generated when omitted
        #[arg(long)]
        profile_set: Option<PathBuf>,
        #[arg(long, default_value = "5")]
        num_agents: usize,
        #[arg(long)]
        field_of_focus: Option<String>,
        /// Overrides $CRINGE_THRESHOLD; a number in [0, 1]
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f32>,
    },
    /// Generate a new profile set
    Profiles {
        #[arg(long, default_value = "5")]
        num_agents: usize,
        #[arg(long)]
        field_of_focus: Option<String>,
        #[arg(long, default_value = "profiles")]
        output_dir: PathBuf,
    },
    /// Publish a scripted event stream as the simulator account
    Simulate {
        simulation_id: String,
        #[arg(long)]
        tweets_file: PathBuf,
        /// Table the embedding service should use for this world
        #[arg(long)]
        seed_memory_id: String,
        #[arg(long, default_value = "1000")]
        pace_ms: u64,
    },
}

fn parse_threshold(raw: &str) -> Result<f32, String> {
    let value: f32 = raw.trim().parse().map_err(|e| format!("not a number: {e}"))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be a finite number in [0, 1], got {raw}"));
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Embed { store } => commands::ingest::run_embed(&config, &store).await,
        Commands::Seed { files, store } => commands::ingest::run_seed(&config, &files, &store).await,
        Commands::Collect {
            mode,
            topics,
            authors,
            max_results,
            max_requests,
            output_dir,
            output_file,
        } => {
            let request = commands::collect::CollectRequest {
                mode,
                topics,
                authors,
                max_results,
                max_requests,
                output_dir,
                output_file,
            };
            commands::collect::run(&config, request).await
        },
        Commands::Publish { username, text } => {
            commands::publish::run_publish(&config, username.as_deref(), text.as_deref()).await
        },
        Commands::Replay { file, pace_ms, max_tweets } => {
            commands::publish::run_replay(&config, &file, pace_ms, max_tweets).await
        },
        Commands::View { store, limit, vectors } => {
            commands::search::run_view(&config, &store, limit, vectors).await
        },
        Commands::Tables { db_path } => commands::search::run_tables(&config, db_path).await,
        Commands::DropTable { name, db_path } => {
            commands::search::run_drop_table(&config, &name, db_path).await
        },
        Commands::Search { query, store, username, limit, sort_by_date } => {
            let query = tweetvec_service::SearchQuery { text: query, username, limit, sort_by_date };
            commands::search::run_search(&config, &store, query).await
        },
        Commands::Archive { dest_dir } => commands::ingest::run_archive(&config, &dest_dir).await,
        Commands::Agents { profile_set, num_agents, field_of_focus, threshold } => {
            commands::agents::run_agents(
                &config,
                profile_set.as_deref(),
                num_agents,
                field_of_focus.as_deref(),
                threshold,
            )
            .await
        },
        Commands::Profiles { num_agents, field_of_focus, output_dir } => {
            commands::agents::run_profiles(&config, num_agents, field_of_focus.as_deref(), &output_dir)
                .await
        },
        Commands::Simulate { simulation_id, tweets_file, seed_memory_id, pace_ms } => {
            commands::publish::run_simulate(&config, &simulation_id, &tweets_file, &seed_memory_id, pace_ms)
                .await
        },
    }
}
