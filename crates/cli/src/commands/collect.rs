use std::path::PathBuf;

use anyhow::{bail, Result};
use tweetvec_collector::{
    save_to_file, Collector, RateLimitPolicy, TwitterClient, DEFAULT_AUTHORS, DEFAULT_TOPICS,
};
use tweetvec_core::AppConfig;

use crate::ModeArg;

pub(crate) struct CollectRequest {
    pub mode: ModeArg,
    pub topics: Vec<String>,
    pub authors: Vec<String>,
    pub max_results: usize,
    pub max_requests: usize,
    pub output_dir: PathBuf,
    pub output_file: Option<String>,
}

fn or_defaults(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| (*s).to_owned()).collect()
    } else {
        values
    }
}

pub(crate) async fn run(config: &AppConfig, request: CollectRequest) -> Result<()> {
    if request.max_requests == 0 {
        bail!("--max-requests must be at least 1");
    }
    let bearer = config.collector.require_bearer_token()?.to_owned();
    let client = TwitterClient::new(bearer, &config.collector.api_url)?;
    let mut collector = Collector::new(client, RateLimitPolicy::default(), request.max_requests);

    let dataset = match request.mode {
        ModeArg::Topics => {
            let topics = or_defaults(request.topics, DEFAULT_TOPICS);
            collector.collect_topics(&topics, request.max_results).await
        },
        ModeArg::Authors => {
            let authors = or_defaults(request.authors, DEFAULT_AUTHORS);
            collector.collect_authors(&authors, request.max_results).await
        },
    };

    let path = save_to_file(&dataset, &request.output_dir, request.output_file.as_deref())?;
    let failed = dataset.failed_queries();
    if failed > 0 {
        tracing::warn!(failed, "Some queries failed, see the error fields in the output file");
    }
    println!(
        "Collected {} tweets in {} requests, saved to {}",
        dataset.total_tweets(),
        collector.budget().used(),
        path.display()
    );
    Ok(())
}
