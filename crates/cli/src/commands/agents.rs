use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tweetvec_core::AppConfig;
use tweetvec_llm::{CringeDetector, LlmClient, ProfileGenerator};
use tweetvec_service::{AgentDeps, AgentOrchestrator, ProfileSet};

use super::{connect_bus, ctrl_c};

fn llm_client(config: &AppConfig) -> Result<Arc<LlmClient>> {
    Ok(Arc::new(LlmClient::from_config(&config.llm).context("configuring LLM client")?))
}

pub(crate) async fn run_profiles(
    config: &AppConfig,
    num_agents: usize,
    field_of_focus: Option<&str>,
    output_dir: &Path,
) -> Result<()> {
    let generator = ProfileGenerator::new(llm_client(config)?);
    let set = ProfileSet::generate(&generator, output_dir, num_agents, field_of_focus).await?;
    println!("Wrote {} personalities to {}", set.personalities.len(), set.dir.display());
    Ok(())
}

pub(crate) async fn run_agents(
    config: &AppConfig,
    profile_set: Option<&Path>,
    num_agents: usize,
    field_of_focus: Option<&str>,
    threshold: Option<f32>,
) -> Result<()> {
    let llm = llm_client(config)?;
    let set = match profile_set {
        Some(dir) => ProfileSet::load(dir)?,
        None => {
            tracing::info!(num_agents, "No profile set given, generating one");
            let generator = ProfileGenerator::new(Arc::clone(&llm));
            ProfileSet::generate(&generator, Path::new("profiles"), num_agents, field_of_focus).await?
        },
    };

    let threshold = threshold.unwrap_or(config.agents.cringe_threshold);
    let bus = Arc::new(connect_bus(config).await?);
    let deps = AgentDeps {
        relevance: Arc::clone(&llm) as _,
        judge: Arc::new(CringeDetector::new(Arc::clone(&llm), threshold)),
        writer: llm,
        publisher: Arc::clone(&bus) as _,
        log_folder: config.agents.log_folder.clone(),
        session_id: uuid::Uuid::new_v4().to_string(),
    };
    tracing::info!(
        agents = set.personalities.len(),
        threshold,
        profile_set = %set.dir.display(),
        "Starting agents"
    );

    let stats = AgentOrchestrator::new(deps).run(set.personalities, bus, ctrl_c()).await?;
    for (name, stats) in stats {
        println!("{name}: {stats:?}");
    }
    Ok(())
}
