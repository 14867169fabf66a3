use std::path::Path;
use std::time::Duration;

use tweetvec_bus::TweetPublisher;
use tweetvec_core::{TweetMessage, SIMULATOR_AUTHOR};

use crate::error::ServiceError;

/// A scripted event stream published as the simulator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub simulation_id: String,
    /// Table the embedding service should be seeded from and write to
    pub seed_memory_id: String,
    pub events: Vec<String>,
}

impl Simulation {
    /// Reads one event per non-blank line of `tweets_file`.
    pub fn from_file(simulation_id: &str, seed_memory_id: &str, tweets_file: &Path) -> Result<Self, ServiceError> {
        let raw = std::fs::read_to_string(tweets_file).map_err(|e| ServiceError::io(tweets_file, e))?;
        let events = raw.lines().map(str::trim).filter(|l| !l.is_empty()).map(ToOwned::to_owned).collect();
        Ok(Self {
            simulation_id: simulation_id.to_owned(),
            seed_memory_id: seed_memory_id.to_owned(),
            events,
        })
    }

    /// Publishes every event, `pace` apart. Returns how many were sent.
    pub async fn run(&self, publisher: &dyn TweetPublisher, pace: Duration) -> Result<usize, ServiceError> {
        tracing::info!(
            simulation = %self.simulation_id,
            seed_memory = %self.seed_memory_id,
            events = self.events.len(),
            "Starting simulation; point the embedding service at the seed memory table"
        );
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 && !pace.is_zero() {
                tokio::time::sleep(pace).await;
            }
            let receivers = publisher.publish(&TweetMessage::new(SIMULATOR_AUTHOR, event.clone())).await?;
            tracing::debug!(simulation = %self.simulation_id, n = i, receivers, "Published event");
        }
        tracing::info!(simulation = %self.simulation_id, "Simulation event stream finished");
        Ok(self.events.len())
    }
}
