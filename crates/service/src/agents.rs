//! Tweet-reacting agents, one per personality.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tweetvec_bus::{TweetPublisher, TweetSource};
use tweetvec_core::{decode_tweet, Personality, TweetMessage};
use tweetvec_llm::{
    check_relevance, compose_reply, CringeDetector, CringeLevel, LlmClient, LlmError, PersonaReply,
    Relevance,
};

use crate::activity::ActivityLog;
use crate::error::ServiceError;
use crate::subscriber::{run_subscriber, LoopStats, MessageHandler};

/// Decides whether a tweet is worth an agent's attention at all.
#[async_trait]
pub trait RelevanceFilter: Send + Sync {
    async fn check(&self, personality: &Personality, tweet: &str) -> Result<Relevance, LlmError>;
}

#[async_trait]
impl RelevanceFilter for LlmClient {
    async fn check(&self, personality: &Personality, tweet: &str) -> Result<Relevance, LlmError> {
        check_relevance(self, personality, tweet).await
    }
}

/// Scores a tweet and decides whether it crosses the threshold.
#[async_trait]
pub trait CringeJudge: Send + Sync {
    async fn analyze(&self, tweet: &str) -> Result<CringeLevel, LlmError>;
    fn is_cringe(&self, level: &CringeLevel) -> bool;
}

#[async_trait]
impl CringeJudge for CringeDetector {
    async fn analyze(&self, tweet: &str) -> Result<CringeLevel, LlmError> {
        Self::analyze(self, tweet).await
    }

    fn is_cringe(&self, level: &CringeLevel) -> bool {
        Self::is_cringe(self, level)
    }
}

/// Writes a reply in a personality's voice.
#[async_trait]
pub trait ReplyWriter: Send + Sync {
    async fn compose(&self, personality: &Personality, tweet: &str) -> Result<PersonaReply, LlmError>;
}

#[async_trait]
impl ReplyWriter for LlmClient {
    async fn compose(&self, personality: &Personality, tweet: &str) -> Result<PersonaReply, LlmError> {
        compose_reply(self, personality, tweet).await
    }
}

/// What an agent did with one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    OwnTweet,
    Irrelevant { explanation: String },
    Ignored { score: f32 },
    Replied { score: f32, reply: String },
}

/// Shared collaborators for every agent in a run.
#[derive(Clone)]
pub struct AgentDeps {
    pub relevance: Arc<dyn RelevanceFilter>,
    pub judge: Arc<dyn CringeJudge>,
    pub writer: Arc<dyn ReplyWriter>,
    pub publisher: Arc<dyn TweetPublisher>,
    pub log_folder: PathBuf,
    pub session_id: String,
}

pub struct AgentRunner {
    personality: Personality,
    deps: AgentDeps,
    log: ActivityLog,
}

impl AgentRunner {
    pub fn new(personality: Personality, deps: AgentDeps) -> Result<Self, ServiceError> {
        let log = ActivityLog::open(&deps.log_folder, &personality.file_stem(), &deps.session_id)?;
        Ok(Self { personality, deps, log })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.personality.name
    }

    /// Decides whether to reply to one bus message, and publishes the reply if so.
    ///
    /// Steps: skip own tweets, check relevance to the personality's interests, score, reply.
    pub async fn handle_message(&mut self, payload: &str) -> Result<Reaction, ServiceError> {
        let tweet = decode_tweet(payload)?;
        if tweet.author == self.personality.name {
            tracing::debug!(agent = %self.personality.name, "Skipping own tweet");
            return Ok(Reaction::OwnTweet);
        }

        let relevance = self.deps.relevance.check(&self.personality, &tweet.content).await?;
        self.log.log_prompt(
            &tweet.content,
            json!({"relevant": relevance.relevant, "explanation": relevance.explanation}),
        )?;
        if !relevance.relevant {
            tracing::debug!(
                agent = %self.personality.name,
                explanation = %relevance.explanation,
                "Skipping irrelevant tweet"
            );
            self.log.log_reaction(json!({
                "action": "skip_irrelevant",
                "tweet_author": tweet.author,
                "explanation": relevance.explanation,
            }))?;
            return Ok(Reaction::Irrelevant { explanation: relevance.explanation });
        }

        let level = self.deps.judge.analyze(&tweet.content).await?;
        self.log.log_prompt(&tweet.content, json!({"score": level.score, "reason": level.reason}))?;

        if !self.deps.judge.is_cringe(&level) {
            tracing::debug!(agent = %self.personality.name, score = level.score, "Tweet below threshold");
            self.log.log_reaction(json!({
                "action": "ignore",
                "tweet_author": tweet.author,
                "score": level.score,
            }))?;
            return Ok(Reaction::Ignored { score: level.score });
        }

        let reply = self.deps.writer.compose(&self.personality, &tweet.content).await?;
        self.log.log_prompt(&tweet.content, json!({"thought": reply.thought, "reply": reply.reply}))?;

        let mut message = TweetMessage::new(self.personality.name.clone(), reply.reply.clone());
        message.author_id = Some(self.personality.file_stem());
        self.deps.publisher.publish(&message).await?;
        self.log.log_reaction(json!({
            "action": "reply",
            "tweet_author": tweet.author,
            "tweet_id": tweet.tweet_id,
            "score": level.score,
            "reason": level.reason,
            "reply": reply.reply,
        }))?;
        tracing::info!(
            agent = %self.personality.name,
            to = %tweet.author,
            score = level.score,
            "Replied to tweet"
        );
        Ok(Reaction::Replied { score: level.score, reply: reply.reply })
    }
}

#[async_trait]
impl MessageHandler for AgentRunner {
    async fn handle(&mut self, payload: &str) -> Result<(), ServiceError> {
        self.handle_message(payload).await.map(|_| ())
    }
}

/// Runs one agent task per personality until shutdown.
pub struct AgentOrchestrator {
    deps: AgentDeps,
}

impl AgentOrchestrator {
    #[must_use]
    pub const fn new(deps: AgentDeps) -> Self {
        Self { deps }
    }

    /// Each agent gets its own subscription. Returns per-agent stats once every task stopped;
    /// the first agent failure is returned after the others have been told to stop.
    pub async fn run<F>(
        &self,
        personalities: Vec<Personality>,
        source: Arc<dyn TweetSource>,
        shutdown: F,
    ) -> Result<Vec<(String, LoopStats)>, ServiceError>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        for personality in personalities {
            let mut runner = AgentRunner::new(personality, self.deps.clone())?;
            let source = Arc::clone(&source);
            let mut stop = stop_rx.clone();
            tracing::info!(agent = %runner.name(), session = %self.deps.session_id, "Starting agent");
            tasks.spawn(async move {
                let shutdown = async move {
                    let _ = stop.wait_for(|stopped| *stopped).await;
                };
                let result = run_subscriber(source.as_ref(), &mut runner, shutdown).await;
                (runner.name().to_owned(), result)
            });
        }

        tokio::pin!(shutdown);
        let mut results = Vec::new();
        let mut first_error = None;
        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    match joined? {
                        (name, Ok(stats)) => {
                            tracing::info!(agent = %name, ?stats, "Agent stopped");
                            results.push((name, stats));
                        },
                        (name, Err(e)) => {
                            tracing::error!(agent = %name, error = %e, "Agent failed");
                            let _ = stop_tx.send(true);
                            first_error.get_or_insert(e);
                        },
                    }
                },
                () = &mut shutdown, if !*stop_tx.borrow() => {
                    tracing::info!("Stopping agents");
                    let _ = stop_tx.send(true);
                },
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
