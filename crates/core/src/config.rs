//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BUS_ADDR, DEFAULT_CRINGE_THRESHOLD, DEFAULT_TABLE_NAME, DEFAULT_TWEET_CHANNEL,
};
use crate::env_config::parse_or_default;
use crate::error::ConfigError;

const DEFAULT_POOL_SIZE: u32 = 4;
const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com/2";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_AGENT_LOG_FOLDER: &str = "./agent_logs";

/// Pub/sub connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// `host:port` or a full `redis://` URL
    pub addr: String,
    pub channel: String,
}

impl BusConfig {
    /// Connection URL for the redis client.
    #[must_use]
    pub fn url(&self) -> String {
        if self.addr.contains("://") {
            self.addr.clone()
        } else {
            format!("redis://{}", self.addr)
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { addr: DEFAULT_BUS_ADDR.to_owned(), channel: DEFAULT_TWEET_CHANNEL.to_owned() }
    }
}

/// Vector store location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub pool_size: u32,
}

impl StoreConfig {
    /// `<data_local_dir>/tweetvec/vectors.db`, or a relative path when no data dir exists.
    #[must_use]
    pub fn default_db_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("tweetvec"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vectors.db")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: Self::default_db_path(),
            table: DEFAULT_TABLE_NAME.to_owned(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Model cache directory; fastembed's default when `None`
    pub cache_dir: Option<PathBuf>,
}

/// Chat-completion endpoint used by the agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl LlmConfig {
    /// # Errors
    /// Returns `ConfigError::Missing` when `OPENAI_API_KEY` was not provided.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            model: DEFAULT_LLM_MODEL.to_owned(),
        }
    }
}

/// Social-media API credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub bearer_token: Option<String>,
    pub api_url: String,
}

impl CollectorConfig {
    /// # Errors
    /// Returns `ConfigError::Missing` when `TWITTER_BEARER_TOKEN` was not provided.
    pub fn require_bearer_token(&self) -> Result<&str, ConfigError> {
        self.bearer_token.as_deref().ok_or(ConfigError::Missing("TWITTER_BEARER_TOKEN"))
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { bearer_token: None, api_url: DEFAULT_TWITTER_API_URL.to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub log_folder: PathBuf,
    pub cringe_threshold: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_folder: PathBuf::from(DEFAULT_AGENT_LOG_FOLDER),
            cringe_threshold: DEFAULT_CRINGE_THRESHOLD,
        }
    }
}

/// Everything a tweetvec process needs, passed explicitly into each service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub bus: BusConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub collector: CollectorConfig,
    pub agents: AgentConfig,
}

impl AppConfig {
    /// Reads the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset. Unparseable numbers fall back to their default with a warning.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bus = BusConfig {
            addr: get("REDIS_EVENTS_PUBSUB_ADDR").unwrap_or(defaults.bus.addr),
            channel: get("REDIS_TWEET_TOPIC").unwrap_or(defaults.bus.channel),
        };

        let pool_size = parse_or_default(
            "TWEETVEC_DB_POOL_SIZE",
            get("TWEETVEC_DB_POOL_SIZE"),
            defaults.store.pool_size,
        );
        let store = StoreConfig {
            db_path: get("TWEETVEC_DB_PATH").map_or(defaults.store.db_path, PathBuf::from),
            table: get("TWEETVEC_TABLE_NAME").unwrap_or(defaults.store.table),
            pool_size: pool_size.max(1),
        };

        let embedding =
            EmbeddingConfig { cache_dir: get("TWEETVEC_EMBEDDING_CACHE_DIR").map(PathBuf::from) };

        let llm = LlmConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.llm.base_url),
            model: get("TWEETVEC_LLM_MODEL").unwrap_or(defaults.llm.model),
        };

        let collector = CollectorConfig {
            bearer_token: get("TWITTER_BEARER_TOKEN"),
            api_url: get("TWITTER_API_URL").unwrap_or(defaults.collector.api_url),
        };

        let threshold = parse_or_default(
            "CRINGE_THRESHOLD",
            get("CRINGE_THRESHOLD"),
            defaults.agents.cringe_threshold,
        );
        let agents = AgentConfig {
            log_folder: get("AGENT_LOG_FOLDER").map_or(defaults.agents.log_folder, PathBuf::from),
            cringe_threshold: sanitize_threshold(threshold),
        };

        Self { bus, store, embedding, llm, collector, agents }
    }
}

fn sanitize_threshold(value: f32) -> f32 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        value
    } else {
        tracing::warn!(value, default = DEFAULT_CRINGE_THRESHOLD, "CRINGE_THRESHOLD outside [0, 1]");
        DEFAULT_CRINGE_THRESHOLD
    }
}
