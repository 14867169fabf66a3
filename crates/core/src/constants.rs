//! Shared constants for tweetvec.

/// Embedding vector dimension (BAAI/bge-small-en-v1.5: 384d).
pub const EMBEDDING_DIMENSION: usize = 384;

/// Human-readable name of the default embedding model.
pub const EMBEDDING_MODEL_NAME: &str = "BAAI/bge-small-en-v1.5";

/// Pub/sub channel carrying tweet JSON.
pub const DEFAULT_TWEET_CHANNEL: &str = "tweets";

/// Vector-store table written by the embedding service.
pub const DEFAULT_TABLE_NAME: &str = "tweets";

/// Bus address when `REDIS_EVENTS_PUBSUB_ADDR` is unset.
pub const DEFAULT_BUS_ADDR: &str = "localhost:6379";

/// Language recorded for tweets that don't carry one.
pub const DEFAULT_LANG: &str = "en";

/// Maximum number of rows returned by any read query.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Author used for tweets injected by the simulation driver.
pub const SIMULATOR_AUTHOR: &str = "simulator";

/// Score above which a tweet counts as cringe.
pub const DEFAULT_CRINGE_THRESHOLD: f32 = 0.7;
