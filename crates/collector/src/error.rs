//! Typed error enum for the collector crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    /// HTTP 429 from the API.
    #[error("rate limited (reset at {reset:?})")]
    RateLimited { reset: Option<i64> },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("request budget of {0} exhausted")]
    BudgetExhausted(usize),
    #[error("invalid handle {0:?}")]
    InvalidHandle(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize dataset: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CollectorError {
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
