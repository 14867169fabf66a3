//! Typed error enum for the service layer.
//!
//! Unifies bus, embedding, storage and LLM failures so the run loops can tell a dropped
//! message from a failure that must stop the process.

use std::path::PathBuf;

use thiserror::Error;
use tweetvec_bus::BusError;
use tweetvec_core::{DatasetError, InvalidTweet};
use tweetvec_embeddings::EmbeddingError;
use tweetvec_llm::LlmError;
use tweetvec_storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Payload failed to decode or validate.
    #[error("invalid tweet: {0}")]
    InvalidTweet(#[from] InvalidTweet),

    #[error("dataset: {0}")]
    Dataset(#[from] DatasetError),

    #[error("embedding: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("bus: {0}")]
    Bus(#[from] BusError),

    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller provided invalid input (empty profile set, bad table name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A blocking task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Whether a run loop must stop on this error.
    ///
    /// Malformed input, a failed embedding for one message and a failed LLM call for one tweet
    /// only drop that message.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidTweet(_) | Self::Embedding(_) | Self::Llm(_) => false,
            Self::Bus(e) => !e.is_recoverable(),
            _ => true,
        }
    }
}
