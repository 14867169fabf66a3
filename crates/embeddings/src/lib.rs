//! Embedding generation for tweet vectors
//!
//! Wraps a local fastembed model (BAAI/bge-small-en-v1.5, 384 dimensions). The model call is
//! blocking; async callers run it on `tokio::task::spawn_blocking`.

pub mod error;

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tweetvec_core::{EMBEDDING_DIMENSION, EMBEDDING_MODEL_NAME};

pub use error::EmbeddingError;

/// Texts per forward pass for batch embedding.
const BATCH_SIZE: usize = 64;

/// Anything that turns text into fixed-length vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    ///
    /// # Errors
    /// Returns `EmbeddingError` if the model call fails or yields a wrong-sized vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds many texts; output order matches input order.
    ///
    /// # Errors
    /// Fails as a whole if any text can't be embedded.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

pub struct EmbeddingService {
    model: Mutex<TextEmbedding>,
}

impl EmbeddingService {
    /// Loads the model, downloading it into the fastembed cache on first use.
    ///
    /// # Errors
    /// Returns `EmbeddingError::ModelInit` if the model can't be fetched or loaded.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let mut options =
            InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let model =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;
        tracing::info!(model = EMBEDDING_MODEL_NAME, dimension = EMBEDDING_DIMENSION, "Embedding model loaded");
        Ok(Self { model: Mutex::new(model) })
    }
}

impl EmbeddingProvider for EmbeddingService {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_owned()])?;
        vectors.pop().ok_or(EmbeddingError::EmptyResult)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = {
            let mut model = self.model.lock().map_err(|_| EmbeddingError::LockPoisoned)?;
            model
                .embed(texts, Some(BATCH_SIZE))
                .map_err(|e| EmbeddingError::Generation(e.to_string()))?
        };
        check_vectors(vectors, texts.len(), EMBEDDING_DIMENSION)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn model_name(&self) -> &str {
        EMBEDDING_MODEL_NAME
    }
}

/// Verifies a model response: one vector per input, all of the expected length.
///
/// # Errors
/// Returns `CountMismatch`, `EmptyResult` or `DimensionMismatch` on a malformed batch.
pub fn check_vectors(
    vectors: Vec<Vec<f32>>,
    expected_count: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if vectors.is_empty() && expected_count > 0 {
        return Err(EmbeddingError::EmptyResult);
    }
    if vectors.len() != expected_count {
        return Err(EmbeddingError::CountMismatch { expected: expected_count, actual: vectors.len() });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(EmbeddingError::DimensionMismatch { expected: dimension, actual: bad.len() });
    }
    Ok(vectors)
}
