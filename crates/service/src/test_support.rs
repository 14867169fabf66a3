//! Shared fixtures for service tests.

#![allow(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;

use tempfile::TempDir;
use tweetvec_embeddings::{EmbeddingError, EmbeddingProvider};
use tweetvec_storage::{Storage, TableName};

pub(crate) const TEST_DIM: usize = 4;

/// Deterministic bag-of-bytes embedder. Texts containing `FAIL` can't be embedded.
pub(crate) struct FakeEmbedder;

impl FakeEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; TEST_DIM];
        for (i, b) in text.bytes().enumerate() {
            if let Some(slot) = v.get_mut(i % TEST_DIM) {
                *slot += f32::from(b) / 255.0;
            }
        }
        v
    }
}

impl EmbeddingProvider for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.contains("FAIL") {
            return Err(EmbeddingError::Generation("refused".to_owned()));
        }
        Ok(Self::vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        TEST_DIM
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

pub(crate) fn embedder() -> Arc<dyn EmbeddingProvider> {
    Arc::new(FakeEmbedder)
}

pub(crate) fn storage() -> (Arc<Storage>, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(&dir.path().join("vectors.db"), 2).unwrap();
    (Arc::new(storage), dir)
}

pub(crate) fn table(name: &str) -> TableName {
    TableName::new(name).unwrap()
}
