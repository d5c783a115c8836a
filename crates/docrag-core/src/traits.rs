use std::path::Path;

use async_trait::async_trait;

use crate::types::PageText;

/// Turns a source document into an ordered sequence of page texts.
pub trait PageExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<PageText>>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// Compute embeddings for a batch of input texts. One vector per input,
    /// in input order, each of length `dim()`.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce answer text for a fully assembled prompt.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
