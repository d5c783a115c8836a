//! Embedding Capability implementations.
//!
//! [`RemoteEmbedder`] talks to any OpenAI-compatible `/v1/embeddings`
//! endpoint. [`HashEmbedder`] produces deterministic L2-normalized vectors
//! without a network call and backs tests and offline runs; select it with
//! `DOCRAG_USE_HASH_EMBEDDINGS=1`.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docrag_core::config::Settings;
use docrag_core::traits::Embedder;

pub struct RemoteEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dim: usize,
    api_key: Option<String>,
}

impl RemoteEmbedder {
    pub fn new(base_url: &str, model: &str, dim: usize, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
            dim,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let req = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };
        let mut call = self.client.post(embeddings_endpoint(&self.base_url)).json(&req);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }
        let resp = call
            .send()
            .await?
            .error_for_status()?
            .json::<EmbeddingResponse>()
            .await?;
        if resp.data.len() != texts.len() {
            return Err(anyhow!(
                "embedding response has {} vectors for {} inputs",
                resp.data.len(),
                texts.len()
            ));
        }
        Ok(resp.data.into_iter().map(|d| d.embedding).collect())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Build the `/v1/embeddings` URL without doubling a version segment the
/// caller already supplied.
fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/embeddings") {
        return normalized;
    }
    if has_version_suffix(&normalized) {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}

/// Deterministic embedder: hashes whitespace tokens into buckets, then
/// L2-normalizes. No fidelity to any real model, but stable across runs.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Build the embedder selected by configuration.
/// `DOCRAG_USE_HASH_EMBEDDINGS=1` switches to the hash embedder.
pub fn default_embedder(settings: &Settings) -> Arc<dyn Embedder> {
    let use_hash = std::env::var("DOCRAG_USE_HASH_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_hash {
        tracing::info!(dim = settings.embedding.dim, "using deterministic hash embeddings");
        return Arc::new(HashEmbedder::new(settings.embedding.dim));
    }
    Arc::new(RemoteEmbedder::new(
        &settings.embedding.base_url,
        &settings.embedding.model,
        settings.embedding.dim,
        settings.embedding.api_key.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::embeddings_endpoint;

    #[test]
    fn endpoint_from_host_base_uses_v1_embeddings() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_from_v1_base_appends_embeddings_once() {
        assert_eq!(
            embeddings_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_preserves_explicit_embeddings_url() {
        assert_eq!(
            embeddings_endpoint("https://api.example.com/v1/embeddings"),
            "https://api.example.com/v1/embeddings"
        );
    }
}
