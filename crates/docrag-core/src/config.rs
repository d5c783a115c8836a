//! Typed configuration loader and path helpers.
//!
//! Uses Figment to merge defaults + `docrag.toml` + `DOCRAG_*` env vars into
//! a [`Settings`] struct. Provides helpers to expand `~` and `${VAR}` and to
//! resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Immutable application settings, read once at process start and passed by
/// reference into the pipeline. Changing a knob never retroactively affects
/// chunks that are already indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters copied from the end of a chunk into the start of the next.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Upload size ceiling enforced before extraction.
    pub max_upload_bytes: u64,
    /// On-disk location of the persisted vector collection.
    pub db_dir: String,
    /// Where ingested PDFs are retained for listing.
    pub upload_dir: String,
    /// Collection (table) name inside the store.
    pub table: String,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub model: String,
    pub dim: usize,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            max_upload_bytes: 10 * 1024 * 1024,
            db_dir: "./data/index".to_string(),
            upload_dir: "./data/uploads".to_string(),
            table: "documents".to_string(),
            embedding: EmbeddingSettings {
                base_url: "https://api.openai.com".to_string(),
                model: "text-embedding-3-small".to_string(),
                dim: 1536,
                api_key: None,
            },
            generation: GenerationSettings {
                base_url: "https://api.openai.com".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: None,
            },
        }
    }
}

impl Settings {
    /// Merge `docrag.toml` and `DOCRAG_*` environment variables over the
    /// defaults. Nested keys use `__` in the environment, e.g.
    /// `DOCRAG_EMBEDDING__API_KEY`.
    pub fn load() -> anyhow::Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("docrag.toml"))
            .merge(Env::prefixed("DOCRAG_").split("__"))
            .extract()
            .map_err(|e| anyhow::anyhow!("failed to load settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be positive");
        }
        if self.chunk_overlap >= self.chunk_size {
            anyhow::bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        if self.embedding.dim == 0 {
            anyhow::bail!("embedding.dim must be positive");
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        expand_path(&self.db_dir)
    }

    pub fn upload_path(&self) -> PathBuf {
        expand_path(&self.upload_dir)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. Absolute paths are returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
