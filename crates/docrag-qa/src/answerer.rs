//! Single-pass question answering over the indexed collection.
//!
//! One retrieval, one generation call, no conversational state between
//! calls. Chat history, if any, is the caller's concern.

use std::sync::Arc;

use docrag_core::traits::Generator;
use docrag_core::types::{QueryResult, SourceRef};
use docrag_core::{Error, Result};
use docrag_index::VectorIndex;

use crate::prompt::build_prompt;

/// Characters of chunk text shown in a citation.
pub const SOURCE_PREVIEW_CHARS: usize = 200;

/// Display text for a cited chunk: the first 200 characters with a literal
/// `"..."` always appended, even when the chunk is shorter. Fixed display
/// contract, intentionally not conditional.
pub fn source_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(SOURCE_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

pub struct Answerer {
    index: Arc<VectorIndex>,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl Answerer {
    pub fn new(index: Arc<VectorIndex>, generator: Arc<dyn Generator>, top_k: usize) -> Self {
        Self {
            index,
            generator,
            top_k,
        }
    }

    /// Answer `question` from indexed content only.
    ///
    /// Fails with [`Error::Validation`] on a blank question, with
    /// [`Error::NoDocuments`] when the collection is empty (checked before
    /// any generation cost is spent), and with [`Error::Generation`] on
    /// provider failure. Nothing is retried here.
    pub async fn answer(&self, question: &str) -> Result<QueryResult> {
        if question.trim().is_empty() {
            return Err(Error::Validation("question must not be empty".to_string()));
        }
        if self.index.count().await? == 0 {
            return Err(Error::NoDocuments);
        }

        let retrieved = self.index.search(question, self.top_k).await?;
        tracing::debug!(hits = retrieved.len(), top_k = self.top_k, "retrieved context");

        let prompt = build_prompt(question, &retrieved);
        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let sources = retrieved
            .iter()
            .map(|r| SourceRef {
                text: source_preview(&r.chunk.text),
                source_id: r.chunk.source_id.clone(),
                page: r.chunk.page,
                distance: r.distance,
            })
            .collect();

        Ok(QueryResult {
            answer,
            sources,
            question: question.to_string(),
        })
    }
}
