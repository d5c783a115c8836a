//! The boundary the request layer and the CLI call into.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docrag_core::chunker::TextSplitter;
use docrag_core::config::{expand_path, Settings};
use docrag_core::traits::{Generator, PageExtractor};
use docrag_core::types::{Chunk, QueryResult, Stats};
use docrag_core::util::{format_file_size, is_pdf_filename};
use docrag_core::{Error, Result};
use docrag_index::VectorIndex;

use crate::answerer::Answerer;

pub struct QaEngine {
    extractor: Arc<dyn PageExtractor>,
    splitter: TextSplitter,
    index: Arc<VectorIndex>,
    answerer: Answerer,
    max_upload_bytes: u64,
    upload_dir: PathBuf,
}

impl QaEngine {
    pub fn new(
        settings: &Settings,
        extractor: Arc<dyn PageExtractor>,
        index: Arc<VectorIndex>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            extractor,
            splitter: TextSplitter::from_settings(settings),
            answerer: Answerer::new(Arc::clone(&index), generator, settings.top_k),
            index,
            max_upload_bytes: settings.max_upload_bytes,
            upload_dir: expand_path(&settings.upload_dir),
        }
    }

    /// Ingest one PDF: validate, extract pages, chunk, embed and store.
    ///
    /// Returns the stored chunks; after a successful return the collection
    /// has grown by exactly that many entries. A rejected or failed ingest
    /// leaves the index unchanged. Validation happens before any index
    /// interaction, extraction failures propagate without retry.
    pub async fn ingest(&self, path: &Path, source_id: &str) -> Result<Vec<Chunk>> {
        if !is_pdf_filename(source_id) {
            return Err(Error::Validation(format!(
                "'{source_id}' is not a PDF filename"
            )));
        }
        let size = std::fs::metadata(path)
            .map_err(|e| Error::Validation(format!("cannot read '{}': {}", path.display(), e)))?
            .len();
        if size > self.max_upload_bytes {
            return Err(Error::Validation(format!(
                "file is {}, the limit is {}",
                format_file_size(size),
                format_file_size(self.max_upload_bytes)
            )));
        }

        // Retain the upload under its source id so it can be listed later.
        let retained = self.upload_dir.join(source_id);
        std::fs::create_dir_all(&self.upload_dir).map_err(|e| Error::Store {
            op: "retain upload",
            reason: e.to_string(),
        })?;
        std::fs::copy(path, &retained).map_err(|e| Error::Store {
            op: "retain upload",
            reason: e.to_string(),
        })?;

        let pages = self
            .extractor
            .extract_pages(&retained)
            .map_err(|e| Error::Extraction {
                source_id: source_id.to_string(),
                reason: e.to_string(),
            })?;
        let chunks = self.splitter.split(source_id, &pages);
        if !chunks.is_empty() {
            self.index.insert(&chunks).await?;
        }
        tracing::info!(source_id, chunks = chunks.len(), "ingested document");
        Ok(chunks)
    }

    pub async fn ask(&self, question: &str) -> Result<QueryResult> {
        self.answerer.answer(question).await
    }

    pub async fn stats(&self) -> Result<Stats> {
        Ok(Stats {
            document_chunk_count: self.index.count().await?,
        })
    }

    /// Names of retained uploads, sorted. An absent upload directory simply
    /// means nothing was ingested yet.
    pub fn uploaded_files(&self) -> Result<Vec<String>> {
        if !self.upload_dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.upload_dir).map_err(|e| Error::Store {
            op: "list uploads",
            reason: e.to_string(),
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Store {
                op: "list uploads",
                reason: e.to_string(),
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            if is_pdf_filename(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.index.clear().await
    }
}
