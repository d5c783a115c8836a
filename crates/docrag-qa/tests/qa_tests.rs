use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use docrag_core::config::Settings;
use docrag_core::traits::{Generator, PageExtractor};
use docrag_core::types::PageText;
use docrag_core::Error;
use docrag_embed::HashEmbedder;
use docrag_index::VectorIndex;
use docrag_qa::answerer::source_preview;
use docrag_qa::QaEngine;

const DIM: usize = 32;

struct CannedGenerator {
    reply: String,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl CannedGenerator {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().expect("lock").clone()
    }
}

#[async_trait::async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().expect("lock") = Some(prompt.to_string());
        Ok(self.reply.clone())
    }
}

struct FixedPagesExtractor {
    pages: Vec<PageText>,
}

impl PageExtractor for FixedPagesExtractor {
    fn extract_pages(&self, _path: &Path) -> anyhow::Result<Vec<PageText>> {
        Ok(self.pages.clone())
    }
}

struct FailingExtractor;

impl PageExtractor for FailingExtractor {
    fn extract_pages(&self, _path: &Path) -> anyhow::Result<Vec<PageText>> {
        anyhow::bail!("file is encrypted")
    }
}

fn test_settings(tmp: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.embedding.dim = DIM;
    settings.upload_dir = tmp.path().join("uploads").to_string_lossy().to_string();
    settings
}

fn page(page: usize, text: &str) -> PageText {
    PageText {
        page,
        text: text.to_string(),
    }
}

/// Writes a small stand-in upload so ingest has a real file to size-check.
fn write_upload(tmp: &TempDir, name: &str) -> std::path::PathBuf {
    let path = tmp.path().join(name);
    std::fs::write(&path, b"%PDF-1.4 stand-in").expect("write upload");
    path
}

async fn engine_with(
    tmp: &TempDir,
    settings: &Settings,
    extractor: Arc<dyn PageExtractor>,
    generator: Arc<CannedGenerator>,
) -> QaEngine {
    let index = VectorIndex::open(
        &tmp.path().join("index"),
        &settings.table,
        Arc::new(HashEmbedder::new(DIM)),
    )
    .await
    .expect("open index");
    QaEngine::new(settings, extractor, Arc::new(index), generator)
}

#[tokio::test]
async fn ask_on_empty_index_skips_generation() {
    let tmp = TempDir::new().expect("tmp");
    let settings = test_settings(&tmp);
    let generator = CannedGenerator::new("never used");
    let extractor = Arc::new(FixedPagesExtractor { pages: vec![] });
    let engine = engine_with(&tmp, &settings, extractor, Arc::clone(&generator)).await;

    let err = engine.ask("What is X?").await.expect_err("must fail");
    assert!(matches!(err, Error::NoDocuments));
    assert_eq!(generator.calls(), 0, "no generation cost on the empty state");
}

#[tokio::test]
async fn blank_question_is_rejected_before_anything_else() {
    let tmp = TempDir::new().expect("tmp");
    let settings = test_settings(&tmp);
    let generator = CannedGenerator::new("never used");
    let extractor = Arc::new(FixedPagesExtractor { pages: vec![] });
    let engine = engine_with(&tmp, &settings, extractor, Arc::clone(&generator)).await;

    let err = engine.ask("   ").await.expect_err("must fail");
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn ingest_then_ask_returns_answer_and_truncated_source() {
    let tmp = TempDir::new().expect("tmp");
    let settings = test_settings(&tmp);
    let generator = CannedGenerator::new("X is a protocol.");
    let extractor = Arc::new(FixedPagesExtractor {
        pages: vec![page(0, "X is a protocol for Y.")],
    });
    let engine = engine_with(&tmp, &settings, extractor, Arc::clone(&generator)).await;

    let upload = write_upload(&tmp, "doc.pdf");
    let chunks = engine.ingest(&upload, "doc.pdf").await.expect("ingest");
    assert_eq!(chunks.len(), 1);
    assert_eq!(engine.stats().await.expect("stats").document_chunk_count, 1);
    assert_eq!(
        engine.uploaded_files().expect("uploads"),
        vec!["doc.pdf".to_string()],
        "the ingested file is retained for listing"
    );

    let result = engine.ask("What is X?").await.expect("ask");
    assert_eq!(result.answer, "X is a protocol.");
    assert_eq!(result.question, "What is X?");
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].source_id, "doc.pdf");
    assert_eq!(result.sources[0].page, 0);
    assert_eq!(result.sources[0].text, "X is a protocol for Y....");

    let prompt = generator.last_prompt().expect("generator saw a prompt");
    assert!(prompt.contains("X is a protocol for Y."));
    assert!(prompt.contains("Question: What is X?"));
    assert!(prompt.contains("I cannot find this information in the provided documents."));
}

#[tokio::test]
async fn ingest_grows_count_by_returned_chunks() {
    let tmp = TempDir::new().expect("tmp");
    let settings = test_settings(&tmp);
    let generator = CannedGenerator::new("ok");
    let long_page = "lorem ipsum dolor sit amet consectetur ".repeat(80);
    let extractor = Arc::new(FixedPagesExtractor {
        pages: vec![page(0, &long_page), page(1, &long_page)],
    });
    let engine = engine_with(&tmp, &settings, extractor, generator).await;

    let upload = write_upload(&tmp, "long.pdf");
    let chunks = engine.ingest(&upload, "long.pdf").await.expect("ingest");
    assert!(chunks.len() > 2, "a long document splits into several chunks");
    assert_eq!(
        engine.stats().await.expect("stats").document_chunk_count,
        chunks.len()
    );
}

#[tokio::test]
async fn non_pdf_and_oversized_uploads_are_rejected_untouched() {
    let tmp = TempDir::new().expect("tmp");
    let mut settings = test_settings(&tmp);
    settings.max_upload_bytes = 8;
    let generator = CannedGenerator::new("ok");
    let extractor = Arc::new(FixedPagesExtractor {
        pages: vec![page(0, "content")],
    });
    let engine = engine_with(&tmp, &settings, extractor, generator).await;

    let upload = write_upload(&tmp, "notes.txt");
    let err = engine.ingest(&upload, "notes.txt").await.expect_err("not a pdf");
    assert!(matches!(err, Error::Validation(_)));

    let upload = write_upload(&tmp, "big.pdf");
    let err = engine.ingest(&upload, "big.pdf").await.expect_err("too large");
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(engine.stats().await.expect("stats").document_chunk_count, 0);
    assert!(
        engine.uploaded_files().expect("uploads").is_empty(),
        "rejected uploads are not retained"
    );
}

#[tokio::test]
async fn failed_extraction_leaves_index_unchanged() {
    let tmp = TempDir::new().expect("tmp");
    let settings = test_settings(&tmp);
    let generator = CannedGenerator::new("ok");
    let engine = engine_with(&tmp, &settings, Arc::new(FailingExtractor), generator).await;

    let upload = write_upload(&tmp, "broken.pdf");
    let err = engine.ingest(&upload, "broken.pdf").await.expect_err("must fail");
    assert!(matches!(err, Error::Extraction { .. }));
    assert_eq!(engine.stats().await.expect("stats").document_chunk_count, 0);
}

#[tokio::test]
async fn clear_all_resets_stats_even_right_after_ingest() {
    let tmp = TempDir::new().expect("tmp");
    let settings = test_settings(&tmp);
    let generator = CannedGenerator::new("ok");
    let long_page = "alpha beta gamma delta ".repeat(300);
    let extractor = Arc::new(FixedPagesExtractor {
        pages: vec![page(0, &long_page)],
    });
    let engine = engine_with(&tmp, &settings, extractor, generator).await;

    let upload = write_upload(&tmp, "doc.pdf");
    let chunks = engine.ingest(&upload, "doc.pdf").await.expect("ingest");
    assert!(!chunks.is_empty());

    engine.clear_all().await.expect("clear");
    assert_eq!(engine.stats().await.expect("stats").document_chunk_count, 0);
}

#[test]
fn citation_preview_is_unconditionally_truncated() {
    let exactly_fifty = "B".repeat(50);
    let preview = source_preview(&exactly_fifty);
    assert_eq!(preview.chars().count(), 53);
    assert!(preview.ends_with("..."));

    let long = "C".repeat(300);
    let preview = source_preview(&long);
    assert_eq!(preview.chars().count(), 203);
    assert!(preview.starts_with(&"C".repeat(200)));
}
