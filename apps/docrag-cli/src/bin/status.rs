use std::sync::Arc;

use docrag_core::config::Settings;
use docrag_core::extract::PdftotextExtractor;
use docrag_embed::default_embedder;
use docrag_index::VectorIndex;
use docrag_llm::RemoteGenerator;
use docrag_qa::QaEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::load()?;
    let embedder = default_embedder(&settings);
    let index = VectorIndex::open(&settings.db_path(), &settings.table, embedder).await?;
    let generator = Arc::new(RemoteGenerator::from_settings(&settings));
    let engine = QaEngine::new(
        &settings,
        Arc::new(PdftotextExtractor),
        Arc::new(index),
        generator,
    );

    let stats = engine.stats().await?;
    let files = engine.uploaded_files()?;

    println!("docrag status\n=============");
    println!("Store: {}", settings.db_path().display());
    println!("Collection: {}", settings.table);
    println!("Indexed chunks: {}", stats.document_chunk_count);
    println!("Uploaded files: {}", files.len());
    for name in files {
        println!("  - {name}");
    }
    Ok(())
}
