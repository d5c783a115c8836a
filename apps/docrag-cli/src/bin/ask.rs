use std::env;
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

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: docrag-ask \"<question>\"");
        std::process::exit(1);
    }
    let question = args.join(" ");

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

    let result = engine.ask(&question).await?;

    println!("Q: {}\n", result.question);
    println!("{}\n", result.answer);
    if !result.sources.is_empty() {
        println!("Sources:");
        for (i, s) in result.sources.iter().enumerate() {
            println!(
                "  {}. {} (page {}, distance {:.4})",
                i + 1,
                s.source_id,
                s.page,
                s.distance
            );
            println!("     {}", s.text);
        }
    }
    Ok(())
}
