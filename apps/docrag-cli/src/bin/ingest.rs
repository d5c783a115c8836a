use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use docrag_core::config::Settings;
use docrag_core::extract::PdftotextExtractor;
use docrag_core::util::sanitize_filename;
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
        eprintln!("Usage: docrag-ingest <pdf-file-or-directory>...");
        std::process::exit(1);
    }

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

    let mut files: Vec<PathBuf> = Vec::new();
    for arg in &args {
        let path = PathBuf::from(arg);
        if path.is_dir() {
            for entry in WalkDir::new(&path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let is_pdf = entry
                    .path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false);
                if is_pdf {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        println!("No PDF files to ingest.");
        return Ok(());
    }

    println!("docrag ingest\n=============");
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );

    let mut total_chunks = 0usize;
    let mut ingested_files = 0usize;
    for file in &files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.pdf");
        let source_id = sanitize_filename(name);
        pb.set_message(source_id.clone());
        match engine.ingest(file, &source_id).await {
            Ok(chunks) => {
                total_chunks += chunks.len();
                ingested_files += 1;
            }
            Err(e) => pb.println(format!("skipping {}: {}", file.display(), e)),
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!("Ingested {} chunks from {} files", total_chunks, ingested_files);
    println!(
        "Total indexed chunks: {}",
        engine.stats().await?.document_chunk_count
    );
    Ok(())
}
