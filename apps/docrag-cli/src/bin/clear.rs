use std::env;

use docrag_core::config::Settings;
use docrag_embed::default_embedder;
use docrag_index::VectorIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if !args.iter().any(|a| a == "--yes") {
        eprintln!("This removes every indexed chunk irreversibly.");
        eprintln!("Usage: docrag-clear --yes");
        std::process::exit(1);
    }

    let settings = Settings::load()?;
    let embedder = default_embedder(&settings);
    let index = VectorIndex::open(&settings.db_path(), &settings.table, embedder).await?;

    let before = index.count().await?;
    index.clear().await?;
    println!("Removed {} chunks; the collection is empty and ready for new ingests.", before);
    Ok(())
}
