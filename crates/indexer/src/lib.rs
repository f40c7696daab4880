//! # sqlrag-indexer
//!
//! Runs one schema indexing pass and exits. Meant to be triggered by a scheduler
//! whenever the database schema changes.

use anyhow::Result;
use clap::Parser;
use sqlrag::{providers::ai::EmbeddingProvider, IndexReport};
use sqlrag_server::{
    config::{get_config, AppConfig},
    state::{build_embedder, build_indexer},
};
use std::sync::Arc;
use tracing::info;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Index a database schema for text-to-SQL retrieval", long_about = None)]
pub struct Cli {
    /// Path to the configuration file. Defaults to the server's `config.yml` lookup.
    #[arg(long, env = "SQLRAG_CONFIG")]
    pub config: Option<String>,
}

/// Runs one indexing pass with the configured embedder.
pub async fn run(config: &AppConfig) -> Result<IndexReport> {
    let embedder = build_embedder(config)?;
    run_with(config, embedder).await
}

/// Runs one indexing pass with an explicit embedder.
pub async fn run_with(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<IndexReport> {
    let indexer = build_indexer(config, embedder)?;
    let report = indexer.reindex_all().await?;
    info!("Indexing finished: {} tables processed.", report.tables_processed);
    Ok(report)
}

/// Parses arguments, loads configuration and runs one pass.
pub async fn start(cli: Cli) -> Result<IndexReport> {
    let config = get_config(cli.config.as_deref())?;
    run(&config).await
}
