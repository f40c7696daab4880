//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds all shared resources, such
//! as the configuration, the database provider and the translation and indexing
//! services, making them accessible to all request handlers.

use crate::config::{AppConfig, SecretBackend};
use sqlrag::{
    providers::{
        ai::{AiProvider, EmbeddingProvider, HttpEmbeddingProvider},
        db::sqlite::SqliteProvider,
        factory::create_ai_provider,
        secrets::{EnvSecretStore, FileSecretStore, SecretStore, StaticSecretStore},
    },
    PromptBuilder, QueryTranslator, RetrievalPlanner, SchemaIndexer,
};
use std::sync::Arc;
use tracing::info;

/// Secret id used when the database path is configured directly.
const STATIC_SECRET_ID: &str = "default";

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The indexed database, which also holds the schema store.
    pub sqlite_provider: Arc<SqliteProvider>,
    pub translator: Arc<QueryTranslator>,
    pub indexer: Arc<SchemaIndexer>,
}

/// Selects the secret store and secret id from the configuration.
pub fn build_secret_store(config: &AppConfig) -> anyhow::Result<(Arc<dyn SecretStore>, String)> {
    let Some(secrets) = &config.secrets else {
        return Ok((
            Arc::new(StaticSecretStore::new(config.db_url.clone())),
            STATIC_SECRET_ID.to_string(),
        ));
    };
    let store: Arc<dyn SecretStore> = match secrets.backend {
        SecretBackend::Env => Arc::new(EnvSecretStore),
        SecretBackend::File => {
            let dir = secrets
                .dir
                .clone()
                .filter(|d| !d.is_empty())
                .ok_or_else(|| anyhow::anyhow!("secrets.dir is required for the file backend"))?;
            Arc::new(FileSecretStore::new(dir))
        }
    };
    info!(backend = ?secrets.backend, "Database location will be resolved from the secret store.");
    Ok((store, secrets.secret_name.clone()))
}

/// Builds the schema indexer with the configured secret store and embedder.
pub fn build_indexer(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> anyhow::Result<SchemaIndexer> {
    let (secrets, secret_id) = build_secret_store(config)?;
    Ok(SchemaIndexer::new(secrets, secret_id, embedder))
}

/// Builds the embedding client from the configuration.
pub fn build_embedder(config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Ok(Arc::new(HttpEmbeddingProvider::from_config(&config.embedding)?))
}

/// Builds the shared application state from the configuration.
///
/// This instantiates the generation and embedding clients, resolves the database
/// location and ensures the schema store table exists.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = create_ai_provider("generation", &config.generation)?;
    let embedder = build_embedder(&config)?;
    build_app_state_with(config, ai_provider, embedder).await
}

/// Builds the application state around already constructed providers.
pub async fn build_app_state_with(
    config: AppConfig,
    ai_provider: Box<dyn AiProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> anyhow::Result<AppState> {
    let indexer = build_indexer(&config, embedder.clone())?;

    let sqlite_provider = indexer.open_database().await?;
    info!("Initialized database provider (SQLite).");
    // Ensure the schema store table exists so searches work before the first index run.
    sqlite_provider.initialize_schema().await?;

    let planner = RetrievalPlanner::new(embedder, Arc::new(sqlite_provider.clone()));
    let translator = QueryTranslator::new(
        planner,
        PromptBuilder::new(config.translation.dialect.clone()),
        ai_provider,
    )
    .with_relationship_notes(config.translation.relationship_notes.clone())
    .with_top_k(config.translation.top_k);

    Ok(AppState {
        config: Arc::new(config),
        sqlite_provider: Arc::new(sqlite_provider),
        translator: Arc::new(translator),
        indexer: Arc::new(indexer),
    })
}
