//! # Schema Indexer
//!
//! Converts the live database catalog into one embedding record per table.
//!
//! A run is all-or-nothing: every upsert happens on a single connection inside one
//! transaction, and any failure rolls the whole run back and propagates. Upserts are
//! keyed by table name, so re-running is idempotent.

use crate::{
    description::describe_table,
    errors::PromptError,
    providers::{
        ai::EmbeddingProvider,
        db::sqlite::SqliteProvider,
        secrets::SecretStore,
    },
    types::{IndexReport, SchemaEmbeddingRecord, TableDescriptor},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};
use turso::Connection;

/// Drives catalog read → description → embedding → upsert for every table.
#[derive(Debug, Clone)]
pub struct SchemaIndexer {
    secrets: Arc<dyn SecretStore>,
    secret_id: String,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SchemaIndexer {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        secret_id: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            secrets,
            secret_id: secret_id.into(),
            embedder,
        }
    }

    /// Resolves the database credentials and opens the database they point at.
    pub async fn open_database(&self) -> Result<SqliteProvider, PromptError> {
        let secret = self
            .secrets
            .get_database_secret(&self.secret_id)
            .await?;
        SqliteProvider::new(&secret.db_url).await
    }

    /// Resolves the database credentials, opens the database and indexes it.
    pub async fn reindex_all(&self) -> Result<IndexReport, PromptError> {
        info!("Starting schema indexing run.");
        let provider = self.open_database().await?;
        self.reindex_with(&provider).await
    }

    /// Indexes every user table of an already opened database.
    pub async fn reindex_with(&self, provider: &SqliteProvider) -> Result<IndexReport, PromptError> {
        let conn = provider.connect()?;

        // Creating the store table is idempotent and committed on its own.
        SqliteProvider::create_store_tables(&conn).await?;

        conn.execute("BEGIN TRANSACTION", ()).await?;
        match self.index_tables(&conn).await {
            Ok(report) => {
                conn.execute("COMMIT", ()).await?;
                info!(
                    "Successfully indexed {} tables.",
                    report.tables_processed
                );
                Ok(report)
            }
            Err(e) => {
                error!("Indexing run failed, rolling back: {e}");
                if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                    error!("Rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn index_tables(&self, conn: &Connection) -> Result<IndexReport, PromptError> {
        let tables = SqliteProvider::read_table_descriptors(conn).await?;
        info!("Found {} tables to process.", tables.len());

        let mut tables_processed = 0;
        for table in &tables {
            self.index_table(conn, table).await?;
            tables_processed += 1;
        }
        Ok(IndexReport { tables_processed })
    }

    async fn index_table(
        &self,
        conn: &Connection,
        table: &TableDescriptor,
    ) -> Result<(), PromptError> {
        info!(table_name = %table.table_name, "Processing table.");
        let description = describe_table(table);
        debug!(description = %description, "Synthesized table description.");

        let vector = self.embedder.embed(&description).await?;
        debug!(
            model = %self.embedder.model_name(),
            dimension = vector.len(),
            "Generated embedding."
        );

        let record = SchemaEmbeddingRecord {
            table_name: table.table_name.clone(),
            description,
            vector,
            created_at: Utc::now(),
        };
        SqliteProvider::upsert_record(conn, &record).await
    }
}
