//! # Retrieval Planner
//!
//! Embeds a question and asks the schema store for the most similar tables.

use crate::{
    errors::PromptError,
    providers::{ai::EmbeddingProvider, db::storage::SchemaStore},
    types::SchemaMatch,
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RetrievalPlanner {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn SchemaStore>,
}

impl RetrievalPlanner {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn SchemaStore>) -> Self {
        Self { embedder, store }
    }

    /// Returns at most `k` matches, best first. An empty store yields an empty list.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<SchemaMatch>, PromptError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(question).await?;
        let mut matches = self.store.search(&query_vector, k).await?;

        // Best first, at most k.
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(k);

        info!(
            "Retrieved {} tables from {} for the question.",
            matches.len(),
            self.store.name()
        );
        for m in &matches {
            debug!(table_name = %m.record.table_name, similarity = m.similarity, "Schema match.");
        }
        Ok(matches)
    }
}
