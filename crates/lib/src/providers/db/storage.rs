use crate::{errors::PromptError, types::SchemaMatch};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for the read side of the schema store.
///
/// Implementations must be safe to share between concurrent requests; each call
/// is assumed atomic.
#[async_trait]
pub trait SchemaStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Returns up to `limit` records ranked by descending cosine similarity to
    /// `query_vector`. An empty store yields an empty vector.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SchemaMatch>, PromptError>;
}

dyn_clone::clone_trait_object!(SchemaStore);
