//! # Core Data Model
//!
//! Types shared by the indexer, the retrieval planner and the translation service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One column as read from the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// The declared type, upper-cased (e.g. `INTEGER`, `TEXT`).
    pub data_type: String,
    pub not_null: bool,
}

/// An immutable snapshot of one table's structure from a single catalog read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    /// Columns in ordinal position order.
    pub columns: Vec<ColumnDescriptor>,
}

/// The indexed form of a table: its synthesized description and the embedding of it.
///
/// The schema store keeps at most one record per `table_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEmbeddingRecord {
    pub table_name: String,
    pub description: String,
    pub vector: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A record returned by a similarity search, with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMatch {
    pub record: SchemaEmbeddingRecord,
    pub similarity: f64,
}

/// Outcome of a full indexing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub tables_processed: usize,
}

/// A natural-language question to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    #[serde(alias = "query")]
    pub question: String,
}

impl TranslationRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// The caller-facing result of a translation. The SQL is not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub sql: String,
    pub explanation: String,
}

/// The assembled prompt sent to the generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// A reusable configuration for a generation provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The type of provider (`gemini` or `local`).
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Configuration for the embedding model provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}
