//! # Shared Constants
//!
//! Values shared across the `sqlrag` workspace crates.

/// The schema store's own table. It is never indexed.
pub const EMBEDDINGS_TABLE: &str = "table_embeddings";

/// The default path for the application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/sqlrag.db";

/// Explanation attached to a translation when the model ignored the JSON contract.
pub const FALLBACK_EXPLANATION: &str = "Generated SQL query";

/// The SQL dialect named in the generation prompt unless configured otherwise.
pub const DEFAULT_SQL_DIALECT: &str = "PostgreSQL";

/// How many tables the retrieval planner returns unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Sampling temperature for SQL generation.
pub const GENERATION_TEMPERATURE: f32 = 0.1;

/// Upper bound on generated tokens.
pub const GENERATION_MAX_TOKENS: i32 = 1024;
