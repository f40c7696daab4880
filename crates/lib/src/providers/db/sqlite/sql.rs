//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite provider.
//! This makes the core logic cleaner and isolates database-specific syntax.

use crate::constants::EMBEDDINGS_TABLE;

/// Creates the schema store's table. `table_name` is the upsert key.
pub const CREATE_TABLE_EMBEDDINGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS table_embeddings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        table_name TEXT NOT NULL UNIQUE,
        table_description TEXT NOT NULL,
        embedding BLOB NOT NULL,
        created_at TEXT NOT NULL
    );
";

/// A list of all table creation statements needed for the application to function.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_TABLE_EMBEDDINGS_TABLE];

/// Lists user tables from the catalog, excluding SQLite internals and the store's own table.
pub fn list_user_tables() -> String {
    format!(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '{EMBEDDINGS_TABLE}' \
         ORDER BY name;"
    )
}

/// Reads the ordered columns of a table: `cid, name, type, notnull, dflt_value, pk`.
pub fn table_info(table_name: &str) -> String {
    let is_plain = !table_name.is_empty()
        && table_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_plain {
        format!("PRAGMA table_info({table_name});")
    } else {
        format!("PRAGMA table_info(\"{}\");", table_name.replace('"', "\"\""))
    }
}

pub const DELETE_RECORD: &str = "DELETE FROM table_embeddings WHERE table_name = ?";

pub const INSERT_RECORD: &str = "INSERT INTO table_embeddings (table_name, table_description, embedding, created_at) VALUES (?, ?, ?, ?)";

pub const SELECT_RECORD: &str = "SELECT table_name, table_description, embedding, created_at FROM table_embeddings WHERE table_name = ?";

pub const SELECT_ALL_RECORDS: &str = "SELECT table_name, table_description, embedding, created_at FROM table_embeddings ORDER BY table_name";

pub const COUNT_RECORDS: &str = "SELECT COUNT(*) FROM table_embeddings";

/// Ranks stored records by cosine similarity to a query vector literal.
///
/// `vector_distance_cos` is `1 - cos(a, b)`, so the similarity column is the plain cosine.
pub fn similarity_search(query_vector: &[f32], limit: usize) -> String {
    let vector_str = format!(
        "vector('[{}]')",
        query_vector
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    format!(
        "SELECT table_name, table_description, embedding, created_at,
                (1.0 - vector_distance_cos(embedding, {vector_str})) AS similarity
         FROM table_embeddings
         WHERE embedding IS NOT NULL
         ORDER BY similarity DESC, table_name ASC
         LIMIT {limit};"
    )
}
