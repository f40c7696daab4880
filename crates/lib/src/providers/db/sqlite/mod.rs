use crate::{
    errors::PromptError,
    providers::db::storage::SchemaStore,
    types::{ColumnDescriptor, SchemaEmbeddingRecord, SchemaMatch, TableDescriptor},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{params, Connection, Database, Row, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// The same database holds the user tables being indexed and the schema store's
/// `table_embeddings` table. When cloned, it shares the same underlying database,
/// allowing for concurrent and shared access to the same database file or
/// in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database. To share an in-memory database across multiple
    ///   `SqliteProvider` instances (e.g., in tests), create one provider and
    ///   then `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        // Enable WAL mode for better concurrency. It has no effect on in-memory databases.
        let conn = db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        // Use `query` for PRAGMA statements that return a value to avoid "unexpected row" errors.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Opens a new connection. The connection is released when dropped.
    pub fn connect(&self) -> Result<Connection, PromptError> {
        self.db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))
    }

    /// A helper for tests to pre-populate data by executing multiple SQL statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PromptError> {
        let conn = self.connect()?;

        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Ensures that the schema store's tables exist.
    /// This function is idempotent and safe to call on every application startup.
    pub async fn initialize_schema(&self) -> Result<(), PromptError> {
        let conn = self.connect()?;
        Self::create_store_tables(&conn).await
    }

    /// Reads all user table descriptors through a fresh connection.
    pub async fn list_table_descriptors(&self) -> Result<Vec<TableDescriptor>, PromptError> {
        let conn = self.connect()?;
        Self::read_table_descriptors(&conn).await
    }

    /// Fetches the stored record for a table, if any.
    pub async fn get_record(
        &self,
        table_name: &str,
    ) -> Result<Option<SchemaEmbeddingRecord>, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_RECORD, params![table_name])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// All stored records, ordered by table name.
    pub async fn list_records(&self) -> Result<Vec<SchemaEmbeddingRecord>, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn.query(sql::SELECT_ALL_RECORDS, ()).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&row)?);
        }
        Ok(records)
    }

    pub async fn count_records(&self) -> Result<usize, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn.query(sql::COUNT_RECORDS, ()).await?;
        let count = match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(n) => n as usize,
                _ => 0,
            },
            None => 0,
        };
        Ok(count)
    }

    /// Removes the stored record for a table. Returns whether a record existed.
    pub async fn delete_record(&self, table_name: &str) -> Result<bool, PromptError> {
        let conn = self.connect()?;
        let affected = Self::delete_record_on(&conn, table_name).await?;
        Ok(affected > 0)
    }

    // --- Connection-scoped operations, used inside the indexer's transaction ---

    /// Creates the store's backing table if absent.
    pub async fn create_store_tables(conn: &Connection) -> Result<(), PromptError> {
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Reads table and column metadata from the catalog.
    ///
    /// The store's own table and SQLite internals are excluded; tables without
    /// columns are skipped.
    pub async fn read_table_descriptors(
        conn: &Connection,
    ) -> Result<Vec<TableDescriptor>, PromptError> {
        let mut rows = conn.query(&sql::list_user_tables(), ()).await?;
        let mut table_names = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Ok(TursoValue::Text(name)) = row.get_value(0) {
                table_names.push(name);
            }
        }
        drop(rows);

        let mut descriptors = Vec::with_capacity(table_names.len());
        for table_name in table_names {
            let columns = Self::read_columns(conn, &table_name).await?;
            if columns.is_empty() {
                debug!(table_name = %table_name, "Skipping table without columns.");
                continue;
            }
            descriptors.push(TableDescriptor {
                table_name,
                columns,
            });
        }

        info!("Read metadata for {} tables from the catalog.", descriptors.len());
        Ok(descriptors)
    }

    async fn read_columns(
        conn: &Connection,
        table_name: &str,
    ) -> Result<Vec<ColumnDescriptor>, PromptError> {
        let mut rows = conn.query(&sql::table_info(table_name), ()).await?;
        let mut columns = Vec::new();
        // PRAGMA table_info columns: cid, name, type, notnull, dflt_value, pk
        while let Some(row) = rows.next().await? {
            let name = match row.get_value(1)? {
                TursoValue::Text(s) => s,
                _ => continue,
            };
            let data_type = match row.get_value(2)? {
                TursoValue::Text(s) if !s.trim().is_empty() => s.trim().to_uppercase(),
                _ => "UNKNOWN".to_string(),
            };
            let not_null = matches!(row.get_value(3)?, TursoValue::Integer(n) if n != 0);
            columns.push(ColumnDescriptor {
                name,
                data_type,
                not_null,
            });
        }
        Ok(columns)
    }

    /// Replaces the record for `record.table_name` (delete then insert).
    pub async fn upsert_record(
        conn: &Connection,
        record: &SchemaEmbeddingRecord,
    ) -> Result<(), PromptError> {
        Self::delete_record_on(conn, &record.table_name).await?;
        let params: Vec<TursoValue> = vec![
            TursoValue::Text(record.table_name.clone()),
            TursoValue::Text(record.description.clone()),
            TursoValue::Blob(vector_to_blob(&record.vector)),
            TursoValue::Text(record.created_at.to_rfc3339()),
        ];
        conn.execute(sql::INSERT_RECORD, params).await?;
        debug!(table_name = %record.table_name, dimension = record.vector.len(), "Upserted schema embedding.");
        Ok(())
    }

    async fn delete_record_on(conn: &Connection, table_name: &str) -> Result<u64, PromptError> {
        Ok(conn.execute(sql::DELETE_RECORD, params![table_name]).await?)
    }
}

#[async_trait]
impl SchemaStore for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SchemaMatch>, PromptError> {
        if limit == 0 || query_vector.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;
        let sql = sql::similarity_search(query_vector, limit);
        let mut rows = conn.query(&sql, ()).await?;

        let mut matches = Vec::new();
        while let Some(row) = rows.next().await? {
            let record = record_from_row(&row)?;
            let similarity = match row.get_value(4)? {
                TursoValue::Real(f) => f,
                TursoValue::Integer(i) => i as f64,
                _ => 0.0,
            };
            matches.push(SchemaMatch { record, similarity });
        }
        debug!("Similarity search returned {} tables.", matches.len());
        Ok(matches)
    }
}

/// Encodes a vector as little-endian f32 bytes, the layout `vector_distance_cos` reads.
pub fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn blob_to_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Maps `table_name, table_description, embedding, created_at` to a record.
fn record_from_row(row: &Row) -> Result<SchemaEmbeddingRecord, PromptError> {
    let table_name = match row.get_value(0)? {
        TursoValue::Text(s) => s,
        _ => String::new(),
    };
    let description = match row.get_value(1)? {
        TursoValue::Text(s) => s,
        _ => String::new(),
    };
    let vector = match row.get_value(2)? {
        TursoValue::Blob(bytes) => blob_to_vector(&bytes),
        _ => Vec::new(),
    };
    let created_at = match row.get_value(3)? {
        TursoValue::Text(s) => DateTime::parse_from_rfc3339(&s)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| {
                PromptError::StorageOperationFailed(format!(
                    "invalid created_at for '{table_name}': {e}"
                ))
            })?,
        _ => {
            return Err(PromptError::StorageOperationFailed(format!(
                "missing created_at for '{table_name}'"
            )))
        }
    };
    Ok(SchemaEmbeddingRecord {
        table_name,
        description,
        vector,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_blob_layout_is_little_endian_f32() {
        let vector = vec![1.0f32, -0.5, 0.25];
        let blob = vector_to_blob(&vector);
        assert_eq!(blob.len(), 12);
        assert_eq!(&blob[0..4], &1.0f32.to_le_bytes());
        assert_eq!(blob_to_vector(&blob), vector);
    }
}
