//! # Schema Indexer Tests
//!
//! Verifies full indexing runs against in-memory and temp-file databases:
//! idempotent upserts, exclusion of the store's own table, and all-or-nothing
//! behaviour when the embedding service fails mid-run.

mod common;

use crate::common::{memory_provider, setup_tracing, MockEmbeddingProvider, HR_SCHEMA};
use sqlrag::providers::db::sqlite::SqliteProvider;
use sqlrag::providers::secrets::StaticSecretStore;
use sqlrag::{ErrorKind, SchemaIndexer};
use std::sync::Arc;

fn indexer(embedder: MockEmbeddingProvider) -> SchemaIndexer {
    SchemaIndexer::new(
        Arc::new(StaticSecretStore::new(":memory:")),
        "hr-db",
        Arc::new(embedder),
    )
}

#[tokio::test]
async fn test_indexes_every_user_table() {
    setup_tracing();
    let provider = memory_provider(HR_SCHEMA).await;
    let embedder = MockEmbeddingProvider::new();

    let report = indexer(embedder.clone())
        .reindex_with(&provider)
        .await
        .unwrap();

    assert_eq!(report.tables_processed, 2);
    assert_eq!(embedder.call_count(), 2);

    let names: Vec<String> = provider
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.table_name)
        .collect();
    assert_eq!(names, vec!["departments", "employees"]);

    let employees = provider.get_record("employees").await.unwrap().unwrap();
    assert_eq!(
        employees.description,
        "Table: employees. Columns: id (INTEGER NOT NULL), name (TEXT NOT NULL), salary (REAL), department_id (INTEGER)"
    );
    assert_eq!(
        employees.vector,
        MockEmbeddingProvider::vector_for(&employees.description)
    );
}

#[tokio::test]
async fn test_reindex_is_idempotent() {
    setup_tracing();
    let provider = memory_provider(HR_SCHEMA).await;
    let indexer = indexer(MockEmbeddingProvider::new());

    indexer.reindex_with(&provider).await.unwrap();
    let first = provider.get_record("departments").await.unwrap().unwrap();

    let report = indexer.reindex_with(&provider).await.unwrap();
    assert_eq!(report.tables_processed, 2);
    assert_eq!(provider.count_records().await.unwrap(), 2);

    let second = provider.get_record("departments").await.unwrap().unwrap();
    assert_eq!(second.description, first.description);
    assert_eq!(second.vector, first.vector);
    assert!(second.created_at >= first.created_at);
}

#[tokio::test]
async fn test_empty_database_makes_no_embedding_calls() {
    setup_tracing();
    let provider = memory_provider("").await;
    let embedder = MockEmbeddingProvider::new();

    let report = indexer(embedder.clone())
        .reindex_with(&provider)
        .await
        .unwrap();

    assert_eq!(report.tables_processed, 0);
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(provider.count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_embedding_failure_rolls_back_the_run() {
    setup_tracing();
    let provider = memory_provider(HR_SCHEMA).await;

    // A successful run leaves two records behind.
    indexer(MockEmbeddingProvider::new())
        .reindex_with(&provider)
        .await
        .unwrap();
    let before = provider.list_records().await.unwrap();

    // Add a third table, then fail on the second embedding call.
    provider
        .initialize_with_data("CREATE TABLE projects (id INTEGER NOT NULL, name TEXT)")
        .await
        .unwrap();
    let err = indexer(MockEmbeddingProvider::failing_after(1))
        .reindex_with(&provider)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);

    // The first table's upsert in the failed run must not be visible.
    let after = provider.list_records().await.unwrap();
    assert_eq!(after, before);
    assert!(provider.get_record("projects").await.unwrap().is_none());
}

#[tokio::test]
async fn test_reindex_all_resolves_database_from_secret() {
    setup_tracing();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("hr.db");
    let db_path = db_path.to_str().unwrap();

    {
        let provider = SqliteProvider::new(db_path).await.unwrap();
        provider.initialize_with_data(HR_SCHEMA).await.unwrap();
    }

    let indexer = SchemaIndexer::new(
        Arc::new(StaticSecretStore::new(db_path)),
        "hr-db",
        Arc::new(MockEmbeddingProvider::new()),
    );
    let report = indexer.reindex_all().await.unwrap();
    assert_eq!(report.tables_processed, 2);
    drop(indexer);

    let provider = SqliteProvider::new(db_path).await.unwrap();
    assert_eq!(provider.count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn test_missing_secret_id_is_a_configuration_error() {
    setup_tracing();
    let indexer = SchemaIndexer::new(
        Arc::new(StaticSecretStore::new(":memory:")),
        "",
        Arc::new(MockEmbeddingProvider::new()),
    );
    let err = indexer.reindex_all().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
