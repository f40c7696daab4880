//! # Test Utilities
//!
//! Fakes for the external capabilities (`AiProvider`, `EmbeddingProvider`) and a
//! temp-file database harness, shared by the server and indexer test suites.

use anyhow::Result;
use async_trait::async_trait;
use sqlrag::errors::PromptError;
use sqlrag::providers::ai::{AiProvider, EmbeddingProvider};
use sqlrag::providers::db::sqlite::SqliteProvider;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// An HR schema with two related tables and a little data.
pub const HR_SCHEMA: &str = "
    CREATE TABLE departments (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL, budget REAL);
    CREATE TABLE employees (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL, salary REAL, department_id INTEGER);
    INSERT INTO departments (id, name, budget) VALUES (1, 'Engineering', 1000000.0);
    INSERT INTO employees (id, name, salary, department_id) VALUES (1, 'Alice', 120000.0, 1);
";

// --- Test Setup ---

/// A helper struct that owns a temp-file database for one test.
///
/// The file lives in a temporary directory removed when the setup is dropped. No
/// connection is held between calls, so the code under test can open the file itself.
pub struct TestSetup {
    pub db_path: PathBuf,
    _dir: TempDir,
}

impl TestSetup {
    /// Reserves a path for an empty database.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("sqlrag-test.db");
        Ok(Self { db_path, _dir: dir })
    }

    /// Creates a database populated with `init_sql`.
    pub async fn with_schema(init_sql: &str) -> Result<Self> {
        let setup = Self::new()?;
        let provider = setup.open().await?;
        provider.initialize_with_data(init_sql).await?;
        Ok(setup)
    }

    pub fn db_url(&self) -> String {
        self.db_path.to_string_lossy().into_owned()
    }

    /// Opens the database file.
    pub async fn open(&self) -> Result<SqliteProvider> {
        Ok(SqliteProvider::new(&self.db_url()).await?)
    }
}

// --- Mock Embedding Provider ---

const VOCABULARY: &[&str] = &[
    "employee", "department", "salary", "budget", "name", "project", "customer", "order",
];

/// Produces deterministic keyword-count vectors, so texts sharing vocabulary are
/// close in cosine distance. Can be told to start failing after a number of calls.
#[derive(Clone, Debug, Default)]
pub struct MockEmbeddingProvider {
    calls: Arc<AtomicUsize>,
    fail_after: Option<usize>,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeeds for the first `n` calls, then fails every call after.
    pub fn failing_after(n: usize) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_after: Some(n),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        // A constant component keeps every vector non-zero.
        let mut vector = vec![0.05f32];
        vector.extend(
            VOCABULARY
                .iter()
                .map(|word| lower.matches(word).count() as f32),
        );
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    async fn embed(&self, input: &str) -> Result<Vec<f32>, PromptError> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_after, Some(n) if previous >= n) {
            return Err(PromptError::AiApi("mock embedding failure".to_string()));
        }
        Ok(Self::vector_for(input))
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
enum MockReply {
    Text(String),
    Failure(String),
}

/// Replies with a fixed text (or failure) and records every prompt it receives.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    reply: Arc<Mutex<MockReply>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new(response: &str) -> Self {
        Self::with_reply(MockReply::Text(response.to_string()))
    }

    /// A provider whose every call fails with an upstream error.
    pub fn failing(message: &str) -> Self {
        Self::with_reply(MockReply::Failure(message.to_string()))
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces the programmed response.
    pub fn set_response(&self, response: &str) {
        *self.reply.lock().unwrap() = MockReply::Text(response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        match self.reply.lock().unwrap().clone() {
            MockReply::Text(text) => Ok(text),
            MockReply::Failure(message) => Err(PromptError::AiApi(message)),
        }
    }
}
