#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Mock providers and database helpers shared by the `sqlrag` integration tests.

use async_trait::async_trait;
use dotenvy::dotenv;
use sqlrag::providers::ai::{AiProvider, EmbeddingProvider};
use sqlrag::providers::db::sqlite::SqliteProvider;
use sqlrag::PromptError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// An HR-style schema: two related tables.
pub const HR_SCHEMA: &str = "
    CREATE TABLE departments (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL, budget REAL);
    CREATE TABLE employees (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL, salary REAL, department_id INTEGER);
";

/// Creates a shared in-memory database populated with `init_sql`.
pub async fn memory_provider(init_sql: &str) -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:").await.unwrap();
    if !init_sql.trim().is_empty() {
        provider.initialize_with_data(init_sql).await.unwrap();
    }
    provider
}

// --- Mock Embedding Provider ---

const VOCABULARY: &[&str] = &[
    "employee", "department", "salary", "budget", "name", "project", "customer", "order",
];

/// Produces deterministic keyword-count vectors, so texts sharing vocabulary are
/// close in cosine distance.
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

/// Returns canned responses in order, recording every prompt it receives.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self::with_results(responses.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    /// A provider whose every call fails with an upstream error.
    pub fn failing(message: &str) -> Self {
        Self::with_results(vec![Err(message.to_string())])
    }

    fn with_results(results: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(results.into_iter().rev().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

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

        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop()
        } else {
            responses.last().cloned()
        };
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PromptError::AiApi(message)),
            None => Err(PromptError::AiApi(
                "MockAiProvider: no response programmed".to_string(),
            )),
        }
    }
}
