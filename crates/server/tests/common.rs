//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `sqlrag-server`
//! integration tests.
//!
//! - `TestApp`: spawns a real server on a random port over a temp-file database,
//!   with either fake providers from `sqlrag-test-utils` or HTTP providers pointed
//!   at an `httpmock::MockServer`.
//! - `test_config`: an `AppConfig` for a given database path and mock server.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use sqlrag::types::{EmbeddingConfig, ProviderConfig};
use sqlrag_server::{
    config::{AppConfig, TranslationConfig},
    router::create_router,
    state::{build_app_state, build_app_state_with, AppState},
};
use sqlrag_test_utils::{MockAiProvider, MockEmbeddingProvider, TestSetup, HR_SCHEMA};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, task::JoinHandle};

pub const RELATIONSHIP_NOTES: &str = "employees.department_id references departments.id";

/// Builds a configuration whose HTTP providers point at `mock_server`.
pub fn test_config(db_url: &str, mock_server: &MockServer) -> AppConfig {
    AppConfig {
        port: 0,
        db_url: db_url.to_string(),
        embedding: EmbeddingConfig {
            api_url: mock_server.url("/v1/embeddings"),
            model_name: "mock-embedding-model".to_string(),
            api_key: None,
            request_timeout_secs: Some(5),
        },
        generation: ProviderConfig {
            provider: "local".to_string(),
            api_url: Some(mock_server.url("/v1/chat/completions")),
            api_key: None,
            model_name: "mock-sql-model".to_string(),
            request_timeout_secs: Some(5),
        },
        translation: TranslationConfig {
            dialect: "SQLite".to_string(),
            top_k: 5,
            relationship_notes: RELATIONSHIP_NOTES.to_string(),
        },
        secrets: None,
    }
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub setup: TestSetup,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn init_tracing() {
    dotenvy::dotenv().ok();
    // `try_init` is used to prevent panic if the logger is already initialized.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();
}

impl TestApp {
    /// Spawns the server over the HR schema with fake providers.
    pub async fn spawn_with_fakes(
        ai: MockAiProvider,
        embedder: MockEmbeddingProvider,
    ) -> Result<Self> {
        init_tracing();
        let mock_server = MockServer::start();
        let setup = TestSetup::with_schema(HR_SCHEMA).await?;
        let config = test_config(&setup.db_url(), &mock_server);
        let state = build_app_state_with(config, Box::new(ai), Arc::new(embedder)).await?;
        Self::serve(state, mock_server, setup).await
    }

    /// Spawns the server over the HR schema with HTTP providers pointed at the mock server.
    pub async fn spawn_with_http_providers() -> Result<Self> {
        init_tracing();
        let mock_server = MockServer::start();
        let setup = TestSetup::with_schema(HR_SCHEMA).await?;
        let config = test_config(&setup.db_url(), &mock_server);
        let state = build_app_state(config).await?;
        Self::serve(state, mock_server, setup).await
    }

    async fn serve(state: AppState, mock_server: MockServer, setup: TestSetup) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            setup,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver might already be gone if the server task panicked,
            // so we ignore the result of send.
            let _ = tx.send(());
        }
    }
}
