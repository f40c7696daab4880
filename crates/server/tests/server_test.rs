//! # Server Endpoint Tests
//!
//! Drives the HTTP surface with fake providers: liveness, translation (structured,
//! fallback and legacy payloads), request validation, upstream failure mapping and
//! the indexing trigger.

mod common;

use common::{TestApp, RELATIONSHIP_NOTES};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlrag_test_utils::{MockAiProvider, MockEmbeddingProvider};

const STRUCTURED_REPLY: &str =
    r#"{"sql": "SELECT name FROM employees ORDER BY salary DESC LIMIT 1", "explanation": "Finds the highest paid employee"}"#;

async fn spawn(ai: MockAiProvider) -> TestApp {
    TestApp::spawn_with_fakes(ai, MockEmbeddingProvider::new())
        .await
        .expect("Failed to spawn test app")
}

#[tokio::test]
async fn test_health_and_root() {
    let app = spawn(MockAiProvider::new(STRUCTURED_REPLY)).await;

    let health = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body, json!({"status": "healthy"}));

    let root = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert!(root.text().await.unwrap().contains("sqlrag"));
}

#[tokio::test]
async fn test_generate_sql_after_indexing() {
    let ai = MockAiProvider::new(STRUCTURED_REPLY);
    let app = spawn(ai.clone()).await;

    let index = app.client.post(app.url("/index")).send().await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    let report: Value = index.json().await.unwrap();
    assert_eq!(
        report,
        json!({"message": "Successfully indexed 2 tables", "tables_processed": 2})
    );

    let response = app
        .client
        .post(app.url("/generate-sql"))
        .json(&json!({"question": "Which employee has the highest salary?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "sql": "SELECT name FROM employees ORDER BY salary DESC LIMIT 1",
            "explanation": "Finds the highest paid employee"
        })
    );

    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    let (system, user) = &calls[0];
    assert!(system.contains("SQLite"));
    assert!(user.contains("- employees: Table: employees."));
    assert!(user.contains(RELATIONSHIP_NOTES));
}

#[tokio::test]
async fn test_legacy_query_field_and_api_alias() {
    let app = spawn(MockAiProvider::new("SELECT COUNT(*) FROM departments")).await;

    let response = app
        .client
        .post(app.url("/api/generate-sql"))
        .json(&json!({"query": "How many departments are there?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sql"], "SELECT COUNT(*) FROM departments");
    assert_eq!(body["explanation"], "Generated SQL query");
}

#[tokio::test]
async fn test_blank_or_missing_question_is_bad_request() {
    let ai = MockAiProvider::new(STRUCTURED_REPLY);
    let app = spawn(ai.clone()).await;

    for payload in [json!({"question": "   "}), json!({}), json!({"prompt": "hi"})] {
        let response = app
            .client
            .post(app.url("/generate-sql"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {payload}");
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }
    assert!(ai.get_calls().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = spawn(MockAiProvider::failing("model is overloaded")).await;

    let response = app
        .client
        .post(app.url("/generate-sql"))
        .json(&json!({"question": "List all employees"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("model is overloaded"));
    assert!(body.get("sql").is_none());
}

#[tokio::test]
async fn test_index_failure_is_reported() {
    let app = TestApp::spawn_with_fakes(
        MockAiProvider::new(STRUCTURED_REPLY),
        MockEmbeddingProvider::failing_after(1),
    )
    .await
    .unwrap();

    let response = app.client.post(app.url("/index")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("mock embedding failure"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = spawn(MockAiProvider::new(STRUCTURED_REPLY)).await;

    let response = app
        .client
        .get(app.url("/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
