//! # Embeddings Provider
//!
//! This module provides the embedding client used at both index time and query time.
//! Vectors produced for table descriptions and for questions must come from the same
//! provider instance (same model and version), otherwise cosine similarity between
//! them is meaningless.

use crate::{
    errors::PromptError,
    providers::ai::build_http_client,
    types::EmbeddingConfig,
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

/// A trait for generating a fixed-length vector from a text input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug + DynClone {
    /// The model the vectors come from.
    fn model_name(&self) -> &str;

    /// Generates the embedding for `input`. Every call is fallible.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, PromptError>;
}

dyn_clone::clone_trait_object!(EmbeddingProvider);

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

// --- Gemini-specific request and response structures ---

#[derive(Serialize, Debug)]
struct GeminiEmbeddingRequest<'a> {
    model: String,
    content: GeminiEmbeddingContent<'a>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingContent<'a> {
    parts: Vec<GeminiEmbeddingPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingResponse {
    embedding: GeminiEmbeddingValue,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingValue {
    values: Vec<f32>,
}

/// An embedding client for an external HTTP API.
///
/// The payload shape is chosen from the URL: Gemini `embedContent` endpoints get the
/// Gemini body and `x-goog-api-key` auth, everything else is treated as an
/// OpenAI-compatible `/v1/embeddings` endpoint with bearer auth.
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl HttpEmbeddingProvider {
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, PromptError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            api_url,
            model,
            api_key,
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, PromptError> {
        if config.api_url.trim().is_empty() {
            return Err(PromptError::MissingConfiguration(
                "embedding.api_url".to_string(),
            ));
        }
        Self::new(
            config.api_url.clone(),
            config.model_name.clone(),
            config.api_key.clone().filter(|k| !k.is_empty()),
            config.request_timeout_secs,
        )
    }

    fn is_gemini(&self) -> bool {
        self.api_url.contains("generativelanguage.googleapis.com")
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, input: &str) -> Result<Vec<f32>, PromptError> {
        let mut request_builder = self.client.post(&self.api_url);
        let is_gemini = self.is_gemini();

        // --- 1. Construct the appropriate request body and apply auth ---
        if is_gemini {
            // Gemini requires the model name to be prefixed with "models/" in the payload.
            let gemini_model_name = if self.model.starts_with("models/") {
                self.model.clone()
            } else {
                format!("models/{}", self.model)
            };

            let request_body = GeminiEmbeddingRequest {
                model: gemini_model_name,
                content: GeminiEmbeddingContent {
                    parts: vec![GeminiEmbeddingPart { text: input }],
                },
            };
            debug!(model = %self.model, "--> Sending request to Gemini Embeddings API");
            request_builder = request_builder.json(&request_body);
            if let Some(key) = &self.api_key {
                request_builder = request_builder.header("x-goog-api-key", key);
            }
        } else {
            let request_body = OpenAIEmbeddingRequest {
                model: &self.model,
                input,
            };
            debug!(model = %self.model, "--> Sending request to OpenAI-compatible Embeddings API");
            request_builder = request_builder.json(&request_body);
            if let Some(key) = &self.api_key {
                request_builder = request_builder.bearer_auth(key);
            }
        }

        // --- 2. Send the request and handle the response ---
        let response = request_builder
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(format!("{status}: {error_text}")));
        }

        let vector = if is_gemini {
            let gemini_response: GeminiEmbeddingResponse = response
                .json()
                .await
                .map_err(PromptError::AiDeserialization)?;
            gemini_response.embedding.values
        } else {
            let openai_response: OpenAIEmbeddingResponse = response
                .json()
                .await
                .map_err(PromptError::AiDeserialization)?;
            openai_response
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .unwrap_or_default()
        };

        if vector.is_empty() {
            return Err(PromptError::EmptyResponse(format!(
                "embedding model '{}' returned no vector",
                self.model
            )));
        }
        Ok(vector)
    }
}
