pub mod embedding;
pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
use reqwest::Client as ReqwestClient;
use std::fmt::Debug;
use std::time::Duration;

/// A trait for interacting with a text generation provider.
///
/// This is the generation client of the translation pipeline. Implementations
/// perform exactly one upstream call per invocation and never retry.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// Fails when the call errors, times out, or the model returns an empty body.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// Builds the reqwest client shared by the HTTP-backed providers.
pub(crate) fn build_http_client(timeout_secs: Option<u64>) -> Result<ReqwestClient, PromptError> {
    let mut builder = ReqwestClient::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(PromptError::ReqwestClientBuild)
}

/// Rejects an empty or whitespace-only model response.
pub(crate) fn non_empty(provider: &str, text: String) -> Result<String, PromptError> {
    if text.trim().is_empty() {
        Err(PromptError::EmptyResponse(provider.to_string()))
    } else {
        Ok(text)
    }
}
