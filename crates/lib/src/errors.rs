use thiserror::Error;

/// Broad classification of a [`PromptError`], used by callers to decide how a
/// failure is surfaced (HTTP status, exit code, rollback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid identifiers and settings. Fatal at startup.
    Configuration,
    /// The embedding or generation service failed or returned nothing usable.
    Upstream,
    /// Database connectivity or statement failure.
    Storage,
    /// The caller sent something we refuse to process.
    InvalidRequest,
}

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("Secret not found: {0}")]
    SecretNotFound(String),
    #[error("Secret is malformed: {0}")]
    InvalidSecret(String),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider returned an empty response: {0}")]
    EmptyResponse(String),
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Failed to serialize or deserialize JSON: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl PromptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromptError::ReqwestClientBuild(_)
            | PromptError::MissingConfiguration(_)
            | PromptError::UnsupportedProvider(_)
            | PromptError::SecretNotFound(_)
            | PromptError::InvalidSecret(_) => ErrorKind::Configuration,
            PromptError::AiRequest(_)
            | PromptError::AiDeserialization(_)
            | PromptError::AiApi(_)
            | PromptError::EmptyResponse(_) => ErrorKind::Upstream,
            PromptError::StorageConnection(_)
            | PromptError::StorageOperationFailed(_)
            | PromptError::Database(_)
            | PromptError::JsonSerialization(_) => ErrorKind::Storage,
            PromptError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}
