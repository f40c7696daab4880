//! # AI Provider Factory
//!
//! Builds generation provider instances from configuration. Consumers (the server,
//! the indexer CLI) call this once at process start and inject the result into the
//! services that need it.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    types::ProviderConfig,
};
use tracing::info;

/// Creates a boxed AI provider from a named provider configuration.
pub fn create_ai_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    PromptError::MissingConfiguration(format!(
                        "api_key is required for gemini provider '{name}'"
                    ))
                })?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| GeminiProvider::endpoint_for_model(&config.model_name));
            info!("Configuring Gemini provider '{name}' with URL: {api_url}");
            Box::new(GeminiProvider::new(
                api_url,
                api_key,
                config.request_timeout_secs,
            )?)
        }
        "local" => {
            // For local providers, the URL is always required.
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    PromptError::MissingConfiguration(format!(
                        "api_url is required for local provider '{name}'"
                    ))
                })?;
            info!("Configuring local provider '{name}' with URL: {api_url}");
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone().filter(|k| !k.is_empty()),
                Some(config.model_name.clone()),
                config.request_timeout_secs,
            )?)
        }
        other => {
            return Err(PromptError::UnsupportedProvider(format!(
                "'{other}' for provider '{name}'"
            )))
        }
    };

    Ok(provider)
}
