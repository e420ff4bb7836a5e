//! # CulturaCheck Providers
//!
//! LLM provider implementations. All OpenAI-compatible endpoints
//! (Anthropic, OpenAI, DeepSeek, OpenRouter, Ollama) are handled by a
//! single `OpenAiCompatibleProvider`; providers differ only in endpoint
//! URL, auth style, and API key resolution.

pub mod openai_compatible;
pub mod provider_registry;

use cultura_core::config::CulturaConfig;
use cultura_core::error::{CulturaError, Result};
use cultura_core::traits::Provider;

/// Create a provider from configuration (`config.default_provider`).
pub fn create_provider(config: &CulturaConfig) -> Result<Box<dyn Provider>> {
    let provider_name = config.default_provider.as_str();

    match provider_name {
        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => Ok(Box::new(
            openai_compatible::OpenAiCompatibleProvider::custom(other, config),
        )),

        // All known OpenAI-compatible providers
        _ => {
            let registry = provider_registry::get_provider_config(provider_name)
                .ok_or_else(|| CulturaError::ProviderNotFound(provider_name.into()))?;
            Ok(Box::new(
                openai_compatible::OpenAiCompatibleProvider::from_registry(registry, config),
            ))
        }
    }
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}
