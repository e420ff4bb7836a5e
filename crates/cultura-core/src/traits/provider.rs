//! LLM provider capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ModelInfo, ProviderResponse};

/// Generation parameters for a single chat request.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// An LLM chat provider. Implementations live in `cultura-providers`;
/// tests use in-process fakes.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Run one chat completion.
    async fn chat(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<ProviderResponse>;

    /// Models this provider can serve.
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}
