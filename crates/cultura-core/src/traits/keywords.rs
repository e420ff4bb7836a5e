//! Keyword-extraction capability.
//!
//! The expansion orchestrator in `cultura-knowledge` only sees this
//! trait, so the success and failure paths can both be exercised with
//! deterministic fakes. The production implementation
//! (`cultura-agent::LlmKeywordExtractor`) backs it with a provider call.

use async_trait::async_trait;

use crate::error::Result;

/// Extracts salient search terms from free-form user text.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Return expansion keywords for `text`. Callers treat any error as
    /// "no keywords" — extraction is a recall enhancement, never a hard
    /// dependency.
    async fn extract_keywords(&self, text: &str) -> Result<Vec<String>>;
}
