//! Production `KeywordExtractor`: one auxiliary model call per query.
//!
//! No retry — a failed or malformed extraction is absorbed upstream by
//! the expansion orchestrator, which falls back to the raw-query search.

use async_trait::async_trait;
use std::sync::Arc;

use cultura_core::error::{CulturaError, Result};
use cultura_core::traits::provider::{GenerateParams, Provider};
use cultura_core::traits::KeywordExtractor;
use cultura_core::types::Message;
use cultura_knowledge::expansion::MAX_EXPANSION_KEYWORDS;

use crate::prompts::KEYWORD_PROMPT;

/// Extracts expansion keywords via the configured LLM provider.
pub struct LlmKeywordExtractor {
    provider: Arc<dyn Provider>,
    params: GenerateParams,
}

impl LlmKeywordExtractor {
    pub fn new(provider: Arc<dyn Provider>, model: String) -> Self {
        Self {
            provider,
            params: GenerateParams {
                model,
                temperature: 0.0,
                max_tokens: 256,
            },
        }
    }
}

#[async_trait]
impl KeywordExtractor for LlmKeywordExtractor {
    async fn extract_keywords(&self, text: &str) -> Result<Vec<String>> {
        let messages = [Message::system(KEYWORD_PROMPT), Message::user(text)];
        let resp = self.provider.chat(&messages, &self.params).await?;
        parse_keyword_response(resp.text())
    }
}

/// Parse the model reply into a keyword list.
pub(crate) fn parse_keyword_response(raw: &str) -> Result<Vec<String>> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let json_str = match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned,
    };

    let terms: Vec<String> = serde_json::from_str(json_str)
        .map_err(|e| CulturaError::Parse(format!("Keyword list is not a JSON array: {e}")))?;

    let mut keywords: Vec<String> = terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    keywords.truncate(MAX_EXPANSION_KEYWORDS);
    Ok(keywords)
}
