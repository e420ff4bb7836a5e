//! # CulturaCheck Agent
//! The review/chat engine — retrieves cultural rules and assembles
//! prompts for the LLM provider.
//!
//! ## Operations
//! - **Content review**: expanded knowledge search → rules block in the
//!   user prompt → structured JSON `CheckReport`
//! - **Chat**: expanded knowledge search → rules block in the system
//!   prompt → natural-language reply
//! - **Document review**: content review with a file-type hint

pub mod keywords;
pub mod prompts;
pub mod report;

use serde::Deserialize;
use std::sync::Arc;

use cultura_core::config::CulturaConfig;
use cultura_core::error::Result;
use cultura_core::traits::provider::{GenerateParams, Provider};
use cultura_core::types::Message;
use cultura_knowledge::ranker::DEFAULT_SEARCH_LIMIT;
use cultura_knowledge::{CorpusStore, Country, LexicalRanker, SearchFilter, SearchResult};

use crate::keywords::LlmKeywordExtractor;
use crate::prompts::{CHAT_PROMPT, CHECK_PROMPT, SYSTEM_PROMPT};
use crate::report::{parse_check_response, CheckReport};

/// One prior turn of a chat conversation, as sent by the client.
/// Roles other than "user"/"assistant" are dropped at assembly time.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// The CulturaCheck agent — owns the provider handle, the ranker, and
/// the keyword extractor. Shared across requests behind an `Arc`.
pub struct CheckAgent {
    config: CulturaConfig,
    provider: Arc<dyn Provider>,
    ranker: LexicalRanker,
    extractor: LlmKeywordExtractor,
}

impl CheckAgent {
    /// Create an agent from configuration and a loaded corpus.
    pub fn new(config: CulturaConfig, corpus: Arc<CorpusStore>) -> Result<Self> {
        let provider: Arc<dyn Provider> = Arc::from(cultura_providers::create_provider(&config)?);
        Ok(Self::with_provider(config, corpus, provider))
    }

    /// Create an agent with an explicit provider (used by tests).
    pub fn with_provider(
        config: CulturaConfig,
        corpus: Arc<CorpusStore>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        let expansion_model = if config.knowledge.expansion_model.is_empty() {
            config.default_model.clone()
        } else {
            config.knowledge.expansion_model.clone()
        };
        let extractor = LlmKeywordExtractor::new(provider.clone(), expansion_model);
        Self {
            config,
            provider,
            ranker: LexicalRanker::new(corpus),
            extractor,
        }
    }

    pub fn ranker(&self) -> &LexicalRanker {
        &self.ranker
    }

    /// Retrieve context rules for a query, with the expansion pass when
    /// enabled.
    async fn retrieve(&self, query: &str, filter: &SearchFilter) -> Vec<SearchResult<'_>> {
        if self.config.knowledge.expansion_enabled {
            self.ranker
                .expanded_search(&self.extractor, query, filter)
                .await
        } else {
            self.ranker.search(query, filter, DEFAULT_SEARCH_LIMIT)
        }
    }

    /// Review business content for cultural-compliance risks and return
    /// a structured report.
    pub async fn check_content(
        &self,
        text: &str,
        target_country: Option<Country>,
        content_type: Option<&str>,
    ) -> Result<CheckReport> {
        let filter = SearchFilter {
            country: target_country,
            category: None,
        };
        let results = self.retrieve(text, &filter).await;
        tracing::debug!("Review retrieval produced {} rules", results.len());
        let rules_section = render_rules_section(&results);

        let country_part = target_country
            .map(|c| format!("（目标市场：{}）", c.as_str()))
            .unwrap_or_default();
        let type_part = content_type
            .map(|t| format!("（类型：{t}）"))
            .unwrap_or_default();
        let user_prompt = format!("待审核内容{country_part}{type_part}：\n\n{text}{rules_section}");

        let system = format!("{SYSTEM_PROMPT}\n\n{CHECK_PROMPT}");
        let params = GenerateParams {
            model: self.config.default_model.clone(),
            temperature: self.config.default_temperature,
            max_tokens: self.config.agent.check_max_tokens,
        };
        let resp = self
            .provider
            .chat(
                &[Message::system(&system), Message::user(&user_prompt)],
                &params,
            )
            .await?;

        parse_check_response(resp.text())
    }

    /// Answer a conversational question, grounded in the knowledge base.
    pub async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let results = self.retrieve(message, &SearchFilter::none()).await;
        let rules_section = render_chat_rules(&results);

        let system = format!("{SYSTEM_PROMPT}\n\n{CHAT_PROMPT}{rules_section}");
        let mut messages = vec![Message::system(&system)];
        for turn in history {
            match turn.role.as_str() {
                "user" => messages.push(Message::user(&turn.content)),
                "assistant" => messages.push(Message::assistant(&turn.content)),
                _ => {}
            }
        }
        messages.push(Message::user(message));

        let params = GenerateParams {
            model: self.config.default_model.clone(),
            temperature: self.config.default_temperature,
            max_tokens: self.config.agent.chat_max_tokens,
        };
        let resp = self.provider.chat(&messages, &params).await?;
        Ok(resp.text().to_string())
    }

    /// Review an extracted document body; `file_type` becomes the
    /// content-type hint in the prompt.
    pub async fn review_document(&self, content: &str, file_type: &str) -> Result<CheckReport> {
        self.check_content(content, None, Some(file_type)).await
    }
}

/// Rules block for the review prompt: one line per retrieved rule.
fn render_rules_section(results: &[SearchResult<'_>]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = results
        .iter()
        .map(|r| {
            format!(
                "- [{}] {}（{}）：{}",
                r.chunk.country.as_str(),
                r.chunk.category.as_str(),
                r.chunk.severity.as_str(),
                r.chunk.content
            )
        })
        .collect();
    format!(
        "\n\n【以下为与本次内容相关的文化规则，审核时请参考】\n{}",
        lines.join("\n")
    )
}

/// Rules block for the chat system prompt — content only.
fn render_chat_rules(results: &[SearchResult<'_>]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = results
        .iter()
        .map(|r| format!("- {}", r.chunk.content))
        .collect();
    format!("\n\n【参考知识库】\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cultura_knowledge::{Category, KnowledgeRecord, Severity};
    use cultura_core::types::{ProviderResponse, Role};
    use std::sync::Mutex;

    /// Records every request and replies with a fixed body.
    struct ScriptedProvider {
        reply: String,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(
            &self,
            messages: &[Message],
            _params: &GenerateParams,
        ) -> cultura_core::error::Result<ProviderResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(ProviderResponse {
                content: Some(self.reply.clone()),
                finish_reason: Some("stop".into()),
                usage: None,
            })
        }

        async fn list_models(
            &self,
        ) -> cultura_core::error::Result<Vec<cultura_core::types::ModelInfo>> {
            Ok(vec![])
        }
    }

    fn corpus() -> Arc<CorpusStore> {
        Arc::new(CorpusStore::from_records(vec![KnowledgeRecord {
            id: "sa-001".into(),
            content: "在沙特阿拉伯，酒精相关内容属于严格禁忌".into(),
            country: Country::SaudiArabia,
            category: Category::ReligiousTaboo,
            severity: Severity::Critical,
            tags: vec!["酒精".into()],
            source: "石悦华-悦出海跨文化工作室".into(),
            scenario: "营销文案审核".into(),
        }]))
    }

    fn agent(reply: &str) -> (CheckAgent, Arc<ScriptedProvider>) {
        let mut config = CulturaConfig::default();
        // Keyword expansion is exercised separately; here every provider
        // call should be the review/chat call itself.
        config.knowledge.expansion_enabled = false;
        let provider = Arc::new(ScriptedProvider::new(reply));
        let agent = CheckAgent::with_provider(config, corpus(), provider.clone());
        (agent, provider)
    }

    const REPORT_JSON: &str = r#"{"overallScore": 40, "riskLevel": "danger", "summary": "存在酒精风险"}"#;

    #[tokio::test]
    async fn test_check_content_embeds_rules() {
        let (agent, provider) = agent(REPORT_JSON);
        let report = agent
            .check_content("新品发布会将举杯庆祝，酒精饮品畅饮", Some(Country::SaudiArabia), None)
            .await
            .unwrap();
        assert_eq!(report.overall_score, 40);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let user_msg = &seen[0][1];
        assert_eq!(user_msg.role, Role::User);
        assert!(user_msg.content.contains("待审核内容（目标市场：沙特阿拉伯）"));
        assert!(user_msg.content.contains("【以下为与本次内容相关的文化规则，审核时请参考】"));
        assert!(user_msg.content.contains("- [沙特阿拉伯] 宗教禁忌（critical）："));
    }

    #[tokio::test]
    async fn test_check_content_without_matches_omits_rules_block() {
        let (agent, provider) = agent(REPORT_JSON);
        // No token of this query appears in the corpus record, and the
        // query is non-empty, so retrieval yields nothing.
        agent
            .check_content("Quarterly revenue summary", None, Some("邮件"))
            .await
            .unwrap();
        let seen = provider.seen.lock().unwrap();
        let user_msg = &seen[0][1];
        assert!(user_msg.content.contains("（类型：邮件）"));
        assert!(!user_msg.content.contains("【以下为与本次内容相关的文化规则"));
    }

    #[tokio::test]
    async fn test_chat_filters_history_roles() {
        let (agent, provider) = agent("斋月期间建议调整宴请时间。");
        let history = vec![
            ChatTurn {
                role: "user".into(),
                content: "你好".into(),
            },
            ChatTurn {
                role: "assistant".into(),
                content: "你好，请问有什么可以帮助？".into(),
            },
            ChatTurn {
                role: "system".into(),
                content: "should be dropped".into(),
            },
        ];
        let reply = agent.chat("斋月期间可以宴请吗？", &history).await.unwrap();
        assert!(reply.contains("斋月"));

        let seen = provider.seen.lock().unwrap();
        let messages = &seen[0];
        // system + 2 history turns + current message
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages.iter().all(|m| m.content != "should be dropped"));
        assert_eq!(messages[3].content, "斋月期间可以宴请吗？");
    }

    #[tokio::test]
    async fn test_chat_grounds_system_prompt_in_corpus() {
        let (agent, provider) = agent("好的。");
        agent.chat("沙特对酒精的规定？", &[]).await.unwrap();
        let seen = provider.seen.lock().unwrap();
        let system = &seen[0][0];
        assert!(system.content.contains("【参考知识库】"));
        assert!(system.content.contains("- 在沙特阿拉伯，酒精相关内容属于严格禁忌"));
    }

    #[tokio::test]
    async fn test_review_document_is_check_with_type_hint() {
        let (agent, provider) = agent(REPORT_JSON);
        agent.review_document("演示文稿内容", "pptx").await.unwrap();
        let seen = provider.seen.lock().unwrap();
        assert!(seen[0][1].content.contains("（类型：pptx）"));
    }

    #[tokio::test]
    async fn test_unparsable_report_is_error() {
        let (agent, _) = agent("这不是 JSON");
        let err = agent.check_content("测试内容", None, None).await;
        assert!(err.is_err());
    }
}
