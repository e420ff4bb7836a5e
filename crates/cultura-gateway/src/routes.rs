//! API route handlers for the gateway.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use std::sync::Arc;

use cultura_agent::ChatTurn;
use cultura_agent::report::CheckReport;
use cultura_knowledge::{Category, Country, SearchFilter};

use super::server::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": msg.into() })),
    )
}

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}

/// Parse a country wire value, rejecting unknowns with the valid list.
///
/// The corpus filter is exact equality, so silently forwarding an
/// unknown value would filter out every record.
fn parse_country(value: &str) -> Result<Country, ApiError> {
    Country::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = Country::ALL.iter().map(|c| c.as_str()).collect();
        bad_request(format!(
            "未知的国家 '{}'，有效值：{}",
            value,
            valid.join("、")
        ))
    })
}

fn parse_category(value: &str) -> Result<Category, ApiError> {
    Category::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        bad_request(format!(
            "未知的类别 '{}'，有效值：{}",
            value,
            valid.join("、")
        ))
    })
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cultura-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// System information endpoint.
pub async fn system_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = state.start_time.elapsed();
    Json(serde_json::json!({
        "service": "culturacheck",
        "version": env!("CARGO_PKG_VERSION"),
        "server_time": chrono::Utc::now().to_rfc3339(),
        "uptime_secs": uptime.as_secs(),
        "provider": state.config.default_provider,
        "model": state.config.default_model,
        "knowledge": {
            "records": state.ranker.corpus().len(),
            "quarantined": state.ranker.corpus().quarantined(),
            "expansion_enabled": state.config.knowledge.expansion_enabled,
        }
    }))
}

/// Request body for `POST /api/v1/check`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub text: Option<String>,
    pub target_country: Option<String>,
    pub content_type: Option<String>,
}

/// POST /api/v1/check — review content for cultural-compliance risks.
pub async fn check_content(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckRequest>,
) -> Result<Json<CheckReport>, ApiError> {
    let text = body.text.as_deref().unwrap_or("").trim().to_string();
    if text.is_empty() {
        return Err(bad_request("text 不能为空"));
    }
    let max_len = state.config.agent.max_text_length;
    if text.chars().count() > max_len {
        return Err(bad_request(format!("text 不能超过 {max_len} 字")));
    }

    let target_country = match body.target_country.as_deref() {
        Some(v) if !v.is_empty() => Some(parse_country(v)?),
        _ => None,
    };

    let report = state
        .agent
        .check_content(&text, target_country, body.content_type.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Review failed: {e}");
            internal_error(e)
        })?;
    Ok(Json(report))
}

/// Request body for `POST /api/v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// POST /api/v1/chat — knowledge-grounded conversational reply.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let message = body.message.as_deref().unwrap_or("").trim().to_string();
    if message.is_empty() {
        return Err(bad_request("message 不能为空"));
    }

    let reply = state
        .agent
        .chat(&message, &body.history)
        .await
        .map_err(|e| {
            tracing::error!("Chat failed: {e}");
            internal_error(e)
        })?;
    Ok(Json(serde_json::json!({ "reply": reply })))
}

/// Query parameters for `GET /api/v1/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub country: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/v1/search — direct lexical retrieval, no LLM. Intended for
/// operations and debugging of the ranking behavior.
pub async fn search_knowledge(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = SearchFilter {
        country: match params.country.as_deref() {
            Some(v) if !v.is_empty() => Some(parse_country(v)?),
            _ => None,
        },
        category: match params.category.as_deref() {
            Some(v) if !v.is_empty() => Some(parse_category(v)?),
            _ => None,
        },
    };
    let limit = params.limit.unwrap_or(10).min(50);

    let results = state.ranker.search(&params.q, &filter, limit);
    Ok(Json(serde_json::json!({
        "count": results.len(),
        "results": results,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{AppState, build_router};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use cultura_agent::CheckAgent;
    use cultura_core::config::CulturaConfig;
    use cultura_core::error::Result as CoreResult;
    use cultura_core::traits::provider::{GenerateParams, Provider};
    use cultura_core::types::{Message, ModelInfo, ProviderResponse};
    use cultura_knowledge::{Category as KCategory, CorpusStore, KnowledgeRecord, Severity};
    use tower::ServiceExt;

    struct CannedProvider(&'static str);

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }
        async fn chat(
            &self,
            _messages: &[Message],
            _params: &GenerateParams,
        ) -> CoreResult<ProviderResponse> {
            Ok(ProviderResponse {
                content: Some(self.0.to_string()),
                finish_reason: Some("stop".into()),
                usage: None,
            })
        }
        async fn list_models(&self) -> CoreResult<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    fn router(reply: &'static str) -> axum::Router {
        let corpus = Arc::new(CorpusStore::from_records(vec![KnowledgeRecord {
            id: "sa-001".into(),
            content: "在沙特阿拉伯，酒精相关内容属于严格禁忌".into(),
            country: Country::SaudiArabia,
            category: KCategory::ReligiousTaboo,
            severity: Severity::Critical,
            tags: vec!["酒精".into()],
            source: String::new(),
            scenario: String::new(),
        }]));
        let mut config = CulturaConfig::default();
        config.knowledge.expansion_enabled = false;
        let agent = Arc::new(CheckAgent::with_provider(
            config.clone(),
            corpus,
            Arc::new(CannedProvider(reply)),
        ));
        build_router(AppState::new(config, agent))
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = router("{}")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_check_empty_text_is_400() {
        let req = Request::post("/api/v1/check")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "   "}"#))
            .unwrap();
        let resp = router("{}").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "text 不能为空");
    }

    #[tokio::test]
    async fn test_check_unknown_country_is_400() {
        let req = Request::post("/api/v1/check")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"text": "内容", "targetCountry": "火星"}"#,
            ))
            .unwrap();
        let resp = router("{}").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("未知的国家"));
        assert!(json["error"].as_str().unwrap().contains("沙特阿拉伯"));
    }

    #[tokio::test]
    async fn test_check_over_length_is_400() {
        let text = "字".repeat(10001);
        let req = Request::post("/api/v1/check")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "text": text }).to_string(),
            ))
            .unwrap();
        let resp = router("{}").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_returns_report() {
        let reply =
            r#"{"overallScore": 40, "riskLevel": "danger", "summary": "存在酒精相关风险"}"#;
        let req = Request::post("/api/v1/check")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"text": "举杯畅饮酒精饮品", "targetCountry": "沙特阿拉伯"}"#,
            ))
            .unwrap();
        let resp = router(reply).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["overallScore"], 40);
        assert_eq!(json["riskLevel"], "danger");
    }

    #[tokio::test]
    async fn test_chat_returns_reply() {
        let req = Request::post("/api/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message": "沙特的酒精规定？"}"#))
            .unwrap();
        let resp = router("沙特全面禁酒。").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["reply"], "沙特全面禁酒。");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let resp = router("{}")
            .oneshot(
                Request::get("/api/v1/search?q=%E9%85%92%E7%B2%BE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0]["chunk"]["id"], "sa-001");
        assert_eq!(json["results"][0]["chunk"]["country"], "沙特阿拉伯");
    }

    #[tokio::test]
    async fn test_search_bad_category_is_400() {
        let resp = router("{}")
            .oneshot(
                Request::get("/api/v1/search?q=x&category=bogus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
