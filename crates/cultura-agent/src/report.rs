//! Structured review report: schema and tolerant parsing.
//!
//! Models wrap JSON in code fences or prose despite instructions, so
//! parsing strips fences and slices the outermost braces before handing
//! the rest to serde.

use serde::{Deserialize, Serialize};

use cultura_core::error::{CulturaError, Result};
use cultura_knowledge::Severity;

/// Overall risk verdict of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Caution,
    Danger,
}

/// A single problem found in the reviewed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIssue {
    /// The offending fragment, quoted from the input.
    pub original_text: String,
    pub issue: String,
    pub severity: Severity,
    /// Country or region the issue concerns. Free text from the model —
    /// not constrained to the corpus enum.
    pub country: String,
    pub category: String,
    pub suggestion: String,
    pub explanation: String,
}

/// The full compliance review report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// 0–100, 100 = fully compliant.
    pub overall_score: u32,
    pub risk_level: RiskLevel,
    pub summary: String,
    #[serde(default)]
    pub issues: Vec<CheckIssue>,
    #[serde(default)]
    pub revised_text: String,
    #[serde(default)]
    pub culture_tips: String,
}

/// Parse a model reply into a `CheckReport`.
pub fn parse_check_response(raw: &str) -> Result<CheckReport> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    // Slice the outermost object in case the model added prose around it.
    let json_str = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned,
    };

    serde_json::from_str(json_str)
        .map_err(|e| CulturaError::Parse(format!("Review report is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "overallScore": 45,
        "riskLevel": "danger",
        "summary": "文案包含酒精相关表述，在沙特市场风险极高",
        "issues": [
            {
                "originalText": "举杯庆祝",
                "issue": "酒精暗示",
                "severity": "critical",
                "country": "沙特阿拉伯",
                "category": "宗教禁忌",
                "suggestion": "改为\"共同庆祝\"",
                "explanation": "沙特全面禁酒，营销物料中的饮酒意象会触犯宗教规范"
            }
        ],
        "revisedText": "让我们共同庆祝这一时刻",
        "cultureTips": "海湾国家对酒精的容忍度差异很大"
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let report = parse_check_response(REPORT).unwrap();
        assert_eq!(report.overall_score, 45);
        assert_eq!(report.risk_level, RiskLevel::Danger);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{REPORT}\n```");
        let report = parse_check_response(&fenced).unwrap();
        assert_eq!(report.risk_level, RiskLevel::Danger);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let wrapped = format!("好的，以下是审核结果：\n{REPORT}\n希望对你有帮助。");
        let report = parse_check_response(&wrapped).unwrap();
        assert_eq!(report.overall_score, 45);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let minimal = r#"{"overallScore": 90, "riskLevel": "safe", "summary": "无明显风险"}"#;
        let report = parse_check_response(minimal).unwrap();
        assert!(report.issues.is_empty());
        assert!(report.revised_text.is_empty());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            parse_check_response("模型今天不想输出 JSON"),
            Err(CulturaError::Parse(_))
        ));
    }
}
