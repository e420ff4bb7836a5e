//! Knowledge corpus: record model, closed enums, and the snapshot store.
//!
//! The corpus is produced offline and delivered as a JSON array. Loading
//! validates every record against the closed country/category sets and
//! quarantines anything out of set instead of accepting it silently.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use cultura_core::error::{CulturaError, Result};

/// Target country of a rule, or the pan-regional catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "沙特阿拉伯")]
    SaudiArabia,
    #[serde(rename = "阿联酋")]
    Uae,
    #[serde(rename = "卡塔尔")]
    Qatar,
    #[serde(rename = "科威特")]
    Kuwait,
    #[serde(rename = "阿曼")]
    Oman,
    #[serde(rename = "巴林")]
    Bahrain,
    #[serde(rename = "埃及")]
    Egypt,
    /// Applies across the Arab world.
    #[serde(rename = "阿拉伯世界通用")]
    PanArab,
}

impl Country {
    pub const ALL: [Country; 8] = [
        Country::SaudiArabia,
        Country::Uae,
        Country::Qatar,
        Country::Kuwait,
        Country::Oman,
        Country::Bahrain,
        Country::Egypt,
        Country::PanArab,
    ];

    /// The wire value used in the snapshot artifact and API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::SaudiArabia => "沙特阿拉伯",
            Country::Uae => "阿联酋",
            Country::Qatar => "卡塔尔",
            Country::Kuwait => "科威特",
            Country::Oman => "阿曼",
            Country::Bahrain => "巴林",
            Country::Egypt => "埃及",
            Country::PanArab => "阿拉伯世界通用",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Topical category of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "商务礼仪")]
    BusinessEtiquette,
    #[serde(rename = "宗教禁忌")]
    ReligiousTaboo,
    #[serde(rename = "饮食文化")]
    DietaryCulture,
    #[serde(rename = "穿着规范")]
    DressCode,
    #[serde(rename = "沟通方式")]
    CommunicationStyle,
    #[serde(rename = "节日习俗")]
    Holidays,
    #[serde(rename = "商务谈判")]
    Negotiation,
    #[serde(rename = "社交礼仪")]
    SocialEtiquette,
    #[serde(rename = "视觉设计")]
    VisualDesign,
    #[serde(rename = "数字与颜色")]
    NumbersAndColors,
    #[serde(rename = "女性商务")]
    WomenInBusiness,
    #[serde(rename = "送礼文化")]
    GiftGiving,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::BusinessEtiquette,
        Category::ReligiousTaboo,
        Category::DietaryCulture,
        Category::DressCode,
        Category::CommunicationStyle,
        Category::Holidays,
        Category::Negotiation,
        Category::SocialEtiquette,
        Category::VisualDesign,
        Category::NumbersAndColors,
        Category::WomenInBusiness,
        Category::GiftGiving,
    ];

    /// The wire value used in the snapshot artifact and API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BusinessEtiquette => "商务礼仪",
            Category::ReligiousTaboo => "宗教禁忌",
            Category::DietaryCulture => "饮食文化",
            Category::DressCode => "穿着规范",
            Category::CommunicationStyle => "沟通方式",
            Category::Holidays => "节日习俗",
            Category::Negotiation => "商务谈判",
            Category::SocialEtiquette => "社交礼仪",
            Category::VisualDesign => "视觉设计",
            Category::NumbersAndColors => "数字与颜色",
            Category::WomenInBusiness => "女性商务",
            Category::GiftGiving => "送礼文化",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Risk level of a rule. Weighs ranking toward higher-stakes matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Multiplicative scoring weight.
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Critical => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// One cultural rule from the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Unique, stable identifier.
    pub id: String,
    /// Natural-language rule text (Chinese, no markup).
    pub content: String,
    pub country: Country,
    pub category: Category,
    pub severity: Severity,
    /// Extra matchable text, e.g. ["斋月", "宴请", "饮食禁忌"].
    #[serde(default)]
    pub tags: Vec<String>,
    /// Provenance label. Attribution only, never scored.
    #[serde(default)]
    pub source: String,
    /// Usage-context hint. Informational only, never scored.
    #[serde(default)]
    pub scenario: String,
}

/// Raw record as it appears in the snapshot, before validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    scenario: String,
}

/// In-memory view of the knowledge snapshot. Loaded once, never mutated.
pub struct CorpusStore {
    records: Vec<KnowledgeRecord>,
    quarantined: usize,
}

impl CorpusStore {
    /// Load and validate the snapshot artifact at `path`.
    ///
    /// A missing or unparsable snapshot is fatal; individual bad records
    /// are quarantined with a warning and the rest of the corpus loads.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CulturaError::Corpus(format!(
                "Failed to read knowledge snapshot {}: {e}",
                path.display()
            ))
        })?;
        let store = Self::from_json(&raw)?;
        tracing::info!(
            "Knowledge corpus loaded: {} records from {} ({} quarantined)",
            store.len(),
            path.display(),
            store.quarantined()
        );
        Ok(store)
    }

    /// Parse and validate a snapshot from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawRecord> = serde_json::from_str(json)
            .map_err(|e| CulturaError::Corpus(format!("Invalid knowledge snapshot: {e}")))?;

        let mut records = Vec::with_capacity(raw.len());
        let mut seen_ids: HashSet<String> = HashSet::with_capacity(raw.len());
        let mut quarantined = 0usize;

        for r in raw {
            if r.id.is_empty() || r.content.is_empty() {
                tracing::warn!("Quarantined record '{}': missing id or content", r.id);
                quarantined += 1;
                continue;
            }
            if !seen_ids.insert(r.id.clone()) {
                tracing::warn!("Quarantined record '{}': duplicate id", r.id);
                quarantined += 1;
                continue;
            }
            let Some(country) = Country::parse(&r.country) else {
                tracing::warn!("Quarantined record '{}': unknown country '{}'", r.id, r.country);
                quarantined += 1;
                continue;
            };
            let Some(category) = Category::parse(&r.category) else {
                tracing::warn!(
                    "Quarantined record '{}': unknown category '{}'",
                    r.id,
                    r.category
                );
                quarantined += 1;
                continue;
            };
            // Unknown severity degrades to the lowest weight instead of
            // dropping the record.
            let severity = match r.severity.as_str() {
                "critical" => Severity::Critical,
                "warning" => Severity::Warning,
                "info" => Severity::Info,
                other => {
                    tracing::warn!(
                        "Record '{}': unknown severity '{}', treating as info",
                        r.id,
                        other
                    );
                    Severity::Info
                }
            };
            records.push(KnowledgeRecord {
                id: r.id,
                content: r.content,
                country,
                category,
                severity,
                tags: r.tags,
                source: r.source,
                scenario: r.scenario,
            });
        }

        Ok(Self {
            records,
            quarantined,
        })
    }

    /// Build a store from already-validated records.
    pub fn from_records(records: Vec<KnowledgeRecord>) -> Self {
        Self {
            records,
            quarantined: 0,
        }
    }

    /// All records, in snapshot order.
    pub fn records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records dropped during validation.
    pub fn quarantined(&self) -> usize {
        self.quarantined
    }
}
