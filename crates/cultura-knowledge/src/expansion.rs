//! Keyword-expansion search: model-extracted terms widen recall before
//! final ranking.
//!
//! Expansion diversifies *which* records are found, not how high a given
//! record scores — a record reached by several sub-searches keeps its
//! best score, never a sum. Extraction failure of any kind degrades to
//! the raw-query search alone; `expanded_search` itself cannot fail once
//! the corpus is loaded.

use std::collections::HashMap;

use cultura_core::traits::KeywordExtractor;

use crate::ranker::{LexicalRanker, SearchFilter, SearchResult};

/// Hard cap on the merged result list.
pub const EXPANDED_RESULT_CAP: usize = 15;
/// Expanded-keyword sub-searches are narrow, high-precision probes.
const KEYWORD_SEARCH_LIMIT: usize = 5;
/// The raw query keeps its broad-recall pass.
const RAW_QUERY_SEARCH_LIMIT: usize = 10;
/// Upper bound on keywords taken from the extractor.
pub const MAX_EXPANSION_KEYWORDS: usize = 8;

impl LexicalRanker {
    /// Search with a keyword-expansion pass: one narrow search per
    /// extracted keyword plus one broad search on the raw query, merged
    /// by record id (max score wins), top 15.
    pub async fn expanded_search(
        &self,
        extractor: &dyn KeywordExtractor,
        query: &str,
        filter: &SearchFilter,
    ) -> Vec<SearchResult<'_>> {
        let keywords = match extractor.extract_keywords(query).await {
            Ok(mut kws) => {
                kws.truncate(MAX_EXPANSION_KEYWORDS);
                tracing::debug!("Keyword expansion produced {} terms", kws.len());
                kws
            }
            Err(e) => {
                tracing::warn!("Keyword expansion failed, using raw query only: {e}");
                Vec::new()
            }
        };

        let mut merged: Vec<SearchResult<'_>> = Vec::new();
        let mut by_id: HashMap<&str, usize> = HashMap::new();

        for keyword in &keywords {
            let batch = self.search(keyword, filter, KEYWORD_SEARCH_LIMIT);
            merge_best(&mut merged, &mut by_id, batch);
        }

        // The raw query always runs, so recall never depends on the
        // extractor succeeding.
        let batch = self.search(query, filter, RAW_QUERY_SEARCH_LIMIT);
        merge_best(&mut merged, &mut by_id, batch);

        merged.sort_by(|a, b| b.score.cmp(&a.score));
        merged.truncate(EXPANDED_RESULT_CAP);
        merged
    }
}

/// Fold a batch into the merged set, keeping the max score per record id.
fn merge_best<'a>(
    merged: &mut Vec<SearchResult<'a>>,
    by_id: &mut HashMap<&'a str, usize>,
    batch: Vec<SearchResult<'a>>,
) {
    for result in batch {
        let id = result.chunk.id.as_str();
        match by_id.get(id) {
            Some(&i) => {
                if result.score > merged[i].score {
                    merged[i].score = result.score;
                }
            }
            None => {
                by_id.insert(id, merged.len());
                merged.push(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Category, CorpusStore, Country, KnowledgeRecord, Severity};
    use async_trait::async_trait;
    use cultura_core::error::{CulturaError, Result};
    use std::collections::HashSet;
    use std::sync::Arc;

    struct FixedKeywords(Vec<&'static str>);

    #[async_trait]
    impl KeywordExtractor for FixedKeywords {
        async fn extract_keywords(&self, _text: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl KeywordExtractor for FailingExtractor {
        async fn extract_keywords(&self, _text: &str) -> Result<Vec<String>> {
            Err(CulturaError::Provider("keyword model unavailable".into()))
        }
    }

    fn record(id: &str, content: &str, severity: Severity) -> KnowledgeRecord {
        KnowledgeRecord {
            id: id.into(),
            content: content.into(),
            country: Country::PanArab,
            category: Category::BusinessEtiquette,
            severity,
            tags: vec![],
            source: String::new(),
            scenario: String::new(),
        }
    }

    fn ranker() -> LexicalRanker {
        LexicalRanker::new(Arc::new(CorpusStore::from_records(vec![
            record("r1", "斋月期间商务宴请应安排在日落之后", Severity::Warning),
            record("r2", "斋月白天不宜公开饮食", Severity::Critical),
            record("r3", "人脉引荐在海湾商务中地位关键", Severity::Info),
            record("r4", "握手礼仪与名片递送须知", Severity::Info),
        ])))
    }

    #[tokio::test]
    async fn test_expansion_failure_equals_raw_search() {
        let r = ranker();
        let expanded = r
            .expanded_search(&FailingExtractor, "斋月宴请", &SearchFilter::none())
            .await;
        let plain = r.search("斋月宴请", &SearchFilter::none(), 10);
        let expanded_ids: Vec<&str> = expanded.iter().map(|e| e.chunk.id.as_str()).collect();
        let plain_ids: Vec<&str> = plain.iter().map(|e| e.chunk.id.as_str()).collect();
        assert_eq!(expanded_ids, plain_ids);
        for (e, p) in expanded.iter().zip(plain.iter()) {
            assert_eq!(e.score, p.score);
        }
    }

    #[tokio::test]
    async fn test_expansion_widens_recall() {
        let r = ranker();
        // The raw query only reaches the Ramadan records; the extractor
        // surfaces the networking rule the query never mentions.
        let extractor = FixedKeywords(vec!["人脉"]);
        let results = r
            .expanded_search(&extractor, "斋月宴请", &SearchFilter::none())
            .await;
        let ids: Vec<&str> = results.iter().map(|e| e.chunk.id.as_str()).collect();
        assert!(ids.contains(&"r1"));
        assert!(ids.contains(&"r3"));
    }

    #[tokio::test]
    async fn test_no_duplicate_ids_and_max_score_kept() {
        let r = ranker();
        // "斋月" (narrow) and the raw query both hit r1/r2; the raw query
        // matches more tokens so its score must win.
        let extractor = FixedKeywords(vec!["斋月"]);
        let results = r
            .expanded_search(&extractor, "斋月宴请安排", &SearchFilter::none())
            .await;

        let mut seen = HashSet::new();
        for res in &results {
            assert!(seen.insert(res.chunk.id.as_str()), "duplicate id in output");
        }

        let narrow = r.search("斋月", &SearchFilter::none(), 5);
        let broad = r.search("斋月宴请安排", &SearchFilter::none(), 10);
        let narrow_r1 = narrow.iter().find(|e| e.chunk.id == "r1").unwrap().score;
        let broad_r1 = broad.iter().find(|e| e.chunk.id == "r1").unwrap().score;
        assert!(broad_r1 > narrow_r1);
        let merged_r1 = results.iter().find(|e| e.chunk.id == "r1").unwrap().score;
        assert_eq!(merged_r1, broad_r1.max(narrow_r1));
    }

    #[tokio::test]
    async fn test_result_cap_fifteen() {
        let mut records = Vec::new();
        for i in 0..12 {
            records.push(record(&format!("a{i}"), "沟通风格偏间接委婉", Severity::Info));
        }
        for i in 0..10 {
            records.push(record(&format!("b{i}"), "节日赠礼宜避开酒类", Severity::Info));
        }
        let r = LexicalRanker::new(Arc::new(CorpusStore::from_records(records)));

        let extractor = FixedKeywords(vec!["赠礼", "节日", "酒类"]);
        let results = r
            .expanded_search(&extractor, "沟通风格", &SearchFilter::none())
            .await;
        // 3 keyword probes × 5 + raw query × 10 reach well past the cap.
        assert!(results.len() <= EXPANDED_RESULT_CAP);
        assert_eq!(results.len(), EXPANDED_RESULT_CAP);
    }

    #[tokio::test]
    async fn test_keyword_list_is_capped() {
        struct ManyKeywords;
        #[async_trait]
        impl KeywordExtractor for ManyKeywords {
            async fn extract_keywords(&self, _text: &str) -> Result<Vec<String>> {
                Ok((0..50).map(|i| format!("词语{i}")).collect())
            }
        }
        let r = ranker();
        // Mostly a guard against a runaway extractor: must terminate and
        // stay within the cap.
        let results = r
            .expanded_search(&ManyKeywords, "斋月", &SearchFilter::none())
            .await;
        assert!(results.len() <= EXPANDED_RESULT_CAP);
    }

    #[tokio::test]
    async fn test_filters_forwarded_to_sub_searches() {
        let mut records = vec![
            record("p1", "斋月通用提示", Severity::Info),
            KnowledgeRecord {
                id: "sa1".into(),
                content: "沙特斋月期间的特别规定".into(),
                country: Country::SaudiArabia,
                category: Category::Holidays,
                severity: Severity::Critical,
                tags: vec![],
                source: String::new(),
                scenario: String::new(),
            },
        ];
        records.push(record("p2", "宴请座次安排", Severity::Info));
        let r = LexicalRanker::new(Arc::new(CorpusStore::from_records(records)));

        let extractor = FixedKeywords(vec!["宴请"]);
        let filter = SearchFilter {
            country: Some(Country::SaudiArabia),
            category: None,
        };
        let results = r.expanded_search(&extractor, "斋月", &filter).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "sa1");
    }
}
