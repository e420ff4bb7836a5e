//! Lexical ranker: substring/term-overlap scoring over the corpus.
//!
//! This is deliberately a lexical scorer, not embedding retrieval. A
//! record scores `distinct matching tokens × severity weight`; records
//! with no matching token are dropped, not kept at zero.

use serde::Serialize;
use std::sync::Arc;

use crate::corpus::{Category, CorpusStore, Country, KnowledgeRecord};
use crate::tokenizer::tokenize;

/// Default result count for a plain search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Optional exact-match constraints, applied before scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilter {
    pub country: Option<Country>,
    pub category: Option<Category>,
}

impl SearchFilter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn matches(&self, record: &KnowledgeRecord) -> bool {
        if let Some(country) = self.country {
            if record.country != country {
                return false;
            }
        }
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }
        true
    }
}

/// One retrieval hit: a corpus record plus its score for this query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    pub chunk: &'a KnowledgeRecord,
    pub score: u32,
}

/// Substring/term-overlap ranker over a shared immutable corpus.
#[derive(Clone)]
pub struct LexicalRanker {
    corpus: Arc<CorpusStore>,
}

impl LexicalRanker {
    pub fn new(corpus: Arc<CorpusStore>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    /// Rank corpus records against `query`, best first, at most `limit`.
    ///
    /// A query with no extractable tokens (pure punctuation, too short)
    /// falls back to the first `limit` filter-satisfying records in
    /// corpus order, scored by severity weight alone — the caller always
    /// gets *some* context when the query carries no signal.
    pub fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        limit: usize,
    ) -> Vec<SearchResult<'_>> {
        let tokens = tokenize(query);
        let records = self.corpus.records();

        if tokens.is_empty() {
            return records
                .iter()
                .filter(|r| filter.matches(r))
                .take(limit)
                .map(|r| SearchResult {
                    chunk: r,
                    score: r.severity.weight(),
                })
                .collect();
        }

        let tokens_lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let mut results: Vec<SearchResult<'_>> = Vec::new();
        for record in records {
            if !filter.matches(record) {
                continue;
            }
            let haystack = format!(
                "{} {} {}",
                record.content,
                record.category.as_str(),
                record.tags.join(" ")
            )
            .to_lowercase();

            // Each distinct token counts once, however often it occurs.
            let hits = tokens_lower
                .iter()
                .filter(|t| t.chars().count() >= 2 && haystack.contains(t.as_str()))
                .count() as u32;
            if hits == 0 {
                continue;
            }
            results.push(SearchResult {
                chunk: record,
                score: hits * record.severity.weight(),
            });
        }

        // Stable sort: ties keep corpus encounter order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(limit);
        results
    }
}
