//! # CulturaCheck Knowledge
//!
//! Lexical retrieval over the Middle East business-culture corpus.
//! Deliberately **not** semantic search — no vector DB, no embeddings.
//!
//! ## Design
//! - **Immutable corpus** — one JSON snapshot loaded at startup, shared
//!   read-only across all requests (`Arc<CorpusStore>`), restart to refresh
//! - **Dictionary-free tokenizer** — whole Latin tokens + CJK 2–4 char
//!   n-grams; high recall on short, topic-dense rule text
//! - **Substring scorer** — distinct-hit count × severity weight (3/2/1)
//! - **Keyword expansion** — an injected model call widens recall before
//!   final ranking; best-effort, never a hard dependency
//!
//! ## How it works
//! ```text
//! User: "斋月期间能安排商务宴请吗？"
//!   ↓
//! LexicalRanker.expanded_search(query)
//!   ↓ extract_keywords → ["斋月", "宴请", "饮食禁忌", ...]
//!   ↓ one narrow search per keyword + one broad search on the raw query
//!   ↓ merge by record id, best score wins, top 15
//! Ranked cultural rules
//!   ↓
//! Injected into the review/chat prompt as context
//! ```

pub mod corpus;
pub mod expansion;
pub mod ranker;
pub mod tokenizer;

pub use corpus::{Category, CorpusStore, Country, KnowledgeRecord, Severity};
pub use ranker::{LexicalRanker, SearchFilter, SearchResult};
