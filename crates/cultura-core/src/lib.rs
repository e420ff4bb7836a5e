//! # CulturaCheck Core
//!
//! Shared foundation for all CulturaCheck crates: configuration, the
//! error taxonomy, chat message types, and the capability traits
//! (`Provider`, `KeywordExtractor`) that the knowledge and agent layers
//! are wired together with.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::CulturaConfig;
pub use error::{CulturaError, Result};
