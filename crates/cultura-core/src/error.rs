//! Error taxonomy for CulturaCheck.
//!
//! Load-time corpus failures are fatal and propagate; per-request
//! expansion failures are absorbed where they occur (see
//! `cultura-knowledge::expansion`) and never reach this layer.

use thiserror::Error;

/// All errors produced by CulturaCheck crates.
#[derive(Debug, Error)]
pub enum CulturaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge corpus error: {0}")]
    Corpus(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API key missing for provider '{0}'")]
    ApiKeyMissing(String),

    #[error("Unknown provider '{0}'")]
    ProviderNotFound(String),

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, CulturaError>;
