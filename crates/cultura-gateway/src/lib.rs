//! # CulturaCheck Gateway
//!
//! HTTP API surface: compliance review, chat, and direct knowledge
//! search endpoints over the shared agent and corpus.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, serve};
