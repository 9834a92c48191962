//! Shared types, error model, and configuration for LeadCollector.
//!
//! This crate is the foundation depended on by all other LeadCollector crates.
//! It provides:
//! - [`LeadCollectorError`] — the unified error type
//! - Domain types ([`CandidatePost`], [`SearchHit`], [`Relevance`], [`RunId`])
//! - Configuration ([`AppConfig`], [`RunConfig`], [`GeminiModel`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GeminiConfig, GeminiModel, MAX_RESULTS_RANGE, RunConfig,
    ScraperConfig, SerpApiConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_api_key,
};
pub use error::{LeadCollectorError, Result};
pub use types::{
    AI_ERROR_REASON, CandidatePost, HIGH_INTENT_SCORE, MAX_SCORE, Relevance, RunId, SearchHit,
};
