//! Lead collection pipeline orchestration.
//!
//! This crate ties together page text extraction, post search, and LLM
//! relevance scoring into one end-to-end run (see [`pipeline::run_pipeline`]),
//! then ranks, partitions, and exports the qualified leads.

pub mod export;
pub mod pipeline;
pub mod progress;
pub mod ranking;
pub mod services;
