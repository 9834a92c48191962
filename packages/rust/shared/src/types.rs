//! Core domain types for a lead collection run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest relevance score a model may assign.
pub const MAX_SCORE: u8 = 100;

/// Fixed bar for "high intent" leads, independent of the configured threshold.
pub const HIGH_INTENT_SCORE: u8 = 80;

/// Reason attached to a candidate whose scoring call failed.
pub const AI_ERROR_REASON: &str = "AI error";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SearchHit
// ---------------------------------------------------------------------------

/// One organic result returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Provider-formatted date, never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// Relevance
// ---------------------------------------------------------------------------

/// Structured verdict produced by the relevance scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relevance {
    /// 0–100 buying-intent strength.
    pub relevance_score: u8,
    pub reason: String,
    /// The intent signal the model picked up on.
    pub key_match: String,
}

impl Relevance {
    /// The payload used whenever scoring fails.
    pub fn ai_error() -> Self {
        Self {
            relevance_score: 0,
            reason: AI_ERROR_REASON.into(),
            key_match: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// CandidatePost
// ---------------------------------------------------------------------------

/// A discovered post under evaluation.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePost {
    /// Identifier within a run. Duplicates from the provider are kept.
    pub url: String,
    pub title: String,
    pub snippet: String,
    #[serde(default)]
    pub date: Option<String>,
    /// Extracted page text; empty when extraction failed.
    #[serde(default)]
    pub scraped_text: String,
    /// Always within 0..=100; 0 until scored.
    #[serde(default)]
    pub ai_score: u8,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub key_match: String,
}

impl CandidatePost {
    /// Text handed to the scorer: the scraped page, else title + snippet.
    pub fn scoring_input(&self) -> String {
        if self.scraped_text.is_empty() {
            format!("{} {}", self.title, self.snippet)
        } else {
            self.scraped_text.clone()
        }
    }

    /// Record a scorer verdict on this candidate.
    pub fn apply(&mut self, relevance: Relevance) {
        self.ai_score = relevance.relevance_score.min(MAX_SCORE);
        self.reason = relevance.reason;
        self.key_match = relevance.key_match;
    }

    pub fn is_high_intent(&self) -> bool {
        self.ai_score >= HIGH_INTENT_SCORE
    }
}

impl From<SearchHit> for CandidatePost {
    fn from(hit: SearchHit) -> Self {
        Self {
            url: hit.url,
            title: hit.title,
            snippet: hit.snippet,
            date: hit.date,
            scraped_text: String::new(),
            ai_score: 0,
            reason: String::new(),
            key_match: String::new(),
        }
    }
}
