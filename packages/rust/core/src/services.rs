//! Seams between the pipeline and the three external services.
//!
//! The pipeline only sees these traits; [`HttpServices`] wires them to the
//! real HTTP clients, tests wire them to in-memory fakes.

use async_trait::async_trait;

use leadcollector_extractor::{Extraction, PageTextExtractor};
use leadcollector_scorer::{GeminiScorer, ScoreOutcome, ScoreRequest};
use leadcollector_search::SerpApiClient;
use leadcollector_shared::{Result, RunConfig, SearchHit};

/// Fetches a page and extracts its representative text. Must not fail.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Extraction;
}

/// Finds candidate posts for a theme phrase. Failures abort the run.
#[async_trait]
pub trait PostSearch: Send + Sync {
    async fn search(&self, phrase: &str, max_results: u32) -> Result<Vec<SearchHit>>;
}

/// Scores a candidate against the reference. Must not fail.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, request: &ScoreRequest<'_>) -> ScoreOutcome;
}

#[async_trait]
impl TextExtractor for PageTextExtractor {
    async fn extract(&self, url: &str) -> Extraction {
        PageTextExtractor::extract(self, url).await
    }
}

#[async_trait]
impl PostSearch for SerpApiClient {
    async fn search(&self, phrase: &str, max_results: u32) -> Result<Vec<SearchHit>> {
        self.search_posts(phrase, max_results).await
    }
}

#[async_trait]
impl RelevanceScorer for GeminiScorer {
    async fn score(&self, request: &ScoreRequest<'_>) -> ScoreOutcome {
        GeminiScorer::score(self, request).await
    }
}

/// Borrowed set of services for one run.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub extractor: &'a dyn TextExtractor,
    pub search: &'a dyn PostSearch,
    pub scorer: &'a dyn RelevanceScorer,
}

/// The production services, built from a [`RunConfig`].
#[derive(Debug, Clone)]
pub struct HttpServices {
    pub extractor: PageTextExtractor,
    pub search: SerpApiClient,
    pub scorer: GeminiScorer,
}

impl HttpServices {
    /// Build HTTP clients with the configured credentials and timeouts.
    ///
    /// No request is made here.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Ok(Self {
            extractor: PageTextExtractor::new(config.scrape_timeout)?,
            search: SerpApiClient::new(config.serpapi_key.clone(), config.search_timeout)?,
            scorer: GeminiScorer::new(config.gemini_key.clone(), config.score_timeout)?,
        })
    }

    pub fn as_services(&self) -> Services<'_> {
        Services {
            extractor: &self.extractor,
            search: &self.search,
            scorer: &self.scorer,
        }
    }
}
