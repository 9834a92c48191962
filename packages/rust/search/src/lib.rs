//! Candidate post discovery through SerpAPI's Google engine.
//!
//! Builds a site-restricted query for the theme phrase, submits it once,
//! and keeps only organic results that link to the target platform.
//! Unlike extraction and scoring, search failures are returned to the
//! caller: without candidates there is nothing to run.

use std::time::Duration;

use leadcollector_shared::{LeadCollectorError, Result, SearchHit};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Default SerpAPI endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Platform every kept result must link to.
pub const TARGET_DOMAIN: &str = "linkedin.com";

/// Path prefix used in the site restriction.
const SITE_FILTER: &str = "linkedin.com/posts";

/// Interface language requested from the provider.
const LOCALE: &str = "en";

/// SerpAPI reports an empty result page through its `error` field.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

// ---------------------------------------------------------------------------
// Provider response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    date: Option<String>,
}

impl From<OrganicResult> for SearchHit {
    fn from(item: OrganicResult) -> Self {
        Self {
            url: item.link,
            title: item.title,
            snippet: item.snippet,
            date: item.date.filter(|d| !d.trim().is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// SerpApiClient
// ---------------------------------------------------------------------------

/// Thin SerpAPI client for post discovery.
#[derive(Clone)]
pub struct SerpApiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    /// Create a client whose requests are bounded by `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("LeadCollector/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                LeadCollectorError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at another endpoint root (proxies, mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Search for posts matching `phrase`, asking for up to `max_results` hits.
    ///
    /// Results keep the provider's order. Duplicate links are not removed.
    #[instrument(skip_all, fields(phrase = %phrase, max_results = max_results))]
    pub async fn search_posts(&self, phrase: &str, max_results: u32) -> Result<Vec<SearchHit>> {
        let query = build_query(phrase);
        let url = format!("{}/search", self.base_url);
        let num = max_results.to_string();

        debug!(%query, "querying search provider");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("q", query.as_str()),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
                ("hl", LOCALE),
            ])
            .send()
            .await
            // The request URL carries the API key; keep it out of the error.
            .map_err(|e| {
                LeadCollectorError::Network(format!("search request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            LeadCollectorError::Network(format!(
                "failed to read search response: {}",
                e.without_url()
            ))
        })?;

        if !status.is_success() {
            let detail = provider_error(&body).unwrap_or_else(|| body.chars().take(200).collect());
            return Err(LeadCollectorError::Search(format!("HTTP {status}: {detail}")));
        }

        let hits = parse_response(&body)?;
        info!(hits = hits.len(), "search complete");
        Ok(hits)
    }
}

impl std::fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Site-restricted query: exact phrase OR loose match.
pub fn build_query(phrase: &str) -> String {
    let phrase = phrase.trim();
    format!(r#"site:{SITE_FILTER} "{phrase}" OR {phrase}"#)
}

/// Parse a SerpAPI body into hits that link to [`TARGET_DOMAIN`].
pub fn parse_response(body: &str) -> Result<Vec<SearchHit>> {
    let response: SerpResponse = serde_json::from_str(body)
        .map_err(|e| LeadCollectorError::Search(format!("malformed search response: {e}")))?;

    if let Some(error) = response.error {
        if error.contains(NO_RESULTS_MARKER) {
            debug!("provider returned no results");
            return Ok(Vec::new());
        }
        return Err(LeadCollectorError::Search(error));
    }

    Ok(response
        .organic_results
        .into_iter()
        .filter(|item| item.link.contains(TARGET_DOMAIN))
        .map(SearchHit::from)
        .collect())
}

fn provider_error(body: &str) -> Option<String> {
    serde_json::from_str::<SerpResponse>(body)
        .ok()
        .and_then(|r| r.error)
}
