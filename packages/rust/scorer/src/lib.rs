//! LLM relevance scoring against the Gemini `generateContent` API.
//!
//! Each candidate is scored with a single model call. Scoring never fails
//! from the caller's point of view: every transport, API, or parsing
//! problem becomes [`ScoreOutcome::Degraded`], whose payload is the fixed
//! `{0, "AI error", ""}` verdict.

mod parse;
mod prompt;

use std::time::Duration;

use leadcollector_shared::{GeminiModel, LeadCollectorError, Relevance, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

pub use parse::{parse_relevance, strip_code_fences};
pub use prompt::{CANDIDATE_MAX_CHARS, REFERENCE_MAX_CHARS, build_prompt};

/// Default Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key (kept out of the URL so it never lands in logs).
const API_KEY_HEADER: &str = "x-goog-api-key";

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a scoring attempt produced no usable verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("model output is not JSON: {0}")]
    Malformed(String),

    #[error("model output violates the result schema: {0}")]
    Schema(String),
}

/// Result of scoring one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Scored(Relevance),
    Degraded(ScoreError),
}

impl ScoreOutcome {
    /// The verdict to record; degraded outcomes map to [`Relevance::ai_error`].
    pub fn into_relevance(self) -> Relevance {
        match self {
            Self::Scored(relevance) => relevance,
            Self::Degraded(_) => Relevance::ai_error(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

impl From<std::result::Result<Relevance, ScoreError>> for ScoreOutcome {
    fn from(result: std::result::Result<Relevance, ScoreError>) -> Self {
        match result {
            Ok(relevance) => Self::Scored(relevance),
            Err(e) => Self::Degraded(e),
        }
    }
}

/// Inputs for scoring one candidate.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    /// Text of the user's example post.
    pub reference: &'a str,
    /// Target theme phrase.
    pub phrase: &'a str,
    /// Text of the candidate post.
    pub candidate: &'a str,
    pub model: GeminiModel,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

// ---------------------------------------------------------------------------
// GeminiScorer
// ---------------------------------------------------------------------------

/// Gemini-backed relevance scorer. One call per candidate, no retries.
#[derive(Clone)]
pub struct GeminiScorer {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiScorer {
    /// Create a scorer whose model calls are bounded by `timeout`.
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

    /// Point the scorer at another API root (proxies, mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Score one candidate. Never fails; see [`ScoreOutcome`].
    #[instrument(skip_all, fields(model = %request.model))]
    pub async fn score(&self, request: &ScoreRequest<'_>) -> ScoreOutcome {
        let outcome = ScoreOutcome::from(self.try_score(request).await);
        if let ScoreOutcome::Degraded(e) = &outcome {
            warn!(error = %e, "scoring degraded to AI error");
        }
        outcome
    }

    async fn try_score(
        &self,
        request: &ScoreRequest<'_>,
    ) -> std::result::Result<Relevance, ScoreError> {
        let prompt = build_prompt(request.reference, request.phrase, request.candidate);
        let raw = self.generate(request.model, &prompt).await?;
        debug!(chars = raw.len(), "model responded");
        parse_relevance(&raw)
    }

    async fn generate(
        &self,
        model: GeminiModel,
        prompt: &str,
    ) -> std::result::Result<String, ScoreError> {
        let url = format!("{}/v1beta/{}:generateContent", self.base_url, model.as_str());
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(ScoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ScoreError::Malformed(format!("unreadable API response: {e}")))?;

        parsed.text().ok_or(ScoreError::EmptyResponse)
    }
}

impl std::fmt::Debug for GeminiScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiScorer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    fn request<'a>() -> ScoreRequest<'a> {
        ScoreRequest {
            reference: "Looking for a CRM integration partner",
            phrase: "CRM integration",
            candidate: "We need someone to connect HubSpot to our ERP this month.",
            model: GeminiModel::Flash15,
        }
    }

    fn scorer(server: &MockServer) -> GeminiScorer {
        GeminiScorer::new("gem-key", Duration::from_secs(5))
            .expect("build scorer")
            .with_base_url(server.uri())
    }

    #[test]
    fn degraded_outcome_is_ai_error() {
        let outcome = ScoreOutcome::Degraded(ScoreError::EmptyResponse);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_relevance(), Relevance::ai_error());
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#
        );
    }

    #[test]
    fn response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"{\"relevance_score\":"},{"text":"5}"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text().as_deref(), Some(r#"{"relevance_score":5}"#));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let json = r#"{"candidates":[{"finishReason":"SAFETY"}],"promptFeedback":{}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.text().is_none());
    }

    #[tokio::test]
    async fn scores_fenced_model_output() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
            .and(header("x-goog-api-key", "gem-key"))
            .and(body_string_contains("CRM integration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
                "```json\n{\"relevance_score\": 88, \"reason\": \"Active vendor search\", \"key_match\": \"need someone\"}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = scorer(&server).score(&request()).await;
        assert_eq!(
            outcome,
            ScoreOutcome::Scored(Relevance {
                relevance_score: 88,
                reason: "Active vendor search".into(),
                key_match: "need someone".into(),
            })
        );
    }

    #[tokio::test]
    async fn api_error_degrades() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let outcome = scorer(&server).score(&request()).await;
        assert_eq!(
            outcome,
            ScoreOutcome::Degraded(ScoreError::Api {
                status: 400,
                message: "API key not valid.".into(),
            })
        );
        assert_eq!(outcome.into_relevance(), Relevance::ai_error());
    }

    #[tokio::test]
    async fn non_json_model_text_degrades() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(model_reply("This post seems relevant, maybe 70?")),
            )
            .mount(&server)
            .await;

        let outcome = scorer(&server).score(&request()).await;
        assert!(matches!(outcome, ScoreOutcome::Degraded(ScoreError::Malformed(_))));
        assert_eq!(outcome.into_relevance(), Relevance::ai_error());
    }

    #[tokio::test]
    async fn garbage_api_body_degrades() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let outcome = scorer(&server).score(&request()).await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn unreachable_api_degrades() {
        let scorer = GeminiScorer::new("k", Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let outcome = scorer.score(&request()).await;
        assert!(matches!(outcome, ScoreOutcome::Degraded(ScoreError::Transport(_))));
    }
}
