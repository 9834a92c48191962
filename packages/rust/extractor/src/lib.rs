//! Best-effort page text extraction.
//!
//! Fetches a post URL and pulls out the text that best represents it:
//! the `og:description` meta tag when the page has one, otherwise the
//! page's visible text. Extraction never errors; every failure collapses
//! into [`Extraction::Failed`], whose text is the empty string.

mod html;

use std::time::Duration;

use leadcollector_shared::{LeadCollectorError, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument};
use url::Url;

pub use html::{MAX_BODY_CHARS, extract_from_html};

/// Browser-like User-Agent; social sites serve bot UAs an empty shell.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Outcome of extracting text from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Content of the page's `og:description` meta tag.
    Meta(String),
    /// Visible page text, whitespace-joined and truncated.
    Body(String),
    /// Nothing usable; carries the cause for logging only.
    Failed(String),
}

impl Extraction {
    /// Extracted text, or `""` when extraction failed.
    pub fn text(&self) -> &str {
        match self {
            Self::Meta(text) | Self::Body(text) => text,
            Self::Failed(_) => "",
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Meta(text) | Self::Body(text) => text,
            Self::Failed(_) => String::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// PageTextExtractor
// ---------------------------------------------------------------------------

/// HTTP-backed text extractor. One attempt per URL, no retries.
#[derive(Debug, Clone)]
pub struct PageTextExtractor {
    client: Client,
}

impl PageTextExtractor {
    /// Create an extractor whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                LeadCollectorError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// Fetch `url` and extract its representative text.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Extraction {
        match self.fetch_html(url).await {
            Ok(body) => {
                let extraction = extract_from_html(&body);
                match &extraction {
                    Extraction::Failed(cause) => debug!(cause = %cause, "page had no usable text"),
                    found => debug!(chars = found.text().chars().count(), "extracted page text"),
                }
                extraction
            }
            Err(e) => {
                debug!(error = %e, "page fetch failed");
                Extraction::Failed(e.to_string())
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| LeadCollectorError::parse(format!("invalid URL '{url}': {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LeadCollectorError::parse(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| LeadCollectorError::Network(format!("{url}: {e}")))?;

        // Error pages still carry text worth scoring, so the status is only logged.
        let status = response.status();
        if !status.is_success() {
            debug!(%status, "non-success status, parsing body anyway");
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default().to_ascii_lowercase();
            if !content_type.contains("html") {
                return Err(LeadCollectorError::parse(format!(
                    "{url}: not an HTML response ({content_type})"
                )));
            }
        }

        response
            .text()
            .await
            .map_err(|e| LeadCollectorError::Network(format!("{url}: failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn extractor() -> PageTextExtractor {
        PageTextExtractor::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).expect("build extractor")
    }

    /// Exact header match; values containing commas are compared whole.
    fn sends_header(
        name: &'static str,
        value: &'static str,
    ) -> impl Fn(&Request) -> bool + Send + Sync {
        move |req: &Request| req.headers.get(name).and_then(|v| v.to_str().ok()) == Some(value)
    }

    fn html_response(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
    }

    #[test]
    fn failed_extraction_reads_as_empty() {
        let failed = Extraction::Failed("timeout".into());
        assert_eq!(failed.text(), "");
        assert!(failed.is_failed());
        assert_eq!(failed.into_text(), "");

        let meta = Extraction::Meta("hello".into());
        assert_eq!(meta.text(), "hello");
        assert!(!meta.is_failed());
    }

    #[tokio::test]
    async fn extracts_og_description_from_live_page() {
        let server = MockServer::start().await;
        let page = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../../fixtures/html/linkedin_post.html"
        ))
        .expect("read post fixture");

        Mock::given(method("GET"))
            .and(path("/posts/jane_crm-activity-1"))
            .and(sends_header("accept-language", "en-US,en;q=0.9"))
            .and(sends_header("user-agent", USER_AGENT))
            .respond_with(html_response(&page))
            .mount(&server)
            .await;

        let url = format!("{}/posts/jane_crm-activity-1", server.uri());
        let result = extractor().extract(&url).await;

        assert_eq!(
            result,
            Extraction::Meta("Looking for a CRM integration partner".into())
        );
    }

    #[tokio::test]
    async fn falls_back_to_body_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(html_response(
                "<html><body><h1>Hiring</h1><p>We need a  data engineer</p></body></html>",
            ))
            .mount(&server)
            .await;

        let result = extractor().extract(&format!("{}/plain", server.uri())).await;
        assert_eq!(result, Extraction::Body("Hiring We need a  data engineer".into()));
    }

    #[tokio::test]
    async fn non_html_response_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"text":"hi"}"#),
            )
            .mount(&server)
            .await;

        let result = extractor().extract(&format!("{}/data.json", server.uri())).await;
        assert!(result.is_failed());
        assert_eq!(result.text(), "");
    }

    #[tokio::test]
    async fn error_status_page_is_still_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(
                ResponseTemplate::new(403).set_body_raw(
                    r#"<meta property="og:description" content="Still here">"#,
                    "text/html",
                ),
            )
            .mount(&server)
            .await;

        let result = extractor().extract(&format!("{}/blocked", server.uri())).await;
        assert_eq!(result.text(), "Still here");
    }

    #[tokio::test]
    async fn empty_page_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(html_response("<html><head><script>var x = 1;</script></head></html>"))
            .mount(&server)
            .await;

        let result = extractor().extract(&format!("{}/empty", server.uri())).await;
        assert!(result.is_failed());
    }

    #[tokio::test]
    async fn timeout_fails_without_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(html_response("<p>late</p>").set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let extractor = PageTextExtractor::new(Duration::from_millis(50)).expect("build");
        let result = extractor.extract(&format!("{}/slow", server.uri())).await;
        assert!(result.is_failed());
    }

    #[tokio::test]
    async fn unreachable_and_invalid_urls_fail() {
        let extractor = extractor();
        assert!(extractor.extract("http://127.0.0.1:1/nothing").await.is_failed());
        assert!(extractor.extract("not a url").await.is_failed());
        assert!(extractor.extract("ftp://example.com/file").await.is_failed());
    }
}
