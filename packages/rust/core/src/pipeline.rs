//! End-to-end lead run: example URL → reference text → search → score → rank → export.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, instrument};

use leadcollector_scorer::ScoreRequest;
use leadcollector_shared::{
    CandidatePost, LeadCollectorError, MAX_RESULTS_RANGE, MAX_SCORE, Result, RunConfig, RunId,
};

use crate::export::{LeadExport, build_export};
use crate::progress::{
    DONE_PERCENT, ProgressReporter, REFERENCE_SCRAPED_PERCENT, SEARCH_COMPLETE_PERCENT, steps,
};
use crate::ranking;
use crate::services::{HttpServices, Services};

/// What to look for in one run.
#[derive(Debug, Clone)]
pub struct LeadRequest {
    /// Post whose text is the scoring reference.
    pub example_url: String,
    /// Target phrase / theme.
    pub phrase: String,
}

/// Result of a lead run.
#[derive(Debug, Clone, Serialize)]
pub struct LeadReport {
    pub run_id: RunId,
    pub phrase: String,
    pub min_score: u8,
    /// Text extracted from the example post; empty if extraction failed.
    pub reference_text: String,
    /// Number of posts returned by search.
    pub found: usize,
    /// Every candidate, scored, in discovery order.
    pub scored: Vec<CandidatePost>,
    /// Candidates at or above `min_score`, best first.
    pub qualified: Vec<CandidatePost>,
    /// Candidates scoring 80 or more, in discovery order.
    pub high_intent: Vec<CandidatePost>,
    /// Present only when at least one candidate qualified.
    #[serde(skip)]
    pub export: Option<LeadExport>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl LeadReport {
    pub fn qualified_count(&self) -> usize {
        self.qualified.len()
    }

    pub fn high_intent_count(&self) -> usize {
        self.high_intent.len()
    }
}

/// Reject a run with missing or out-of-range inputs. Makes no network calls.
pub fn validate(config: &RunConfig, request: &LeadRequest) -> Result<()> {
    let required = [
        ("SerpAPI key", config.serpapi_key.as_str()),
        ("Gemini API key", config.gemini_key.as_str()),
        ("example post URL", request.example_url.as_str()),
        ("target phrase", request.phrase.as_str()),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(LeadCollectorError::validation(format!(
            "all fields are required; missing: {}",
            missing.join(", ")
        )));
    }

    if config.min_score > MAX_SCORE {
        return Err(LeadCollectorError::validation(format!(
            "min score {} outside 0-{MAX_SCORE}",
            config.min_score
        )));
    }

    if !MAX_RESULTS_RANGE.contains(&config.max_results) {
        return Err(LeadCollectorError::validation(format!(
            "max results {} outside {}-{}",
            config.max_results,
            MAX_RESULTS_RANGE.start(),
            MAX_RESULTS_RANGE.end()
        )));
    }

    Ok(())
}

/// Run the pipeline against the real HTTP services.
pub async fn run_leads(
    config: &RunConfig,
    request: &LeadRequest,
    progress: &dyn ProgressReporter,
) -> Result<LeadReport> {
    validate(config, request)?;
    let services = HttpServices::from_config(config)?;
    run_pipeline(config, request, services.as_services(), progress).await
}

/// Run the full lead pipeline.
///
/// 1. Validate inputs
/// 2. Extract the example post (reference text; empty is tolerated)
/// 3. Search for candidates (errors abort the run)
/// 4. Extract and score each candidate in order; failures degrade per candidate
/// 5. Partition into qualified / high-intent and rank
/// 6. Build the CSV export when anything qualified
pub async fn run_pipeline(
    config: &RunConfig,
    request: &LeadRequest,
    services: Services<'_>,
    progress: &dyn ProgressReporter,
) -> Result<LeadReport> {
    validate(config, request)?;

    let run_id = RunId::new();
    let span = info_span!("lead_run", %run_id, phrase = %request.phrase);
    execute(run_id, config, request, services, progress)
        .instrument(span)
        .await
}

async fn execute(
    run_id: RunId,
    config: &RunConfig,
    request: &LeadRequest,
    services: Services<'_>,
    progress: &dyn ProgressReporter,
) -> Result<LeadReport> {
    let start = Instant::now();
    let phrase = request.phrase.trim();

    info!(
        example_url = %request.example_url,
        model = %config.model,
        min_score = config.min_score,
        max_results = config.max_results,
        "starting lead run"
    );

    // --- Phase 1: Reference text ---
    progress.phase("Scraping example post", 0);
    let reference_text = services
        .extractor
        .extract(request.example_url.trim())
        .await
        .into_text();
    if reference_text.is_empty() {
        info!("example post yielded no text, scoring without a reference");
    }

    // --- Phase 2: Search ---
    progress.phase("Searching LinkedIn posts", REFERENCE_SCRAPED_PERCENT);
    let hits = services.search.search(phrase, config.max_results).await?;
    let found = hits.len();
    info!(found, "candidates found");

    // --- Phase 3: Score each candidate ---
    progress.phase("Scoring candidates", SEARCH_COMPLETE_PERCENT);
    let mut scored: Vec<CandidatePost> = Vec::with_capacity(found);

    for (step, hit) in steps(hits) {
        let mut post = CandidatePost::from(hit);
        score_candidate(&mut post, &reference_text, phrase, config, services).await;
        progress.candidate_scored(&post, step);
        scored.push(post);

        if step.index + 1 < step.total && !config.request_delay.is_zero() {
            tokio::time::sleep(config.request_delay).await;
        }
    }

    // --- Phase 4: Partition & rank ---
    let qualified = ranking::qualified(&scored, config.min_score);
    let high_intent = ranking::high_intent(&scored);

    // --- Phase 5: Export ---
    let export = if qualified.is_empty() {
        None
    } else {
        Some(build_export(&qualified, chrono::Local::now())?)
    };

    let report = LeadReport {
        run_id,
        phrase: phrase.to_string(),
        min_score: config.min_score,
        reference_text,
        found,
        scored,
        qualified,
        high_intent,
        export,
        elapsed: start.elapsed(),
    };

    progress.phase("Done", DONE_PERCENT);
    progress.done(&report);

    info!(
        found = report.found,
        qualified = report.qualified_count(),
        high_intent = report.high_intent_count(),
        elapsed_ms = report.elapsed.as_millis(),
        "lead run complete"
    );

    Ok(report)
}

/// Extract and score a single candidate in place. Never fails.
#[instrument(skip_all, fields(url = %post.url))]
async fn score_candidate(
    post: &mut CandidatePost,
    reference_text: &str,
    phrase: &str,
    config: &RunConfig,
    services: Services<'_>,
) {
    let extraction = services.extractor.extract(&post.url).await;
    if extraction.is_failed() {
        debug!("no page text, scoring title and snippet");
    }
    post.scraped_text = extraction.into_text();
    let input = post.scoring_input();

    let outcome = services
        .scorer
        .score(&ScoreRequest {
            reference: reference_text,
            phrase,
            candidate: &input,
            model: config.model,
        })
        .await;

    post.apply(outcome.into_relevance());
    debug!(score = post.ai_score, "candidate scored");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
