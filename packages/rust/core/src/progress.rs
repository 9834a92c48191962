//! Run progress: reporter trait and the pure percentage schedule.
//!
//! The schedule is fixed: 20 % once the reference post is scraped, 40 %
//! once search returns, 40 → 80 % linearly while candidates are scored,
//! 100 % when the report is ready.

use leadcollector_shared::CandidatePost;

use crate::pipeline::LeadReport;

pub const REFERENCE_SCRAPED_PERCENT: u8 = 20;
pub const SEARCH_COMPLETE_PERCENT: u8 = 40;
pub const SCORING_COMPLETE_PERCENT: u8 = 80;
pub const DONE_PERCENT: u8 = 100;

/// Position of one candidate within the scoring loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Zero-based index of the candidate.
    pub index: usize,
    /// Number of candidates in the run.
    pub total: usize,
}

impl Step {
    /// Overall progress once this candidate has been scored.
    pub fn percent(&self) -> u8 {
        scoring_percent(self.index + 1, self.total)
    }
}

/// Overall progress after `done` of `total` candidates are scored.
///
/// An empty run is already at the end of the scoring band.
pub fn scoring_percent(done: usize, total: usize) -> u8 {
    let band = usize::from(SCORING_COMPLETE_PERCENT - SEARCH_COMPLETE_PERCENT);
    if total == 0 {
        return SCORING_COMPLETE_PERCENT;
    }
    let offset = done.min(total) * band / total;
    SEARCH_COMPLETE_PERCENT + offset as u8
}

/// Pair each item with its [`Step`] in the run.
pub fn steps<I>(items: I) -> impl Iterator<Item = (Step, I::Item)>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
{
    let iter = items.into_iter();
    let total = iter.len();
    iter.enumerate()
        .map(move |(index, item)| (Step { index, total }, item))
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase, with overall progress so far.
    fn phase(&self, name: &str, percent: u8);
    /// Called after each candidate is scored.
    fn candidate_scored(&self, post: &CandidatePost, step: Step);
    /// Called when the pipeline completes.
    fn done(&self, report: &LeadReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str, _percent: u8) {}
    fn candidate_scored(&self, _post: &CandidatePost, _step: Step) {}
    fn done(&self, _report: &LeadReport) {}
}
