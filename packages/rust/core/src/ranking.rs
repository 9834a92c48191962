//! Thresholding and ordering of scored candidates.

use leadcollector_shared::CandidatePost;

/// Candidates scoring at least `min_score`, best first.
///
/// Ties keep discovery order.
pub fn qualified(scored: &[CandidatePost], min_score: u8) -> Vec<CandidatePost> {
    let mut leads: Vec<CandidatePost> = scored
        .iter()
        .filter(|p| p.ai_score >= min_score)
        .cloned()
        .collect();
    // `sort_by` is stable.
    leads.sort_by(|a, b| b.ai_score.cmp(&a.ai_score));
    leads
}

/// Candidates at or above the fixed high-intent bar, in discovery order.
///
/// Independent of the configured threshold.
pub fn high_intent(scored: &[CandidatePost]) -> Vec<CandidatePost> {
    scored
        .iter()
        .filter(|p| p.is_high_intent())
        .cloned()
        .collect()
}
