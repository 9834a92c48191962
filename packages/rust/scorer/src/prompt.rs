//! Scoring prompt construction.

/// Reference text is cut to this many characters before prompting.
pub const REFERENCE_MAX_CHARS: usize = 800;

/// Candidate text is cut to this many characters before prompting.
pub const CANDIDATE_MAX_CHARS: usize = 1000;

/// Build the lead-scoring prompt for one candidate.
pub fn build_prompt(reference: &str, phrase: &str, candidate: &str) -> String {
    let reference = truncate_chars(reference, REFERENCE_MAX_CHARS);
    let candidate = truncate_chars(candidate, CANDIDATE_MAX_CHARS);

    format!(
        r#"You are a B2B lead generation signal detector.

Reference post:
"""{reference}"""

Target theme: "{phrase}"

Candidate LinkedIn post:
"""{candidate}"""

Score from 0-100 based on:

1. Topic relevance
2. Signs of active problem
3. Buying intent
4. Decision-maker language
5. Urgency signals

Return ONLY valid JSON:

{{
  "relevance_score": <0-100>,
  "reason": "<why this is or isn't a good lead>",
  "key_match": "<intent signal detected>"
}}
"#
    )
}

/// Truncate to at most `max_chars` characters at a character boundary.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_inputs_and_schema() {
        let prompt = build_prompt("Need a CRM partner", "CRM integration", "We are hiring");
        assert!(prompt.contains(r#""""Need a CRM partner""""#));
        assert!(prompt.contains(r#"Target theme: "CRM integration""#));
        assert!(prompt.contains(r#""""We are hiring""""#));
        assert!(prompt.contains(r#""relevance_score": <0-100>"#));
        assert!(prompt.contains("Decision-maker language"));
    }

    #[test]
    fn prompt_truncates_long_inputs() {
        let reference = "ж".repeat(REFERENCE_MAX_CHARS + 100);
        let candidate = "щ".repeat(CANDIDATE_MAX_CHARS + 100);
        let prompt = build_prompt(&reference, "theme", &candidate);
        assert_eq!(prompt.matches('ж').count(), REFERENCE_MAX_CHARS);
        assert_eq!(prompt.matches('щ').count(), CANDIDATE_MAX_CHARS);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "Hello 世界";
        assert_eq!(truncate_chars(text, 7), "Hello 世");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars("", 5), "");
    }
}
