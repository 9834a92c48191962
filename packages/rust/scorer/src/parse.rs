//! Parse-or-degrade handling of free-form model output.
//!
//! Accepts the raw text a model returned and yields either a validated
//! [`Relevance`] or a typed [`ScoreError`]. Nothing outside this module
//! looks at raw model text.

use std::sync::LazyLock;

use leadcollector_shared::{MAX_SCORE, Relevance};
use regex::Regex;
use serde_json::{Map, Value};

use crate::ScoreError;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json)?").unwrap());

/// Remove Markdown code fences (```` ```json ```` / ```` ``` ````) and trim.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw.trim(), "").trim().to_string()
}

/// Parse model output into a validated [`Relevance`].
pub fn parse_relevance(raw: &str) -> Result<Relevance, ScoreError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ScoreError::EmptyResponse);
    }

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        // Models sometimes wrap the object in prose; try the outermost braces.
        Err(first_err) => embedded_object(&cleaned)
            .and_then(|span| serde_json::from_str::<Value>(span).ok())
            .ok_or_else(|| ScoreError::Malformed(first_err.to_string()))?,
    };

    let Value::Object(object) = value else {
        return Err(ScoreError::Schema("expected a JSON object".into()));
    };

    Ok(Relevance {
        relevance_score: score_field(&object)?,
        reason: text_field(&object, "reason"),
        key_match: text_field(&object, "key_match"),
    })
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn score_field(object: &Map<String, Value>) -> Result<u8, ScoreError> {
    let raw = match object.get("relevance_score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
        None => return Err(ScoreError::Schema("missing relevance_score".into())),
    };

    let score = raw
        .filter(|s| s.is_finite())
        .ok_or_else(|| ScoreError::Schema("relevance_score is not a number".into()))?
        .round();

    if !(0.0..=f64::from(MAX_SCORE)).contains(&score) {
        return Err(ScoreError::Schema(format!(
            "relevance_score {score} outside 0-{MAX_SCORE}"
        )));
    }

    Ok(score as u8)
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let r = parse_relevance(
            r#"{"relevance_score": 72, "reason": "Evaluating tools", "key_match": "any recommendations?"}"#,
        )
        .unwrap();
        assert_eq!(r.relevance_score, 72);
        assert_eq!(r.reason, "Evaluating tools");
        assert_eq!(r.key_match, "any recommendations?");
    }

    #[test]
    fn strips_json_code_fence() {
        let raw = "```json\n{\"relevance_score\": 90, \"reason\": \"r\", \"key_match\": \"k\"}\n```";
        assert_eq!(parse_relevance(raw).unwrap().relevance_score, 90);
    }

    #[test]
    fn strips_bare_code_fence() {
        let raw = "```\n{\"relevance_score\": 15}\n```";
        let r = parse_relevance(raw).unwrap();
        assert_eq!(r.relevance_score, 15);
        assert_eq!(r.reason, "");
        assert_eq!(r.key_match, "");
    }

    #[test]
    fn finds_object_inside_prose() {
        let raw = "Here is my assessment:\n{\"relevance_score\": 40, \"reason\": \"weak\"}\nThanks!";
        assert_eq!(parse_relevance(raw).unwrap().relevance_score, 40);
    }

    #[test]
    fn rounds_fractional_and_accepts_numeric_strings() {
        assert_eq!(parse_relevance(r#"{"relevance_score": 84.6}"#).unwrap().relevance_score, 85);
        assert_eq!(parse_relevance(r#"{"relevance_score": "55"}"#).unwrap().relevance_score, 55);
    }

    #[test]
    fn non_string_reason_is_stringified() {
        let r = parse_relevance(r#"{"relevance_score": 10, "reason": ["a", "b"], "key_match": null}"#)
            .unwrap();
        assert_eq!(r.reason, r#"["a","b"]"#);
        assert_eq!(r.key_match, "");
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_relevance("I cannot score this post."),
            Err(ScoreError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_empty_output() {
        assert!(matches!(parse_relevance("   "), Err(ScoreError::EmptyResponse)));
        assert!(matches!(parse_relevance("```json\n```"), Err(ScoreError::EmptyResponse)));
    }

    #[test]
    fn rejects_schema_violations() {
        for raw in [
            r#"{"reason": "no score"}"#,
            r#"{"relevance_score": 101}"#,
            r#"{"relevance_score": -3}"#,
            r#"{"relevance_score": "high"}"#,
            r#"{"relevance_score": true}"#,
            r#"[1, 2, 3]"#,
            r#"42"#,
        ] {
            assert!(
                matches!(parse_relevance(raw), Err(ScoreError::Schema(_))),
                "expected schema error for {raw}"
            );
        }
    }

    #[test]
    fn strip_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }
}
