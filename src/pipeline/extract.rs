//! Recover a JSON object from free-form model output.
//!
//! Model responses are not contractually JSON: they may be wrapped in quotes, fenced in
//! markdown, or surrounded by prose. Extraction runs an ordered chain of strategies and the
//! first one that locates a brace-delimited span wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::normalize::strip_outer_quotes;

/// Fenced block, optional `json` tag, narrowest object up to the first closing fence
static FENCED_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid regex"));

/// First `{` through last `}`
static BRACE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("no object found")]
    NoObjectFound,

    #[error("malformed structure: {0}")]
    MalformedStructure(String),
}

/// Which strategy located the candidate span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMatch<'a> {
    Fenced(&'a str),
    Brace(&'a str),
    NotFound,
}

impl<'a> ExtractionMatch<'a> {
    pub fn span(&self) -> Option<&'a str> {
        match *self {
            ExtractionMatch::Fenced(s) | ExtractionMatch::Brace(s) => Some(s),
            ExtractionMatch::NotFound => None,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            ExtractionMatch::Fenced(_) => "fenced",
            ExtractionMatch::Brace(_) => "brace",
            ExtractionMatch::NotFound => "not_found",
        }
    }
}

pub fn find_fenced(text: &str) -> Option<&str> {
    FENCED_OBJECT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn find_brace_span(text: &str) -> Option<&str> {
    BRACE_SPAN.find(text).map(|m| m.as_str())
}

/// Run the strategy chain without parsing anything.
pub fn locate(text: &str) -> ExtractionMatch<'_> {
    let text = strip_outer_quotes(text);
    if let Some(span) = find_fenced(text) {
        return ExtractionMatch::Fenced(span);
    }
    if let Some(span) = find_brace_span(text) {
        return ExtractionMatch::Brace(span);
    }
    ExtractionMatch::NotFound
}

/// Locate and parse the structured object embedded in `text`.
///
/// Key presence and value validity are left to the caller.
pub fn extract_structured(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    let found = locate(text);
    let span = found.span().ok_or(ExtractionError::NoObjectFound)?;
    tracing::trace!(strategy = found.strategy(), "Located object span");

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ExtractionError::MalformedStructure(format!(
            "expected an object, found {}",
            other
        ))),
        Err(e) => Err(ExtractionError::MalformedStructure(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json_block() {
        let text = "```json\n{\"urgency\":\"High\",\"persona_type\":\"Other\",\"summary\":\"x\"}\n```";
        let map = extract_structured(text).unwrap();
        assert_eq!(map["urgency"], "High");
        assert_eq!(map["persona_type"], "Other");
        assert_eq!(map["summary"], "x");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn fenced_match_is_non_greedy() {
        let text = "```json\n{\"a\": 1}\n```\nand later\n```json\n{\"b\": 2}\n```";
        assert_eq!(locate(text), ExtractionMatch::Fenced("{\"a\": 1}"));
        let map = extract_structured(text).unwrap();
        assert_eq!(map["a"], 1);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn untagged_fence_is_accepted() {
        let text = "```\n{\"urgency\": \"Low\"}\n```";
        assert!(matches!(locate(text), ExtractionMatch::Fenced(_)));
    }

    #[test]
    fn bare_object_after_prose() {
        let text = "Sure! Here is the classification you asked for:\n{\"urgency\": \"Medium\", \"summary\": \"ok\"}";
        assert_eq!(
            locate(text),
            ExtractionMatch::Brace("{\"urgency\": \"Medium\", \"summary\": \"ok\"}")
        );
        let map = extract_structured(text).unwrap();
        assert_eq!(map["urgency"], "Medium");
    }

    #[test]
    fn brace_match_is_greedy() {
        let text = "x {\"a\": {\"b\": 1}} trailing } y";
        assert_eq!(
            find_brace_span(text),
            Some("{\"a\": {\"b\": 1}} trailing }")
        );
        assert!(matches!(
            extract_structured(text),
            Err(ExtractionError::MalformedStructure(_))
        ));
    }

    #[test]
    fn surrounding_quotes_are_stripped() {
        let text = "\"{\"urgency\": \"High\"}\"";
        let map = extract_structured(text).unwrap();
        assert_eq!(map["urgency"], "High");
    }

    #[test]
    fn no_braces_fails() {
        let err = extract_structured("I cannot help with that.").unwrap_err();
        assert!(matches!(err, ExtractionError::NoObjectFound));
        assert_eq!(err.to_string(), "no object found");
        assert_eq!(locate(""), ExtractionMatch::NotFound);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = extract_structured("{urgency: High}").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedStructure(_)));
    }

    #[test]
    fn extraction_is_idempotent_on_clean_json() {
        let clean = r#"{"urgency":"Low","persona_type":"Other","summary":"Student project."}"#;
        let first = extract_structured(clean).unwrap();
        let reserialized = serde_json::to_string(&first).unwrap();
        let second = extract_structured(&reserialized).unwrap();
        assert_eq!(first, second);
    }
}
