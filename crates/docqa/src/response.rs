//! Cleanup and parsing of model output in comparison mode.
//!
//! Models asked for JSON often wrap it in a markdown code fence, sometimes
//! with a `json` language tag. [`clean_json_response`] strips exactly those two
//! patterns, in that order, and nothing else. It is a heuristic, not a
//! markdown parser: fences in the middle of the text or several fenced blocks
//! are not interpreted.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Markdown code-fence marker.
pub const FENCE: &str = "```";

/// Error message placed in [`ComparisonResult::ParseError`].
pub const PARSE_ERROR_MESSAGE: &str = "Failed to parse comparison output";

/// Outcome of a comparison call.
///
/// Serializes untagged: `Parsed` as the model's JSON value itself and
/// `ParseError` as `{"error": ..., "raw_response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonResult {
    /// The cleaned output was valid JSON. The shape is whatever the model
    /// produced; no schema is enforced. Numbers keep their exact digits.
    Parsed(Value),
    /// The cleaned output was not valid JSON.
    ParseError {
        error: String,
        /// The cleaned text that failed to parse.
        raw_response: String,
    },
}

impl ComparisonResult {
    pub fn parse_error(raw_response: impl Into<String>) -> Self {
        ComparisonResult::ParseError {
            error: PARSE_ERROR_MESSAGE.to_string(),
            raw_response: raw_response.into(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ComparisonResult::Parsed(_))
    }

    pub fn as_parsed(&self) -> Option<&Value> {
        match self {
            ComparisonResult::Parsed(v) => Some(v),
            ComparisonResult::ParseError { .. } => None,
        }
    }
}

/// Strip whitespace, an optional leading code fence, and an optional leading
/// case-insensitive `json` tag.
///
/// When the text starts with a fence it is split on every fence marker and
/// the second segment is kept. The tag check is a plain four-byte prefix
/// match, so `jsonfoo` loses its first four characters too.
pub fn clean_json_response(text: &str) -> &str {
    let mut text = text.trim();

    if text.starts_with(FENCE)
        && let Some(inner) = text.split(FENCE).nth(1)
    {
        text = inner.trim();
    }

    if let Some((tag, rest)) = text.split_at_checked(4)
        && tag.eq_ignore_ascii_case("json")
    {
        text = rest.trim();
    }

    text
}

/// Parse already-cleaned comparison output. Never fails.
pub fn parse_comparison(cleaned: &str) -> ComparisonResult {
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => ComparisonResult::Parsed(value),
        Err(e) => {
            warn!(
                "Comparison output is not valid JSON ({e}); returning raw text ({} chars)",
                cleaned.len()
            );
            ComparisonResult::parse_error(cleaned)
        }
    }
}

/// Clean raw model output, then parse it.
pub fn process_comparison(raw: &str) -> ComparisonResult {
    parse_comparison(clean_json_response(raw))
}
