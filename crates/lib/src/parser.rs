//! # Response Parser
//!
//! Turns raw model output into a `TranslationResult`.
//!
//! Model output is untrusted. The parser accepts the contract shape
//! (`{"sql": ..., "explanation": ...}`) with common formatting noise around it: a
//! markdown code fence, prose before and after the object, or raw line breaks
//! inside the JSON strings. Anything else falls back to treating the whole
//! response as SQL. Parsing never fails.

use crate::{constants::FALLBACK_EXPLANATION, types::TranslationResult};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

static SQL_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"sql"\s*:\s*"([^"]+)""#).expect("sql field pattern is valid")
});

static EXPLANATION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"explanation"\s*:\s*"([^"]+)""#).expect("explanation field pattern is valid")
});

/// The parser's decision for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// The response contained a JSON object.
    Structured { sql: String, explanation: String },
    /// The response did not follow the JSON contract; the whole text is taken as SQL.
    Fallback { sql: String },
}

impl ParsedResponse {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedResponse::Fallback { .. })
    }

    pub fn into_result(self) -> TranslationResult {
        match self {
            ParsedResponse::Structured { sql, explanation } => TranslationResult { sql, explanation },
            ParsedResponse::Fallback { sql } => TranslationResult {
                sql,
                explanation: FALLBACK_EXPLANATION.to_string(),
            },
        }
    }
}

/// Why a response could not be read as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("response is empty")]
    Empty,
    #[error("no JSON object found in response")]
    NoJsonObject,
    #[error("response JSON is not an object")]
    NotAnObject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    /// Reads the response as the JSON contract. Only ever returns `Structured`.
    pub fn try_parse(raw: &str) -> Result<ParsedResponse, ParseFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseFailure::Empty);
        }
        let unfenced = strip_code_fence(trimmed);

        let object = match serde_json::from_str::<Value>(unfenced) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ParseFailure::NotAnObject),
            Err(_) => {
                let span = outermost_object_span(unfenced).ok_or(ParseFailure::NoJsonObject)?;
                match parse_object_span(span) {
                    Some(map) => map,
                    None => return extract_fields(span).ok_or(ParseFailure::NoJsonObject),
                }
            }
        };

        Ok(ParsedResponse::Structured {
            sql: string_field(&object, "sql"),
            explanation: string_field(&object, "explanation"),
        })
    }

    /// Classifies the response, falling back to the raw text when it is not JSON.
    pub fn classify(raw: &str) -> ParsedResponse {
        match Self::try_parse(raw) {
            Ok(parsed) => parsed,
            Err(reason) => {
                warn!("Model response did not follow the JSON format ({reason}); using raw text as SQL.");
                debug!(raw_response = %raw, "Unparsed model response.");
                ParsedResponse::Fallback {
                    sql: raw.trim().to_string(),
                }
            }
        }
    }

    pub fn parse(raw: &str) -> TranslationResult {
        Self::classify(raw).into_result()
    }
}

fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
}

/// Parses a `{ ... }` span, retrying with control characters turned into spaces.
///
/// Models often emit multi-line SQL with raw line breaks inside the JSON string,
/// which strict JSON rejects.
fn parse_object_span(span: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(span) {
        return Some(map);
    }
    let cleaned: String = span
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Last resort for almost-JSON: pulls quoted `sql` and `explanation` values out
/// directly. Both must be present.
fn extract_fields(text: &str) -> Option<ParsedResponse> {
    let sql = SQL_FIELD.captures(text)?.get(1)?.as_str();
    let explanation = EXPLANATION_FIELD.captures(text)?.get(1)?.as_str();
    Some(ParsedResponse::Structured {
        sql: sql.trim().to_string(),
        explanation: explanation.trim().to_string(),
    })
}

/// The text from the first `{` to the last `}`, if both exist in that order.
fn outermost_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
