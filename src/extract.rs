//! Best-effort extraction of structured JSON from a free-text model reply.
//!
//! Replies arrive as prose, fenced ```json blocks, bare JSON, or anything
//! in between. Extraction strips one enclosing fence pair, tries the whole
//! reply, and falls back to the greedy first-`{`-to-last-`}` span for
//! replies with surrounding prose. The span heuristic can misfire on
//! replies containing multiple JSON-like spans or prose braces; that is a
//! known limitation.

use serde_json::Value;
use thiserror::Error;

use crate::error::NutrigenError;

/// Sentinel the generation prompts instruct the model to return when the
/// input is not a meal at all.
const INVALID_SENTINEL: &str = "INVALID";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("no parseable JSON in model reply: {0}")]
    Parse(String),

    #[error("model explicitly rejected the input")]
    ExplicitlyInvalid,

    #[error("missing required field: {0}")]
    MissingField(String),
}

impl From<ExtractError> for NutrigenError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Parse(msg) => NutrigenError::Parse(msg),
            ExtractError::ExplicitlyInvalid => NutrigenError::ExplicitlyInvalid,
            ExtractError::MissingField(path) => NutrigenError::MissingField(path),
        }
    }
}

/// Strip one enclosing ```json fence pair, if present. Fences are only
/// removed at the edges so backticks inside string values survive.
fn strip_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parse a model reply into JSON, classifying the explicit `"INVALID"`
/// sentinel separately from unparsable output.
pub fn extract(raw: &str) -> Result<Value, ExtractError> {
    let cleaned = strip_fences(raw);

    let parsed = match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => value,
        Err(first_err) => {
            let span = match (cleaned.find('{'), cleaned.rfind('}')) {
                (Some(start), Some(end)) if start < end => &cleaned[start..=end],
                _ => return Err(ExtractError::Parse(first_err.to_string())),
            };
            serde_json::from_str::<Value>(span)
                .map_err(|e| ExtractError::Parse(e.to_string()))?
        }
    };

    if parsed.as_str() == Some(INVALID_SENTINEL) {
        return Err(ExtractError::ExplicitlyInvalid);
    }

    Ok(parsed)
}

/// Check a use-case-specific discriminator field, given as a dotted path
/// (e.g. `meal_data.name`). Null and empty-string values count as missing.
pub fn require_field<'a>(value: &'a Value, path: &str) -> Result<&'a Value, ExtractError> {
    let mut current = value;
    for key in path.split('.') {
        current = current
            .get(key)
            .ok_or_else(|| ExtractError::MissingField(path.to_string()))?;
    }
    if current.is_null() || current.as_str().is_some_and(str::is_empty) {
        return Err(ExtractError::MissingField(path.to_string()));
    }
    Ok(current)
}
