//! Claim verification verdicts.
//!
//! The backend answers with loosely typed JSON: `valid` may be missing,
//! `replacement_text` may be `null`, a placeholder such as `"N/A"`, or real
//! text, and `score` is only sometimes numeric. [`VerificationResult`] is the
//! normalized form every consumer works with.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// Replacement values that carry no information (compared trimmed, lower-cased).
pub const PLACEHOLDER_REPLACEMENTS: &[&str] = &["", "none", "null", "n/a", "na"];

static PLACEHOLDERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PLACEHOLDER_REPLACEMENTS.iter().copied().collect());

/// Fallback shown for missing page numbers and source files.
pub const NOT_AVAILABLE: &str = "N/A";

/// Tri-state outcome of a claim check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Valid,
    Invalid,
    InsufficientInformation,
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "Yes",
            Self::Invalid => "No",
            Self::InsufficientInformation => "Insufficient Information",
        };
        f.write_str(s)
    }
}

/// Returns the replacement text if it is a string with real content.
///
/// Non-string values (numbers, objects, `null`) and placeholder strings
/// yield `None`. The returned text is not trimmed.
pub fn meaningful_replacement(raw: Option<&Value>) -> Option<&str> {
    match raw {
        Some(Value::String(text)) => {
            let normalized = text.trim().to_lowercase();
            if PLACEHOLDERS.contains(normalized.as_str()) {
                None
            } else {
                Some(text.as_str())
            }
        }
        _ => None,
    }
}

/// Classify a backend verdict.
///
/// A blank or placeholder replacement means insufficient information no
/// matter what `reported_valid` says. Otherwise only an explicit `true` is
/// valid, so a missing flag badges as "No".
pub fn classify(reported_valid: Option<bool>, replacement: Option<&Value>) -> Validity {
    if meaningful_replacement(replacement).is_none() {
        return Validity::InsufficientInformation;
    }
    if reported_valid == Some(true) {
        Validity::Valid
    } else {
        Validity::Invalid
    }
}

/// A retrieval hit with its location in the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredSource {
    pub page: String,
    pub file: String,
    /// `None` when the backend sent an empty or null heading.
    pub heading: Option<String>,
    pub text: String,
}

impl StructuredSource {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let page = obj
            .get("page_number")
            .and_then(scalar_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let file = obj
            .get("source")
            .and_then(scalar_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let heading = match obj.get("headings") {
            None => Some(NOT_AVAILABLE.to_string()),
            Some(Value::Array(parts)) => {
                let joined = parts
                    .iter()
                    .filter_map(scalar_text)
                    .filter(|p| !p.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" > ");
                Some(joined).filter(|h| !h.is_empty())
            }
            Some(other) => scalar_text(other).filter(|h| !h.trim().is_empty()),
        };
        let text = obj.get("text").and_then(scalar_text).unwrap_or_default();
        Self {
            page,
            file,
            heading,
            text,
        }
    }
}

/// Normalized outcome of one claim verification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub sentence: Option<String>,
    pub superscripts: Vec<String>,
    /// `valid` exactly as the backend reported it.
    pub reported_valid: Option<bool>,
    pub validity: Validity,
    /// Only set when the backend suggested real replacement text.
    pub replacement: Option<String>,
    pub score: Option<f64>,
    pub explanation: Option<String>,
    pub reasoning: Option<String>,
    pub sources: Vec<String>,
    pub structured_sources: Vec<StructuredSource>,
}

impl VerificationResult {
    /// Normalize a raw verification response body.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let obj = raw.as_object().ok_or_else(|| {
            Error::Serialization(format!(
                "verification response must be a JSON object, got {}",
                json_kind(raw)
            ))
        })?;

        let reported_valid = obj.get("valid").and_then(Value::as_bool);
        let replacement_raw = obj.get("replacement_text");

        let structured_sources = list(obj, "struc_sources")
            .iter()
            .filter_map(Value::as_object)
            .map(StructuredSource::from_object)
            .collect();

        Ok(Self {
            sentence: obj.get("sentence").and_then(scalar_text),
            superscripts: list(obj, "superscripts")
                .iter()
                .filter_map(scalar_text)
                .collect(),
            reported_valid,
            validity: classify(reported_valid, replacement_raw),
            replacement: meaningful_replacement(replacement_raw).map(str::to_string),
            score: obj.get("score").and_then(Value::as_f64),
            explanation: obj.get("explanation").and_then(scalar_text),
            reasoning: obj.get("reasoning").and_then(scalar_text),
            sources: list(obj, "sources").iter().filter_map(scalar_text).collect(),
            structured_sources,
        })
    }

    pub fn is_insufficient(&self) -> bool {
        self.validity == Validity::InsufficientInformation
    }

    /// Whether the suggested-replacement section applies.
    ///
    /// Gated on the flag as reported: a response without `valid` shows no
    /// replacement section unless it is insufficient.
    pub fn shows_replacement_section(&self) -> bool {
        self.is_insufficient() || self.reported_valid == Some(false)
    }

    /// Confidence score, only for claims reported `valid: false` with a real
    /// replacement.
    pub fn displayed_score(&self) -> Option<f64> {
        if self.reported_valid == Some(false) && !self.is_insufficient() {
            self.score
        } else {
            None
        }
    }
}

fn list<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match obj.get(key) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// Text form of a scalar; `null`, arrays, and objects yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
