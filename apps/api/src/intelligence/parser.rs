//! Response Parser: pulls a structured payload out of free-form completion text.
//!
//! `parse` is total: fenced JSON, bare JSON, JSON embedded in prose, or no JSON at all
//! all produce a `ParsedPayload`. Absence of structure is a valid terminal state.
//!
//! `decode_shape` then fills a task's typed shape with explicit defaults, so downstream
//! code never checks whether a field exists.

use std::sync::LazyLock;

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::intelligence::outcome::TaskOutcome;

static LABELED_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json[ \t]*\r?\n?(.*?)```").expect("labeled fence pattern is valid")
});

static BARE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*\r?\n(.*?)```").expect("bare fence pattern is valid")
});

/// Either the decoded structure or a degraded marker carrying the raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedPayload {
    Structured(Value),
    Degraded(DegradedPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedPayload {
    pub raw_content: String,
    pub parsed: bool,
    pub error: String,
}

impl ParsedPayload {
    fn degraded(raw_text: &str, error: impl Into<String>) -> Self {
        ParsedPayload::Degraded(DegradedPayload {
            raw_content: raw_text.to_string(),
            parsed: false,
            error: error.into(),
        })
    }
}

/// Extracts a structured payload. First match wins:
/// 1. a ```json fenced block
/// 2. an unlabeled fenced block
/// 3. the first balanced top-level `{...}` span
///
/// A located block that fails to decode degrades; later strategies are not tried.
pub fn parse(raw_text: &str) -> ParsedPayload {
    let candidate = LABELED_FENCE
        .captures(raw_text)
        .or_else(|| BARE_FENCE.captures(raw_text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or_else(|| first_brace_span(raw_text));

    let Some(candidate) = candidate else {
        return ParsedPayload::degraded(raw_text, "Could not find a JSON object in response");
    };

    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value) => ParsedPayload::Structured(value),
        Err(e) => ParsedPayload::degraded(raw_text, e.to_string()),
    }
}

/// Parses `raw_text` and decodes it into `T`, degrading to `T::default()` on any failure.
/// Only a JSON object can complete; arrays and scalars degrade even when `T` would accept them.
pub fn decode_shape<T>(raw_text: &str, task: &str) -> TaskOutcome<T>
where
    T: DeserializeOwned + Default,
{
    let reason = match parse(raw_text) {
        ParsedPayload::Structured(value @ Value::Object(_)) => {
            match serde_json::from_value::<T>(value) {
                Ok(shape) => return TaskOutcome::Complete(shape),
                Err(e) => format!("Payload did not match expected shape: {e}"),
            }
        }
        ParsedPayload::Structured(_) => "Payload is not a JSON object".to_string(),
        ParsedPayload::Degraded(d) => d.error,
    };

    warn!("Failed to parse {task} response as JSON, degrading: {reason}");
    TaskOutcome::Degraded {
        partial: T::default(),
        reason,
        raw_content: raw_text.to_string(),
    }
}

/// Returns the first balanced `{...}` span, skipping braces inside JSON strings.
fn first_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Per-field lenient deserializers used by every task shape.
///
/// Model replies drift: scores arrive as `8`, `"8"`, `"8/10"` or `"75%"`; lists arrive as
/// arrays of strings, arrays of objects, or one string. Anything unusable becomes the
/// field's default rather than failing the whole payload.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    const TEXT_KEYS: &[&str] = &[
        "text",
        "issue",
        "description",
        "suggestion",
        "keyword",
        "verb",
        "example",
        "tip",
        "message",
    ];

    pub fn score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(score_from(&Value::deserialize(d)?))
    }

    pub fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.iter().filter_map(text_from).collect(),
            Value::String(s) if s.trim().is_empty() => Vec::new(),
            Value::String(s) => vec![s],
            _ => Vec::new(),
        })
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text_from(&Value::deserialize(d)?))
    }

    fn score_from(value: &Value) -> Option<f64> {
        let score = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let head = s.split('/').next().unwrap_or_default();
                head.trim().trim_end_matches('%').trim().parse::<f64>().ok()
            }
            _ => None,
        };
        score.filter(|v| v.is_finite())
    }

    fn text_from(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Object(map) => TEXT_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| Some(value.to_string())),
            Value::Array(_) => Some(value.to_string()),
        }
    }
}
