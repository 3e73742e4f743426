//! Parser for the small metadata block at the top of a post.
//!
//! The block is a tiny YAML-like subset:
//!
//! ```text
//! ---
//! title: "Heat season: what landlords owe you"
//! slug: heat-season
//! tags: ["Heat", "Rights"]
//! schema: {"@type": "Article"}
//! ---
//! <p>Body markup…</p>
//! ```
//!
//! Each line is `key: value`. Values shaped like JSON arrays or objects are
//! parsed with `serde_json`; double-quoted values are unquoted; anything else
//! is kept as a trimmed literal.
//!
//! Parsing never fails. Every fallback is reported through
//! [`Frontmatter::diagnostics`] so callers can log malformed content without
//! aborting the build.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const MARKER: &str = "---";
const CLOSING: &str = "\n---";

static FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_]+):\s*(.*)$").expect("static regex"));

/// Outcome of one interpretation step.
///
/// `Degraded` carries the value that was used anyway plus the reason the
/// preferred interpretation was abandoned.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Clean(T),
    Degraded { value: T, reason: String },
}

impl<T> Parsed<T> {
    pub fn into_value(self) -> T {
        match self {
            Parsed::Clean(v) => v,
            Parsed::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Parsed::Degraded { .. })
    }
}

/// Non-fatal problem found while parsing a metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Opening marker present but no closing marker; the whole input became body.
    UnclosedBlock,
    /// A line inside the block that is not `key: value`.
    UnmatchedLine { line: usize, text: String },
    /// A bracketed value that is not valid JSON; kept as a literal string.
    InvalidJson { key: String, error: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnclosedBlock => write!(f, "metadata block has no closing marker"),
            Diagnostic::UnmatchedLine { line, text } => {
                write!(f, "line {} is not `key: value`: {:?}", line, text)
            }
            Diagnostic::InvalidJson { key, error } => {
                write!(f, "field '{}' is not valid JSON ({}); kept as text", key, error)
            }
        }
    }
}

/// Result of [`parse`]: metadata fields, remaining body, and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    pub fields: BTreeMap<String, Value>,
    pub body: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Frontmatter {
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Non-empty string field. Non-string values are treated as absent.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Owned variant of [`str_field`](Self::str_field).
    pub fn string(&self, key: &str) -> Option<String> {
        self.str_field(key).map(str::to_string)
    }

    /// String entries of a JSON array field, dropping empty and non-string
    /// entries. Anything other than an array yields an empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Split `raw` into metadata fields and body.
pub fn parse(raw: &str) -> Frontmatter {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with(MARKER) {
        return Frontmatter {
            body: raw.to_string(),
            ..Default::default()
        };
    }

    let end = match trimmed[MARKER.len()..].find(CLOSING) {
        Some(pos) => pos + MARKER.len(),
        None => {
            return Frontmatter {
                body: raw.to_string(),
                diagnostics: vec![Diagnostic::UnclosedBlock],
                ..Default::default()
            }
        }
    };

    let block = trimmed[MARKER.len()..end].trim();
    let body = trimmed[end + CLOSING.len()..].trim_start().to_string();

    let mut fields = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in block.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = FIELD_LINE.captures(line) else {
            diagnostics.push(Diagnostic::UnmatchedLine {
                line: idx + 1,
                text: line.to_string(),
            });
            continue;
        };
        let key = caps[1].to_string();
        match interpret_value(caps[2].trim()) {
            Parsed::Clean(v) => {
                fields.insert(key, v);
            }
            Parsed::Degraded { value, reason } => {
                diagnostics.push(Diagnostic::InvalidJson {
                    key: key.clone(),
                    error: reason,
                });
                fields.insert(key, value);
            }
        }
    }

    Frontmatter {
        fields,
        body,
        diagnostics,
    }
}

/// Interpret one raw value: JSON-shaped, double-quoted, or literal.
pub fn interpret_value(val: &str) -> Parsed<Value> {
    let json_shaped = (val.starts_with('[') && val.ends_with(']'))
        || (val.starts_with('{') && val.ends_with('}'));
    if json_shaped {
        return match serde_json::from_str::<Value>(val) {
            Ok(v) => Parsed::Clean(v),
            Err(e) => Parsed::Degraded {
                value: Value::String(val.to_string()),
                reason: e.to_string(),
            },
        };
    }

    if val.starts_with('"') && val.ends_with('"') {
        let inner = if val.len() >= 2 { &val[1..val.len() - 1] } else { "" };
        let unescaped = inner.replace("\\\"", "\"").replace("\\\\", "\\");
        return Parsed::Clean(Value::String(unescaped));
    }

    Parsed::Clean(Value::String(val.to_string()))
}
