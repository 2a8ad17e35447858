//! Helpers over exported annotation results.
//!
//! The labeling tool exports one JSON record per task, with an
//! `annotations[].result[]` list of regions. These helpers turn those
//! regions into the inputs the tagger needs and into compact values for
//! tabular exports.

use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::tagging::Span;

/// Errors raised while reading annotation result records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResultError {
    /// Required field is missing
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// Field has an unexpected JSON type
    #[error("Field '{field}' should be {expected}")]
    InvalidType {
        /// Name of the offending field
        field: String,
        /// Expected JSON type
        expected: &'static str,
    },
}

impl ResultError {
    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid type error.
    pub fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
        }
    }
}

// ============================================================================
// Spans
// ============================================================================

/// Decode the span of a single result region.
///
/// Reads `value.start`, `value.end` and `value.labels`. Missing or
/// non-integer bounds are left unset, which makes the tagger fall back to
/// all-`O` for the whole batch.
pub fn span_from_result(result: &Value) -> Span {
    let Some(value) = result.get("value") else {
        return Span::default();
    };

    let bound = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    };
    let labels = value.get("labels").and_then(Value::as_array).map(|labels| {
        labels
            .iter()
            .filter_map(|label| label.as_str().map(str::to_string))
            .collect()
    });

    Span {
        start: bound("start"),
        end: bound("end"),
        labels,
    }
}

/// Decode the spans of every result region.
pub fn spans_from_results(results: &[Value]) -> Vec<Span> {
    results.iter().map(span_from_result).collect()
}

/// Decode the spans of regions produced by one output tag (`from_name`).
pub fn spans_for_tag(results: &[Value], from_name: &str) -> Vec<Span> {
    results
        .iter()
        .filter(|r| r.get("from_name").and_then(Value::as_str) == Some(from_name))
        .map(span_from_result)
        .collect()
}

// ============================================================================
// Result Prettifying
// ============================================================================

/// Collapse result regions into compact values.
///
/// Each region loses its `type`. A `Choices` region with a single choice
/// becomes that choice, a `TextArea` region with a single text becomes that
/// text, and any other region is kept as an object. When the last region is
/// `Choices` or `TextArea` and there is exactly one region, the single value
/// is returned instead of a list.
pub fn prettify_result(regions: &[Value]) -> Result<Value, ResultError> {
    let mut out = Vec::with_capacity(regions.len());
    let mut last_type = String::new();

    for region in regions {
        let mut region: Map<String, Value> = region
            .as_object()
            .cloned()
            .ok_or_else(|| ResultError::invalid_type("region", "an object"))?;
        let tag_type = match region.remove("type") {
            Some(Value::String(t)) => t,
            Some(_) => return Err(ResultError::invalid_type("type", "a string")),
            None => return Err(ResultError::missing_field("type")),
        };

        let single = match tag_type.as_str() {
            "Choices" => single_item(&region, "choices"),
            "TextArea" => single_item(&region, "text"),
            _ => None,
        };
        out.push(single.unwrap_or(Value::Object(region)));
        last_type = tag_type;
    }

    if matches!(last_type.as_str(), "Choices" | "TextArea") && out.len() == 1 {
        Ok(out.remove(0))
    } else {
        Ok(Value::Array(out))
    }
}

fn single_item(region: &Map<String, Value>, key: &str) -> Option<Value> {
    match region.get(key)?.as_array()?.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    }
}

// ============================================================================
// Annotator
// ============================================================================

/// Get the annotator of an annotation record from its `completed_by` field.
///
/// - an object yields its `email`, else `default`, else `null`
/// - an integer yields the integer itself when `int_id` is set
/// - `null` and booleans yield `"None"`, `"True"` and `"False"`, the way the
///   labeling tool's own exporters spell them
/// - anything else yields its string form (JSON text for arrays and numbers)
pub fn annotator(
    item: &Value,
    default: Option<&str>,
    int_id: bool,
) -> Result<Value, ResultError> {
    let completed_by = item
        .get("completed_by")
        .ok_or_else(|| ResultError::missing_field("completed_by"))?;

    let annotator = match completed_by {
        Value::Object(user) => user
            .get("email")
            .cloned()
            .unwrap_or_else(|| default.map_or(Value::Null, |d| Value::String(d.to_string()))),
        Value::Number(n) if int_id && (n.is_i64() || n.is_u64()) => completed_by.clone(),
        Value::String(s) => Value::String(s.clone()),
        Value::Null => Value::String("None".to_string()),
        Value::Bool(b) => Value::String(if *b { "True" } else { "False" }.to_string()),
        other => Value::String(other.to_string()),
    };
    Ok(annotator)
}

// ============================================================================
// JSON Root Type
// ============================================================================

/// Kind of JSON document, judged from its first non-whitespace character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRootType {
    /// Starts with `{`
    Dict,
    /// Starts with `[`
    List,
    /// Starts with anything else
    Invalid,
    /// Contains only whitespace
    Empty,
}

impl JsonRootType {
    fn from_first_char(c: Option<char>) -> Self {
        match c {
            Some('{') => Self::Dict,
            Some('[') => Self::List,
            Some(_) => Self::Invalid,
            None => Self::Empty,
        }
    }
}

/// Classify a JSON document held in memory.
pub fn json_root_type(content: &str) -> JsonRootType {
    JsonRootType::from_first_char(content.chars().find(|c| !c.is_whitespace()))
}

/// Classify a JSON stream, reading only up to its first non-whitespace
/// character.
///
/// Characters are decoded as UTF-8, so leading Unicode whitespace is skipped
/// the same way [`json_root_type`] skips it. Invalid UTF-8 classifies as
/// [`JsonRootType::Invalid`].
pub fn json_root_type_of_reader<R: Read>(reader: R) -> std::io::Result<JsonRootType> {
    let mut pending: Vec<u8> = Vec::with_capacity(4);

    for byte in BufReader::new(reader).bytes() {
        pending.push(byte?);
        let c = match std::str::from_utf8(&pending) {
            Ok(decoded) => decoded.chars().next(),
            // Incomplete multi-byte sequence
            Err(e) if e.error_len().is_none() => continue,
            Err(_) => return Ok(JsonRootType::Invalid),
        };
        pending.clear();
        if !c.is_some_and(char::is_whitespace) {
            return Ok(JsonRootType::from_first_char(c));
        }
    }

    if pending.is_empty() {
        Ok(JsonRootType::Empty)
    } else {
        Ok(JsonRootType::Invalid)
    }
}

/// Classify a JSON file.
pub fn json_root_type_of_path(path: &Path) -> std::io::Result<JsonRootType> {
    let file = std::fs::File::open(path)?;
    json_root_type_of_reader(file)
}
