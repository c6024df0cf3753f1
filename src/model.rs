// Wire types exchanged with the n8n webhooks and the normalization step
// that turns whatever the search webhook returns into a list of hits.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One local text file as sent to the upload webhook.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub text: String,
}

/// Body of the upload webhook call: every file read plus the target namespace.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub files: Vec<FileRecord>,
    pub namespace: String,
}

/// Response of the upload webhook. Every field is optional because the
/// shape belongs to one particular workflow on the remote side; a field
/// of an unexpected type reads as absent instead of failing the decode.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadResult {
    #[serde(deserialize_with = "lenient_count")]
    pub total_files: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    pub total_upserted: Option<u64>,
    #[serde(deserialize_with = "lenient_file_results")]
    pub file_results: Option<Vec<FileResult>>,
}

impl UploadResult {
    pub fn total_files(&self) -> u64 {
        self.total_files.unwrap_or(0)
    }

    pub fn total_upserted(&self) -> u64 {
        self.total_upserted.unwrap_or(0)
    }

    /// Per-file breakdown, empty when the workflow did not report one.
    pub fn file_results(&self) -> &[FileResult] {
        self.file_results.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileResult {
    pub file_index: Option<u64>,
    pub upserted: Option<u64>,
}

impl FileResult {
    pub fn from_value(value: &Value) -> Self {
        FileResult {
            file_index: value.get("fileIndex").and_then(count_from_value),
            upserted: value.get("upserted").and_then(count_from_value),
        }
    }
}

// Accepts integers, integral floats (`9.0`) and numeric strings (`"9"`).
fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(count_from_value(&Value::deserialize(deserializer)?))
}

fn lenient_file_results<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<FileResult>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.iter().map(FileResult::from_value).collect())),
        _ => Ok(None),
    }
}

/// Body of the search webhook call.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub namespace: &'a str,
}

pub const UNKNOWN_SOURCE: &str = "unknown";
pub const MISSING_ID: &str = "N/A";
pub const MISSING_CHUNK_INDEX: i64 = -1;

/// A single chunk returned by the search webhook, with the display defaults
/// applied for absent or mistyped fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub score: f64,
    pub source: String,
    pub chunk_index: i64,
    pub id: String,
}

impl Default for SearchHit {
    fn default() -> Self {
        SearchHit {
            text: String::new(),
            score: 0.0,
            source: UNKNOWN_SOURCE.to_string(),
            chunk_index: MISSING_CHUNK_INDEX,
            id: MISSING_ID.to_string(),
        }
    }
}

impl SearchHit {
    /// Reads a hit out of an arbitrary JSON value. Anything that is not an
    /// object, or a field of the wrong type, falls back to the default.
    pub fn from_value(value: &Value) -> Self {
        let defaults = SearchHit::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };
        SearchHit {
            text: obj
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.text),
            score: obj.get("score").and_then(Value::as_f64).unwrap_or(defaults.score),
            source: obj
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.source),
            chunk_index: obj
                .get("chunk_index")
                .and_then(Value::as_i64)
                .unwrap_or(defaults.chunk_index),
            id: obj
                .get("id")
                .and_then(scalar_to_string)
                .unwrap_or(defaults.id),
        }
    }
}

// Ids are strings in practice but some workflows emit numeric ids.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalizes the search webhook response into a list of raw result values.
///
/// - a JSON array is returned as-is
/// - an object with a `data` field yields that field's contents
/// - any other non-empty value becomes a single-element list
/// - `null` and other empty values yield an empty list
pub fn normalize_results(response: Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items,
        Value::Object(mut obj) if obj.contains_key("data") => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) if is_empty_value(&other) => Vec::new(),
            Some(other) => vec![other],
            None => Vec::new(),
        },
        other if is_empty_value(&other) => Vec::new(),
        other => vec![other],
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
    }
}
