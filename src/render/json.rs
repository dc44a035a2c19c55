//! JSON rendering of extracted fields.

use super::ExtractionStats;
use crate::error::{Error, Result};
use crate::extract::{Extraction, KeyValues, QueryAnswer};
use serde::Serialize;

/// MIME type of JSON output.
pub const JSON_MIME_TYPE: &str = "application/json";

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    key_values: &'a KeyValues,
    query_answers: &'a [QueryAnswer],
    stats: ExtractionStats,
}

/// Convert key values and query answers to JSON.
pub fn to_json(extraction: &Extraction<'_>, format: JsonFormat) -> Result<String> {
    let doc = JsonDocument {
        key_values: &extraction.key_values,
        query_answers: &extraction.query_answers,
        stats: extraction.stats(),
    };

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&doc),
        JsonFormat::Compact => serde_json::to_string(&doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
