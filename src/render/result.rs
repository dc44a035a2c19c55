//! Export result with statistics.

use crate::extract::Extraction;
use crate::model::{BlockType, KeyValueRole};
use serde::{Deserialize, Serialize};

/// Result of exporting one document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// The rendered content
    pub content: String,

    /// Extraction statistics
    pub stats: ExtractionStats,

    /// MIME type of the content
    pub mime_type: String,
}

impl ExportResult {
    /// Create a new export result.
    pub fn new(content: String, stats: ExtractionStats, mime_type: impl Into<String>) -> Self {
        Self {
            content,
            stats,
            mime_type: mime_type.into(),
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Total number of blocks
    pub block_count: u32,

    /// Highest page number seen
    pub page_count: u32,

    /// Number of WORD blocks
    pub word_count: u32,

    /// Number of KEY blocks
    pub key_count: u32,

    /// Number of VALUE blocks
    pub value_count: u32,

    /// Number of distinct key texts
    pub distinct_key_count: u32,

    /// Number of QUERY blocks
    pub query_count: u32,

    /// Number of queries with a non-empty answer
    pub answered_query_count: u32,

    /// Number of export rows
    pub row_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count what an extraction found.
    pub fn collect(extraction: &Extraction<'_>) -> Self {
        let graph = extraction.graph();
        let mut stats = Self {
            block_count: graph.len() as u32,
            page_count: graph.page_count(),
            distinct_key_count: extraction.key_values.len() as u32,
            query_count: extraction.query_answers.len() as u32,
            ..Self::default()
        };

        for block in graph.blocks() {
            if block.block_type == BlockType::Word {
                stats.word_count += 1;
            }
            match block.key_value_role() {
                Some(KeyValueRole::Key) => stats.key_count += 1,
                Some(KeyValueRole::Value) => stats.value_count += 1,
                None => {}
            }
        }

        stats.answered_query_count = extraction
            .query_answers
            .iter()
            .filter(|qa| qa.is_answered())
            .count() as u32;
        stats.row_count = stats.block_count + stats.answered_query_count;
        stats
    }

    /// Merge another stats instance into this one.
    ///
    /// Counts are summed; `page_count` keeps the highest page number.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.block_count += other.block_count;
        self.page_count = self.page_count.max(other.page_count);
        self.word_count += other.word_count;
        self.key_count += other.key_count;
        self.value_count += other.value_count;
        self.distinct_key_count += other.distinct_key_count;
        self.query_count += other.query_count;
        self.answered_query_count += other.answered_query_count;
        self.row_count += other.row_count;
    }
}
