//! Semantic views over a block graph.
//!
//! Text is spread across child WORD and SELECTION_ELEMENT blocks, so every
//! extractor goes through [`resolve_text`] to read it back.

mod kv;
mod query;
mod text;

pub use kv::{extract_kv, find_value_block, KeyValueSet, KeyValues, ValueIndex};
pub use query::{extract_queries, QueryAnswer};
pub use text::{resolve_text, SELECTED_MARK};

use crate::model::BlockGraph;
use crate::render::{serialize, ExtractionStats, OutputRow};

/// Key values and query answers extracted from one graph.
#[derive(Debug, Clone)]
pub struct Extraction<'g> {
    graph: &'g BlockGraph,

    /// Key text mapped to its values
    pub key_values: KeyValues,

    /// VALUE blocks by id, shared with the table serializer
    pub value_index: ValueIndex<'g>,

    /// One entry per QUERY block
    pub query_answers: Vec<QueryAnswer>,
}

impl<'g> Extraction<'g> {
    /// Run both extractors over `graph`.
    pub fn from_graph(graph: &'g BlockGraph) -> Self {
        let (key_values, value_index) = extract_kv(graph);
        let query_answers = extract_queries(graph);
        Self {
            graph,
            key_values,
            value_index,
            query_answers,
        }
    }

    /// The graph this extraction was built from.
    pub fn graph(&self) -> &'g BlockGraph {
        self.graph
    }

    /// Flatten into export rows.
    pub fn rows(&self) -> Vec<OutputRow> {
        serialize(
            self.graph.blocks(),
            &self.value_index,
            &self.query_answers,
            self.graph,
        )
    }

    /// Summary counts for this extraction.
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats::collect(self)
    }
}
