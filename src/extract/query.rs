//! Query-answer extraction.

use super::resolve_text;
use crate::model::{BlockGraph, BlockType, RelationshipType};
use serde::{Deserialize, Serialize};

/// A question asked of the document and the answer found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    /// The question text
    pub question: String,

    /// The answer text ("" when the service found none)
    pub answer: String,

    /// Alias given to the query when it was submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl QueryAnswer {
    /// Create a query answer without alias.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            alias: None,
        }
    }

    /// Whether an answer was found.
    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }
}

/// Extract one answer per QUERY block, in block order.
///
/// The first ANSWER target that exists and is a QUERY_RESULT wins.
pub fn extract_queries(graph: &BlockGraph) -> Vec<QueryAnswer> {
    graph
        .of_type(&BlockType::Query)
        .map(|block| {
            let answer = block
                .related_ids(&RelationshipType::Answer)
                .filter_map(|id| graph.get(id))
                .find(|b| b.block_type == BlockType::QueryResult)
                .map(|result| resolve_text(result, graph).trim().to_string())
                .unwrap_or_default();

            QueryAnswer {
                question: block.query_text().to_string(),
                answer,
                alias: block.query.as_ref().and_then(|q| q.alias.clone()),
            }
        })
        .collect()
}
