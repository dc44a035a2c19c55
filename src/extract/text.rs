//! Text reconstruction from child blocks.

use crate::model::{Block, BlockGraph, BlockType, RelationshipType};

/// Token emitted for a checked selection element.
pub const SELECTED_MARK: &str = "X";

/// Resolve the readable text a block stands for.
///
/// QUERY_RESULT blocks carry their own text. Every other block is read from
/// its CHILD words in order, with checked selection elements contributing
/// [`SELECTED_MARK`]. Dangling child ids and other child kinds add nothing.
pub fn resolve_text(block: &Block, graph: &BlockGraph) -> String {
    if block.block_type == BlockType::QueryResult {
        return block.text_or_empty().to_string();
    }

    let mut text = String::new();
    for id in block.related_ids(&RelationshipType::Child) {
        let Some(child) = graph.get(id) else {
            log::debug!("Block {} references missing child {}", block.id, id);
            continue;
        };
        match child.block_type {
            BlockType::Word => {
                text.push_str(child.text_or_empty());
                text.push(' ');
            }
            BlockType::SelectionElement if child.is_selected() => {
                text.push_str(SELECTED_MARK);
                text.push(' ');
            }
            _ => {}
        }
    }

    text.trim().to_string()
}
