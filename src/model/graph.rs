//! Identity-indexed block graph.

use super::{Block, BlockType};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::error::Category;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Read-only index of one job's blocks.
///
/// Blocks stay in their original order; relationships are resolved through
/// the id index, so a dangling id simply looks up as `None`.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: Vec<Block>,
    index: HashMap<String, usize>,
}

impl BlockGraph {
    /// Build a graph from blocks in result order.
    ///
    /// When two blocks share an id the later one wins the lookup; both stay
    /// in [`BlockGraph::blocks`].
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut index = HashMap::with_capacity(blocks.len());
        for (pos, block) in blocks.iter().enumerate() {
            if index.insert(block.id.clone(), pos).is_some() {
                log::warn!("Duplicate block id {}, keeping the later block", block.id);
            }
        }
        Self { blocks, index }
    }

    /// Parse a block array or analysis response(s) from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let pages = parse_pages(json)?;
        Ok(Self::new(pages.into_iter().flatten().collect()))
    }

    /// Parse from any reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    /// Load a JSON file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Look up a block by id.
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.index.get(id).map(|&pos| &self.blocks[pos])
    }

    /// All blocks in original order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks of one type, in original order.
    pub fn of_type<'a>(&'a self, block_type: &'a BlockType) -> impl Iterator<Item = &'a Block> {
        self.blocks.iter().filter(move |b| &b.block_type == block_type)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the graph has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Highest page number referenced by any block.
    pub fn page_count(&self) -> u32 {
        self.blocks.iter().filter_map(|b| b.page).max().unwrap_or(0)
    }

    /// Consume the graph, returning its blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl FromIterator<Block> for BlockGraph {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
struct ResponsePage {
    #[serde(rename = "Blocks")]
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnalysisInput {
    Blocks(Vec<Block>),
    Pages(Vec<ResponsePage>),
    Page(ResponsePage),
}

/// Parse JSON into pages of blocks.
///
/// Accepts a bare block array, a single response object with `Blocks`, or an
/// array of such responses (one per pagination token).
pub(crate) fn parse_pages(json: &str) -> Result<Vec<Vec<Block>>> {
    let input: AnalysisInput = serde_json::from_str(json).map_err(|e| match e.classify() {
        Category::Data => Error::InvalidInput(
            "expected a block array or analysis response objects with \"Blocks\"".to_string(),
        ),
        _ => Error::Json(e),
    })?;

    Ok(match input {
        AnalysisInput::Blocks(blocks) => vec![blocks],
        AnalysisInput::Pages(pages) => pages.into_iter().map(|p| p.blocks).collect(),
        AnalysisInput::Page(page) => vec![page.blocks],
    })
}
