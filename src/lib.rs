//! # untract
//!
//! Rebuild form fields, query answers and flat tables from the block graphs
//! produced by asynchronous document-analysis services.
//!
//! An analysis result is a flat list of blocks (pages, lines, words,
//! key-value sets, queries) linked by typed relationships. This library
//! indexes those blocks, reconstructs readable text, pairs keys with values
//! and questions with answers, and flattens everything into a fixed
//! 12-column table ready for CSV export.
//!
//! ## Quick Start
//!
//! ```no_run
//! use untract::{load_file, render, Extraction};
//!
//! fn main() -> untract::Result<()> {
//!     // Load a recorded analysis result
//!     let graph = load_file("analysis.json")?;
//!
//!     // Extract key values and query answers
//!     let extraction = Extraction::from_graph(&graph);
//!     for (key, values) in extraction.key_values.iter() {
//!         println!("{}: {:?}", key, values);
//!     }
//!
//!     // Flatten to CSV
//!     let csv = render::to_csv(&extraction.rows(), &render::RenderOptions::default());
//!     std::fs::write("output.csv", csv)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Dangling-safe graph**: missing references resolve to empty text
//! - **Duplicate keys preserved**: repeated form labels keep every value
//! - **Fixed export schema**: one row per block, then answered queries
//! - **Bounded job polling**: exponential backoff with a hard timeout
//! - **Parallel batches**: independent documents are exported with Rayon

pub mod error;
pub mod extract;
pub mod job;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{
    extract_kv, extract_queries, resolve_text, Extraction, KeyValues, QueryAnswer, ValueIndex,
};
pub use job::{
    AnalysisProvider, AnalysisRequest, AnalysisResponse, JobStatus, MetadataProvider, OutputSink,
    Pipeline, PipelineConfig, PollOptions,
};
pub use model::{
    Block, BlockGraph, BlockType, BoundingBox, KeyValueRole, Relationship, RelationshipType,
    SelectionStatus,
};
pub use render::{
    ExportResult, ExtractionStats, JsonFormat, LineTerminator, OutputRow, RenderOptions, COLUMNS,
};

use rayon::prelude::*;
use std::path::Path;

/// Load a block graph from a JSON file.
///
/// The file may hold a bare block array, a single analysis response, or an
/// array of paginated responses.
///
/// # Example
///
/// ```no_run
/// use untract::load_file;
///
/// let graph = load_file("analysis.json").unwrap();
/// println!("Blocks: {}", graph.len());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<BlockGraph> {
    BlockGraph::open(path)
}

/// Extract key-value pairs from an analysis file.
pub fn extract_key_values<P: AsRef<Path>>(path: P) -> Result<KeyValues> {
    let graph = load_file(path)?;
    Ok(extract_kv(&graph).0)
}

/// Extract query answers from an analysis file.
pub fn extract_query_answers<P: AsRef<Path>>(path: P) -> Result<Vec<QueryAnswer>> {
    let graph = load_file(path)?;
    Ok(extract_queries(&graph))
}

/// Convert an analysis file to CSV with default options.
///
/// # Example
///
/// ```no_run
/// use untract::to_csv;
///
/// let csv = to_csv("analysis.json").unwrap();
/// std::fs::write("output.csv", csv).unwrap();
/// ```
pub fn to_csv<P: AsRef<Path>>(path: P) -> Result<String> {
    let graph = load_file(path)?;
    let extraction = Extraction::from_graph(&graph);
    Ok(render::to_csv(&extraction.rows(), &RenderOptions::default()))
}

/// Convert an analysis file to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let graph = load_file(path)?;
    render::to_json(&Extraction::from_graph(&graph), format)
}

/// Export several independent documents to CSV in parallel.
///
/// Results keep the order of `graphs`.
pub fn export_batch(graphs: &[BlockGraph], options: &RenderOptions) -> Vec<ExportResult> {
    graphs
        .par_iter()
        .map(|graph| export_csv(graph, options))
        .collect()
}

fn export_csv(graph: &BlockGraph, options: &RenderOptions) -> ExportResult {
    let extraction = Extraction::from_graph(graph);
    let content = render::to_csv(&extraction.rows(), options);
    ExportResult::new(content, extraction.stats(), render::CSV_MIME_TYPE)
}

/// Builder for loading and exporting analysis results.
///
/// # Example
///
/// ```no_run
/// use untract::Untract;
///
/// let csv = Untract::new()
///     .with_bom(false)
///     .open("analysis.json")?
///     .to_csv();
/// # Ok::<(), untract::Error>(())
/// ```
pub struct Untract {
    render_options: RenderOptions,
}

impl Untract {
    /// Create a new Untract builder.
    pub fn new() -> Self {
        Self {
            render_options: RenderOptions::default(),
        }
    }

    /// Enable or disable the byte-order mark.
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.render_options = self.render_options.with_bom(bom);
        self
    }

    /// Enable or disable the CSV header row.
    pub fn with_header(mut self, include: bool) -> Self {
        self.render_options = self.render_options.with_header(include);
        self
    }

    /// Set the CSV line terminator.
    pub fn with_line_terminator(mut self, terminator: LineTerminator) -> Self {
        self.render_options = self.render_options.with_line_terminator(terminator);
        self
    }

    /// Replace all render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Load an analysis file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<UntractResult> {
        Ok(self.finish(BlockGraph::open(path)?))
    }

    /// Parse analysis JSON.
    pub fn parse_json(self, json: &str) -> Result<UntractResult> {
        Ok(self.finish(BlockGraph::from_json(json)?))
    }

    /// Wrap already-fetched blocks.
    pub fn load_blocks(self, blocks: Vec<Block>) -> UntractResult {
        self.finish(BlockGraph::new(blocks))
    }

    fn finish(self, graph: BlockGraph) -> UntractResult {
        UntractResult {
            graph,
            render_options: self.render_options,
        }
    }
}

impl Default for Untract {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded analysis result.
pub struct UntractResult {
    graph: BlockGraph,
    render_options: RenderOptions,
}

impl UntractResult {
    /// The block graph.
    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    /// Run both extractors.
    pub fn extraction(&self) -> Extraction<'_> {
        Extraction::from_graph(&self.graph)
    }

    /// Export rows.
    pub fn rows(&self) -> Vec<OutputRow> {
        self.extraction().rows()
    }

    /// Convert to CSV.
    pub fn to_csv(&self) -> String {
        render::to_csv(&self.rows(), &self.render_options)
    }

    /// Convert to CSV, with statistics.
    pub fn export_csv(&self) -> ExportResult {
        export_csv(&self.graph, &self.render_options)
    }

    /// Convert key values and query answers to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.extraction(), format)
    }

    /// Extracted key values.
    pub fn key_values(&self) -> KeyValues {
        self.extraction().key_values
    }

    /// Extracted query answers.
    pub fn query_answers(&self) -> Vec<QueryAnswer> {
        extract_queries(&self.graph)
    }

    /// Extraction statistics.
    pub fn stats(&self) -> ExtractionStats {
        self.extraction().stats()
    }
}
