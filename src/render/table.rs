//! Flat row-per-element table.

use crate::extract::{find_value_block, resolve_text, QueryAnswer, ValueIndex};
use crate::model::{Block, BlockGraph, BoundingBox, KeyValueRole};
use serde::{Deserialize, Serialize};

/// Column names of the export, in order.
pub const COLUMNS: [&str; 12] = [
    "Page",
    "BlockType",
    "Text",
    "Confidence",
    "BoundingBox_Left",
    "BoundingBox_Top",
    "BoundingBox_Width",
    "BoundingBox_Height",
    "ExtractedKey",
    "ExtractedValue",
    "QueryQuestion",
    "QueryAnswer",
];

/// One row of the export table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRow {
    /// A block from the analysis result
    Element(ElementRow),

    /// An answered query
    Query {
        /// Question text
        question: String,
        /// Answer text
        answer: String,
    },
}

/// Export fields of one block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRow {
    /// Page number
    pub page: Option<u32>,

    /// Block type name
    pub block_type: String,

    /// Raw text with commas stripped
    pub text: String,

    /// Recognition confidence
    pub confidence: Option<f64>,

    /// Bounding box, if the block had geometry
    pub bounding_box: Option<BoundingBox>,

    /// Resolved key text (KEY blocks only)
    pub extracted_key: String,

    /// Resolved value text (KEY blocks with a paired value only)
    pub extracted_value: String,
}

impl OutputRow {
    /// Cell values in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 12] {
        match self {
            OutputRow::Element(row) => {
                let bbox = row.bounding_box.unwrap_or_default();
                [
                    row.page.map(|p| p.to_string()).unwrap_or_default(),
                    row.block_type.clone(),
                    row.text.clone(),
                    format_number(row.confidence),
                    format_number(bbox.left),
                    format_number(bbox.top),
                    format_number(bbox.width),
                    format_number(bbox.height),
                    row.extracted_key.clone(),
                    row.extracted_value.clone(),
                    String::new(),
                    String::new(),
                ]
            }
            OutputRow::Query { question, answer } => {
                let mut cells: [String; 12] = Default::default();
                cells[10] = question.clone();
                cells[11] = answer.clone();
                cells
            }
        }
    }

    /// Whether this row came from a query answer.
    pub fn is_query(&self) -> bool {
        matches!(self, OutputRow::Query { .. })
    }
}

/// Flatten blocks and query answers into export rows.
///
/// Every block yields one element row, in order. KEY blocks also carry their
/// resolved key and paired value. Answered queries follow; unanswered ones
/// produce no row.
pub fn serialize(
    blocks: &[Block],
    values: &ValueIndex<'_>,
    query_answers: &[QueryAnswer],
    graph: &BlockGraph,
) -> Vec<OutputRow> {
    let mut rows = Vec::with_capacity(blocks.len() + query_answers.len());

    for block in blocks {
        let mut row = ElementRow {
            page: block.page,
            block_type: block.block_type.to_string(),
            text: strip_commas(block.text_or_empty()),
            confidence: block.confidence,
            bounding_box: block.bounding_box().copied(),
            ..Default::default()
        };

        if block.key_value_role() == Some(KeyValueRole::Key) {
            row.extracted_key = strip_commas(&resolve_text(block, graph));
            if let Some(value) = find_value_block(block, values) {
                row.extracted_value = strip_commas(&resolve_text(value, graph));
            }
        }

        rows.push(OutputRow::Element(row));
    }

    rows.extend(
        query_answers
            .iter()
            .filter(|qa| qa.is_answered())
            .map(|qa| OutputRow::Query {
                question: qa.question.clone(),
                answer: qa.answer.clone(),
            }),
    );

    rows
}

/// Remove every comma.
pub fn strip_commas(text: &str) -> String {
    text.replace(',', "")
}

/// Format an optional number as shortest round-trip text.
///
/// Absent values are blank; whole numbers keep one decimal place, and
/// magnitudes below 1e-4 or from 1e16 up switch to exponent form
/// (`5e-05`, `1e+20`).
fn format_number(value: Option<f64>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", v);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if v != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    } else if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extraction;
    use crate::model::{BlockType, RelationshipType};

    fn rows_for(blocks: Vec<Block>) -> Vec<OutputRow> {
        let graph = BlockGraph::new(blocks);
        Extraction::from_graph(&graph).rows()
    }

    #[test]
    fn test_every_block_becomes_a_row() {
        let rows = rows_for(vec![
            Block::new("p", BlockType::Page).with_page(1),
            Block::new("l", BlockType::Line).with_page(1),
            Block::word("w", "hi").with_page(1),
        ]);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| !r.is_query()));
        assert_eq!(rows[2].cells()[1], "WORD");
    }

    #[test]
    fn test_element_row_cells() {
        let rows = rows_for(vec![Block::word("w", "1,000")
            .with_page(2)
            .with_confidence(98.25)
            .with_bounding_box(BoundingBox::new(0.5, 0.25, 1.0, 0.125))]);

        let cells = rows[0].cells();
        assert_eq!(cells[0], "2");
        assert_eq!(cells[2], "1000");
        assert_eq!(cells[3], "98.25");
        assert_eq!(&cells[4..8], &["0.5", "0.25", "1.0", "0.125"]);
        assert!(cells[8..].iter().all(String::is_empty));
    }

    #[test]
    fn test_missing_geometry_is_blank() {
        let rows = rows_for(vec![Block::new("x", BlockType::Table)]);
        let cells = rows[0].cells();
        assert_eq!(cells[0], "");
        assert_eq!(cells[3], "");
        assert!(cells[4..8].iter().all(String::is_empty));
    }

    #[test]
    fn test_key_row_carries_pair() {
        let rows = rows_for(vec![
            Block::key("k")
                .with_children(["kw"])
                .with_relationship(RelationshipType::Value, ["v"]),
            Block::value("v").with_children(["vw"]),
            Block::word("kw", "Amount,"),
            Block::word("vw", "1,200"),
        ]);

        let key_cells = rows[0].cells();
        assert_eq!(key_cells[8], "Amount");
        assert_eq!(key_cells[9], "1200");

        // The VALUE block's own row carries no extracted pair.
        let value_cells = rows[1].cells();
        assert_eq!(value_cells[8], "");
        assert_eq!(value_cells[9], "");
    }

    #[test]
    fn test_query_rows_follow_elements() {
        let rows = rows_for(vec![
            Block::query("q1", "Name?").with_relationship(RelationshipType::Answer, ["r"]),
            Block::query("q2", "Unanswered?"),
            Block::query_result("r", "Kim"),
        ]);

        assert_eq!(rows.len(), 4);
        assert!(rows[3].is_query());
        let cells = rows[3].cells();
        assert_eq!(cells[10], "Name?");
        assert_eq!(cells[11], "Kim");
        assert!(cells[..10].iter().all(String::is_empty));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(None), "");
        assert_eq!(format_number(Some(0.0)), "0.0");
        assert_eq!(format_number(Some(100.0)), "100.0");
        assert_eq!(format_number(Some(99.87654)), "99.87654");
        assert_eq!(format_number(Some(0.0001)), "0.0001");
        assert_eq!(format_number(Some(1e15)), "1000000000000000.0");
    }

    #[test]
    fn test_format_number_exponent_form() {
        assert_eq!(format_number(Some(0.00005)), "5e-05");
        assert_eq!(format_number(Some(1e-7)), "1e-07");
        assert_eq!(format_number(Some(1.25e-5)), "1.25e-05");
        assert_eq!(format_number(Some(1e16)), "1e+16");
        assert_eq!(format_number(Some(1e20)), "1e+20");
        assert_eq!(format_number(Some(-2.5e-10)), "-2.5e-10");
        assert_eq!(format_number(Some(1e100)), "1e+100");
    }

    #[test]
    fn test_strip_commas() {
        assert_eq!(strip_commas("a,b,,c"), "abc");
        assert_eq!(strip_commas("none"), "none");
    }
}
