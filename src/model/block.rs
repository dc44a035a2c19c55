//! Block-level types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One recognized document element from an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Identifier, unique within one analysis job
    pub id: String,

    /// Kind of element
    pub block_type: BlockType,

    /// Recognized text (words and query results only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Recognition confidence (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Page number (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Location on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    /// Typed links to other blocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,

    /// Entity types (KEY / VALUE for key-value sets)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,

    /// Check state of a selection element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_status: Option<SelectionStatus>,

    /// The question asked, on QUERY blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,

    /// Row of a table cell (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,

    /// Column of a table cell (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,

    /// PRINTED or HANDWRITING
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,
}

impl Block {
    /// Create a block with no content or relationships.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            text: None,
            confidence: None,
            page: None,
            geometry: None,
            relationships: Vec::new(),
            entity_types: Vec::new(),
            selection_status: None,
            query: None,
            row_index: None,
            column_index: None,
            text_type: None,
        }
    }

    /// Create a WORD block.
    pub fn word(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Word).with_text(text)
    }

    /// Create a SELECTION_ELEMENT block.
    pub fn selection(id: impl Into<String>, selected: bool) -> Self {
        let status = if selected {
            SelectionStatus::Selected
        } else {
            SelectionStatus::NotSelected
        };
        Self {
            selection_status: Some(status),
            ..Self::new(id, BlockType::SelectionElement)
        }
    }

    /// Create a KEY_VALUE_SET block with the KEY role.
    pub fn key(id: impl Into<String>) -> Self {
        Self {
            entity_types: vec![EntityType::Key],
            ..Self::new(id, BlockType::KeyValueSet)
        }
    }

    /// Create a KEY_VALUE_SET block with the VALUE role.
    pub fn value(id: impl Into<String>) -> Self {
        Self {
            entity_types: vec![EntityType::Value],
            ..Self::new(id, BlockType::KeyValueSet)
        }
    }

    /// Create a QUERY block asking `question`.
    pub fn query(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            query: Some(Query::new(question)),
            ..Self::new(id, BlockType::Query)
        }
    }

    /// Create a QUERY_RESULT block carrying its answer text.
    pub fn query_result(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::QueryResult).with_text(text)
    }

    /// Set text and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set page and return self.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set confidence and return self.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set bounding box and return self.
    pub fn with_bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.geometry = Some(Geometry {
            bounding_box: Some(bbox),
            polygon: Vec::new(),
        });
        self
    }

    /// Append a relationship and return self.
    pub fn with_relationship<S: Into<String>>(
        mut self,
        kind: RelationshipType,
        ids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.relationships.push(Relationship::new(kind, ids));
        self
    }

    /// Append a CHILD relationship and return self.
    pub fn with_children<S: Into<String>>(self, ids: impl IntoIterator<Item = S>) -> Self {
        self.with_relationship(RelationshipType::Child, ids)
    }

    /// Text stored on this block, or "" when absent.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Question text of a QUERY block, or "" when absent.
    pub fn query_text(&self) -> &str {
        self.query.as_ref().map(|q| q.text.as_str()).unwrap_or("")
    }

    /// Whether this is a checked selection element.
    pub fn is_selected(&self) -> bool {
        self.selection_status == Some(SelectionStatus::Selected)
    }

    /// Role of a KEY_VALUE_SET block; `None` for any other block.
    pub fn key_value_role(&self) -> Option<KeyValueRole> {
        if self.block_type != BlockType::KeyValueSet {
            return None;
        }
        if self.entity_types.contains(&EntityType::Key) {
            Some(KeyValueRole::Key)
        } else if self.entity_types.contains(&EntityType::Value) {
            Some(KeyValueRole::Value)
        } else {
            None
        }
    }

    /// Target ids of every relationship of `kind`, in declaration order.
    pub fn related_ids<'a>(&'a self, kind: &'a RelationshipType) -> impl Iterator<Item = &'a str> {
        self.relationships
            .iter()
            .filter(move |r| &r.kind == kind)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    /// Bounding box, if the block has geometry.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.geometry.as_ref()?.bounding_box.as_ref()
    }
}

/// Kind of a block.
///
/// Unrecognized kinds are kept verbatim in [`BlockType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    /// A page
    Page,
    /// A line of words
    Line,
    /// A single recognized word
    Word,
    /// Form field key or value
    KeyValueSet,
    /// A table
    Table,
    /// A table cell
    Cell,
    /// A merged table cell
    MergedCell,
    /// Checkbox or radio button
    SelectionElement,
    /// A question asked of the document
    Query,
    /// An answer to a query
    QueryResult,
    /// A signature
    Signature,
    /// Any other kind
    Other(String),
}

impl BlockType {
    /// Wire name of this block type.
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Page => "PAGE",
            BlockType::Line => "LINE",
            BlockType::Word => "WORD",
            BlockType::KeyValueSet => "KEY_VALUE_SET",
            BlockType::Table => "TABLE",
            BlockType::Cell => "CELL",
            BlockType::MergedCell => "MERGED_CELL",
            BlockType::SelectionElement => "SELECTION_ELEMENT",
            BlockType::Query => "QUERY",
            BlockType::QueryResult => "QUERY_RESULT",
            BlockType::Signature => "SIGNATURE",
            BlockType::Other(name) => name,
        }
    }
}

impl From<&str> for BlockType {
    fn from(s: &str) -> Self {
        match s {
            "PAGE" => BlockType::Page,
            "LINE" => BlockType::Line,
            "WORD" => BlockType::Word,
            "KEY_VALUE_SET" => BlockType::KeyValueSet,
            "TABLE" => BlockType::Table,
            "CELL" => BlockType::Cell,
            "MERGED_CELL" => BlockType::MergedCell,
            "SELECTION_ELEMENT" => BlockType::SelectionElement,
            "QUERY" => BlockType::Query,
            "QUERY_RESULT" => BlockType::QueryResult,
            "SIGNATURE" => BlockType::Signature,
            other => BlockType::Other(other.to_string()),
        }
    }
}

impl From<String> for BlockType {
    fn from(s: String) -> Self {
        BlockType::from(s.as_str())
    }
}

impl From<BlockType> for String {
    fn from(t: BlockType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a KEY_VALUE_SET block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyValueRole {
    /// The label side of a form field
    Key,
    /// The filled-in side of a form field
    Value,
}

/// Entity type tag on a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    /// KEY
    Key,
    /// VALUE
    Value,
    /// COLUMN_HEADER
    ColumnHeader,
    /// Any other tag
    Other(String),
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "KEY" => EntityType::Key,
            "VALUE" => EntityType::Value,
            "COLUMN_HEADER" => EntityType::ColumnHeader,
            _ => EntityType::Other(s),
        }
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        match t {
            EntityType::Key => "KEY".to_string(),
            EntityType::Value => "VALUE".to_string(),
            EntityType::ColumnHeader => "COLUMN_HEADER".to_string(),
            EntityType::Other(name) => name,
        }
    }
}

/// Check state of a selection element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    /// Checked
    Selected,
    /// Unchecked
    NotSelected,
}

/// A typed link from one block to others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    /// Relationship kind
    #[serde(rename = "Type")]
    pub kind: RelationshipType,

    /// Target block ids, in order
    #[serde(default)]
    pub ids: Vec<String>,
}

impl Relationship {
    /// Create a relationship to `ids`.
    pub fn new<S: Into<String>>(kind: RelationshipType, ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Kind of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Contained elements (words, selection elements, cells)
    Child,
    /// Key to value link
    Value,
    /// Query to result link
    Answer,
    /// Any other kind
    Other(String),
}

impl From<String> for RelationshipType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CHILD" => RelationshipType::Child,
            "VALUE" => RelationshipType::Value,
            "ANSWER" => RelationshipType::Answer,
            _ => RelationshipType::Other(s),
        }
    }
}

impl From<RelationshipType> for String {
    fn from(t: RelationshipType) -> Self {
        match t {
            RelationshipType::Child => "CHILD".to_string(),
            RelationshipType::Value => "VALUE".to_string(),
            RelationshipType::Answer => "ANSWER".to_string(),
            RelationshipType::Other(name) => name,
        }
    }
}

/// Location of a block on its page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    /// Axis-aligned bounding box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    /// Outline points
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polygon: Vec<Point>,
}

/// Bounding box as ratios of page width and height.
///
/// Each coordinate is optional so partially populated geometry survives.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    /// Left edge
    #[serde(default)]
    pub left: Option<f64>,
    /// Top edge
    #[serde(default)]
    pub top: Option<f64>,
    /// Width
    #[serde(default)]
    pub width: Option<f64>,
    /// Height
    #[serde(default)]
    pub height: Option<f64>,
}

impl BoundingBox {
    /// Create a fully populated bounding box.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
        }
    }
}

/// A polygon vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal ratio
    #[serde(rename = "X")]
    pub x: f64,
    /// Vertical ratio
    #[serde(rename = "Y")]
    pub y: f64,
}

/// A question asked of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Query {
    /// The question
    #[serde(default)]
    pub text: String,

    /// Caller-chosen alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Pages the query applies to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<String>,
}

impl Query {
    /// Create a query over all pages.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alias: None,
            pages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_word() {
        let json = r#"{
            "BlockType": "WORD",
            "Id": "w1",
            "Text": "Acme",
            "Confidence": 99.5,
            "Page": 2,
            "Geometry": {"BoundingBox": {"Left": 0.1, "Top": 0.2, "Width": 0.3, "Height": 0.04}}
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();

        assert_eq!(block.block_type, BlockType::Word);
        assert_eq!(block.text_or_empty(), "Acme");
        assert_eq!(block.page, Some(2));
        assert_eq!(block.bounding_box().unwrap().width, Some(0.3));
    }

    #[test]
    fn test_deserialize_minimal_block() {
        let block: Block = serde_json::from_str(r#"{"Id": "x", "BlockType": "LINE"}"#).unwrap();
        assert!(block.relationships.is_empty());
        assert!(block.geometry.is_none());
        assert_eq!(block.text_or_empty(), "");
    }

    #[test]
    fn test_unknown_block_type_preserved() {
        let block: Block =
            serde_json::from_str(r#"{"Id": "x", "BlockType": "LAYOUT_TEXT"}"#).unwrap();
        assert_eq!(block.block_type, BlockType::Other("LAYOUT_TEXT".to_string()));
        assert_eq!(block.block_type.to_string(), "LAYOUT_TEXT");

        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"LAYOUT_TEXT\""));
    }

    #[test]
    fn test_key_value_role() {
        assert_eq!(Block::key("k").key_value_role(), Some(KeyValueRole::Key));
        assert_eq!(Block::value("v").key_value_role(), Some(KeyValueRole::Value));
        assert_eq!(Block::word("w", "x").key_value_role(), None);

        let bare = Block::new("b", BlockType::KeyValueSet);
        assert_eq!(bare.key_value_role(), None);
    }

    #[test]
    fn test_related_ids_spans_entries() {
        let block = Block::new("l", BlockType::Line)
            .with_children(["a", "b"])
            .with_relationship(RelationshipType::Value, ["v"])
            .with_children(["c"]);

        let ids: Vec<_> = block.related_ids(&RelationshipType::Child).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_selection_status() {
        let block: Block = serde_json::from_str(
            r#"{"Id": "s", "BlockType": "SELECTION_ELEMENT", "SelectionStatus": "NOT_SELECTED"}"#,
        )
        .unwrap();
        assert!(!block.is_selected());
        assert!(Block::selection("s2", true).is_selected());
    }
}
