//! Block model for document-analysis results.
//!
//! An analysis result is a flat list of blocks linked by typed relationships.
//! [`BlockGraph`] indexes those blocks by id so extractors can follow links
//! without embedded pointers.

mod block;
mod graph;

pub use block::{
    Block, BlockType, BoundingBox, EntityType, Geometry, KeyValueRole, Point, Query, Relationship,
    RelationshipType, SelectionStatus,
};
pub use graph::BlockGraph;

pub(crate) use graph::parse_pages;
