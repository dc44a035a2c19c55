//! Form key-value extraction.

use super::resolve_text;
use crate::model::{Block, BlockGraph, KeyValueRole, RelationshipType};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// VALUE-role blocks indexed by id.
pub type ValueIndex<'g> = HashMap<&'g str, &'g Block>;

/// A KEY_VALUE_SET block tagged with its role.
#[derive(Debug, Clone, Copy)]
pub enum KeyValueSet<'g> {
    /// KEY role
    Key(&'g Block),
    /// VALUE role
    Value(&'g Block),
}

impl<'g> KeyValueSet<'g> {
    /// Classify a block; `None` unless it is a KEY_VALUE_SET with a role.
    pub fn classify(block: &'g Block) -> Option<Self> {
        match block.key_value_role()? {
            KeyValueRole::Key => Some(KeyValueSet::Key(block)),
            KeyValueRole::Value => Some(KeyValueSet::Value(block)),
        }
    }
}

/// Extracted form fields: key text mapped to every value seen for it.
///
/// Keys keep first-seen order. A repeated key appends to its value list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    entries: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl KeyValues {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value for `key`.
    pub fn push(&mut self, key: String, value: String) {
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1.push(value),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value]));
            }
        }
    }

    /// Values recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Keys with their values, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every (key, value) pair, flattened.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of recorded pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for KeyValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Extract key-value pairs from a graph.
///
/// Returns the pairs and the VALUE index used to pair them, so the table
/// serializer can repeat the same lookup.
pub fn extract_kv(graph: &BlockGraph) -> (KeyValues, ValueIndex<'_>) {
    let mut keys = Vec::new();
    let mut values = ValueIndex::new();

    for block in graph.blocks() {
        match KeyValueSet::classify(block) {
            Some(KeyValueSet::Key(key)) => keys.push(key),
            Some(KeyValueSet::Value(value)) => {
                values.insert(value.id.as_str(), value);
            }
            None => {}
        }
    }

    let mut pairs = KeyValues::new();
    for key in keys {
        let key_text = resolve_text(key, graph);
        let value_text = match find_value_block(key, &values) {
            Some(value) => resolve_text(value, graph),
            None => {
                log::debug!("Key block {} has no resolvable value", key.id);
                String::new()
            }
        };
        pairs.push(key_text, value_text);
    }

    log::debug!(
        "Extracted {} key-value pairs ({} distinct keys)",
        pairs.pair_count(),
        pairs.len()
    );
    (pairs, values)
}

/// Find the VALUE block paired with a KEY block.
///
/// Only the first VALUE relationship is consulted; its first id present in
/// `values` wins.
pub fn find_value_block<'g>(key: &Block, values: &ValueIndex<'g>) -> Option<&'g Block> {
    let relationship = key
        .relationships
        .iter()
        .find(|r| r.kind == RelationshipType::Value)?;
    relationship
        .ids
        .iter()
        .find_map(|id| values.get(id.as_str()).copied())
}
