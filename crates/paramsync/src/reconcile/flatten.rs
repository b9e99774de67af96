//! Flattens a nested document into leaf entries addressed by key paths.

use serde::Serialize;

use crate::document::{Number, StructuredValue};

/// Position of a leaf in the source document, one segment per level.
pub type KeyPath = Vec<String>;

/// A leaf value, tagged once at flattening time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum LeafValue {
    Text(String),
    Number(#[serde(serialize_with = "serialize_number")] Number),
    /// A sequence of scalars, each already rendered as a string.
    List(Vec<String>),
    Bool(bool),
    Null,
}

fn serialize_number<S: serde::Serializer>(n: &Number, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&n.to_string())
}

impl LeafValue {
    /// String form compared against the remote value.
    pub fn comparable(&self) -> String {
        match self {
            LeafValue::Text(s) => s.clone(),
            LeafValue::Number(n) => n.to_string(),
            LeafValue::List(items) => items.join(","),
            LeafValue::Bool(b) => b.to_string(),
            LeafValue::Null => "null".to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LeafValue::Text(_) => "string",
            LeafValue::Number(_) => "number",
            LeafValue::List(_) => "list",
            LeafValue::Bool(_) => "boolean",
            LeafValue::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry {
    pub path: KeyPath,
    pub value: LeafValue,
}

/// Flattens `value` depth first, in document order.
///
/// With `keep_sequences_as_leaves`, a sequence of scalars becomes a single
/// [`LeafValue::List`]. Sequences holding mappings or nested sequences, and
/// every sequence when the flag is off, are expanded by element index.
pub fn flatten(value: &StructuredValue, keep_sequences_as_leaves: bool) -> Vec<FlatEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<(KeyPath, &StructuredValue)> = vec![(Vec::new(), value)];

    while let Some((path, node)) = stack.pop() {
        match node {
            StructuredValue::Mapping(children) => {
                // Reversed so children pop in document order.
                for (key, child) in children.iter().rev() {
                    stack.push((child_path(&path, key.clone()), child));
                }
            }
            StructuredValue::Sequence(items)
                if keep_sequences_as_leaves && items.iter().all(StructuredValue::is_scalar) =>
            {
                entries.push(FlatEntry {
                    path,
                    value: LeafValue::List(items.iter().map(list_element).collect()),
                });
            }
            StructuredValue::Sequence(items) => {
                for (index, item) in items.iter().enumerate().rev() {
                    stack.push((child_path(&path, index.to_string()), item));
                }
            }
            scalar => entries.push(FlatEntry {
                path,
                value: scalar_leaf(scalar),
            }),
        }
    }

    entries
}

fn child_path(parent: &[String], segment: String) -> KeyPath {
    let mut path = Vec::with_capacity(parent.len() + 1);
    path.extend_from_slice(parent);
    path.push(segment);
    path
}

fn scalar_leaf(value: &StructuredValue) -> LeafValue {
    match value {
        StructuredValue::String(s) => LeafValue::Text(s.clone()),
        StructuredValue::Number(n) => LeafValue::Number(*n),
        StructuredValue::Bool(b) => LeafValue::Bool(*b),
        _ => LeafValue::Null,
    }
}

fn list_element(value: &StructuredValue) -> String {
    match value {
        StructuredValue::String(s) => s.clone(),
        StructuredValue::Number(n) => n.to_string(),
        StructuredValue::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
