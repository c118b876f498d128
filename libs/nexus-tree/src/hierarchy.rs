//! # Hierarchy
//!
//! Serialized view of an HDF5/NeXus file: nested groups, datasets with
//! attributes. The on-disk reader is not part of this crate; files are
//! consumed as a JSON dump with the following shape.
//!
//! ```text
//! { "<group>": { "<child group>": { ... },
//!                "<dataset>": { "value": <number|array|string>,
//!                               "attrs": { "<name>": <number|array|string> } },
//!                "<plain dataset>": <number|array|string>,
//!                "@<group attribute>": ... } }
//! ```
//!
//! Keys starting with `@` are group attributes and are not visited.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// A dataset value or attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Scalar number.
    Number(f64),
    /// One-dimensional numeric array.
    Numbers(Vec<f64>),
    /// String.
    Text(String),
}

impl Value {
    /// Returns the string content, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the numeric array, promoting a scalar to one element.
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Value::Number(n) => Some(vec![*n]),
            Value::Numbers(values) => Some(values.clone()),
            Value::Text(_) => None,
        }
    }
}

/// A dataset with optional attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    /// Field content.
    pub value: Value,
    /// Dataset attributes.
    #[serde(default)]
    pub attrs: BTreeMap<String, Value>,
}

/// A node of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HdfNode {
    /// Dataset written with explicit value and attributes.
    Dataset(Dataset),
    /// Dataset written as a bare value, without attributes.
    Bare(Value),
    /// Group of named children.
    Group(BTreeMap<String, HdfNode>),
}

impl HdfNode {
    /// Returns the dataset value, if this node is a dataset.
    pub fn value(&self) -> Option<&Value> {
        match self {
            HdfNode::Dataset(dataset) => Some(&dataset.value),
            HdfNode::Bare(value) => Some(value),
            HdfNode::Group(_) => None,
        }
    }

    /// Returns the dataset attributes (empty for bare datasets and groups).
    pub fn attrs(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            HdfNode::Dataset(dataset) => Some(&dataset.attrs),
            _ => None,
        }
    }

    /// Returns the children of a group.
    pub fn children(&self) -> Option<&BTreeMap<String, HdfNode>> {
        match self {
            HdfNode::Group(children) => Some(children),
            _ => None,
        }
    }
}

/// A whole file: the children of the root group.
///
/// # Example
///
/// ```rust
/// use nexus_tree::Hierarchy;
///
/// let hierarchy = Hierarchy::from_json_str(r#"{"entry": {"title": "scan"}}"#).unwrap();
/// let mut paths = Vec::new();
/// hierarchy.visit(|path, _| paths.push(path.to_string()));
/// assert_eq!(paths, vec!["/entry", "/entry/title"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hierarchy {
    root: BTreeMap<String, HdfNode>,
}

impl Hierarchy {
    /// Parses a hierarchy from a JSON string.
    pub fn from_json_str(source: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parses a hierarchy from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TreeError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads and parses a hierarchy file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TreeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Children of the root group.
    pub fn root(&self) -> &BTreeMap<String, HdfNode> {
        &self.root
    }

    /// Visits every group and dataset depth-first with its absolute path.
    ///
    /// Children are visited in name order; group attributes are skipped.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &HdfNode),
    {
        let mut stack: Vec<(String, &HdfNode)> = self
            .root
            .iter()
            .rev()
            .filter(|(name, _)| !name.starts_with('@'))
            .map(|(name, node)| (format!("/{name}"), node))
            .collect();

        while let Some((path, node)) = stack.pop() {
            visitor(&path, node);
            if let Some(children) = node.children() {
                for (name, child) in children.iter().rev() {
                    if name.starts_with('@') {
                        continue;
                    }
                    stack.push((format!("{path}/{name}"), child));
                }
            }
        }
    }
}
