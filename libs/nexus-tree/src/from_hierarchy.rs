//! # Hierarchy to GroupTree
//!
//! Extracts `NXtransformations` datasets and `depends_on` components from a
//! [`Hierarchy`] and links them into a [`GroupTree`].
//!
//! Reference forms accepted in `depends_on`:
//! - `.` ends the chain
//! - `/entry/...` is absolute
//! - anything else is relative to the group containing the referencing
//!   dataset (for components: the component group itself); a relative path
//!   containing `/` that does not exist there is retried from the file root

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use config::constants::{
    DEPENDS_ON, OFFSET, OFFSET_UNITS, ROOT_SENTINEL, TRANSFORMATION_TYPE, UNITS, VECTOR,
};
use glam::DVec3;
use tracing::debug;

use crate::error::TreeError;
use crate::hierarchy::{HdfNode, Hierarchy, Value};
use crate::op::{ElementaryOp, OpKind};
use crate::path;
use crate::tree::{DependsOn, GroupNode, GroupTree};

/// A node read from the hierarchy whose reference is not linked yet.
struct Pending {
    path: String,
    op: Option<ElementaryOp>,
    reference: String,
    base: String,
    is_target: bool,
}

impl GroupTree {
    /// Builds a tree from a parsed hierarchy.
    ///
    /// Nodes below `/<entry>/<process_group>` are flagged as process nodes.
    pub fn from_hierarchy(hierarchy: &Hierarchy, process_group: &str) -> Result<Self, TreeError> {
        let mut pending = Vec::new();
        let mut failure = None;

        hierarchy.visit(|node_path, node| {
            if failure.is_some() {
                return;
            }
            match read_node(node_path, node) {
                Ok(Some(entry)) => pending.push(entry),
                Ok(None) => {}
                Err(err) => failure = Some(err),
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }

        let known: HashSet<&str> = pending.iter().map(|p| p.path.as_str()).collect();
        let links: Vec<DependsOn> = pending
            .iter()
            .map(|p| link(&p.reference, &p.base, &known))
            .collect();

        let mut tree = GroupTree::with_process_group(process_group);
        for (entry, depends_on) in pending.into_iter().zip(links) {
            let mut node = GroupNode::new(&entry.path);
            node.ops.extend(entry.op);
            node.depends_on = depends_on;
            node.is_target = entry.is_target;
            tree.insert(node)?;
        }

        debug!(
            nodes = tree.len(),
            targets = tree.targets().count(),
            "built group tree"
        );
        Ok(tree)
    }

    /// Parses a JSON hierarchy and builds a tree from it.
    pub fn from_json_str(source: &str, process_group: &str) -> Result<Self, TreeError> {
        Self::from_hierarchy(&Hierarchy::from_json_str(source)?, process_group)
    }

    /// Reads a JSON hierarchy file and builds a tree from it.
    pub fn from_path(path: impl AsRef<Path>, process_group: &str) -> Result<Self, TreeError> {
        Self::from_hierarchy(&Hierarchy::from_path(path)?, process_group)
    }
}

// =============================================================================
// NODE READING
// =============================================================================

fn read_node(node_path: &str, node: &HdfNode) -> Result<Option<Pending>, TreeError> {
    match node {
        HdfNode::Group(children) => Ok(read_component(node_path, children)),
        HdfNode::Dataset(dataset) if dataset.attrs.contains_key(TRANSFORMATION_TYPE) => {
            read_transformation(node_path, &dataset.value, &dataset.attrs).map(Some)
        }
        _ => Ok(None),
    }
}

/// A group with a `depends_on` text field is a component.
fn read_component(group_path: &str, children: &BTreeMap<String, HdfNode>) -> Option<Pending> {
    let reference = children.get(DEPENDS_ON)?.value()?.as_text()?;
    Some(Pending {
        path: group_path.to_string(),
        op: None,
        reference: reference.to_string(),
        base: group_path.to_string(),
        is_target: true,
    })
}

fn read_transformation(
    node_path: &str,
    value: &Value,
    attrs: &BTreeMap<String, Value>,
) -> Result<Pending, TreeError> {
    let kind_text = text_attr(node_path, attrs, TRANSFORMATION_TYPE)?;
    let kind: OpKind = kind_text
        .parse()
        .map_err(|kind| TreeError::UnknownTransformationType {
            path: node_path.to_string(),
            kind,
        })?;

    let reference = text_attr(node_path, attrs, DEPENDS_ON)?.to_string();
    let axis = vector_attr(node_path, attrs, VECTOR)?
        .ok_or_else(|| TreeError::missing(node_path, VECTOR))?;

    let unit = match attrs.get(UNITS) {
        Some(unit) => unit
            .as_text()
            .ok_or_else(|| TreeError::invalid(node_path, "`units` must be a string"))?
            .to_string(),
        None => kind.default_unit().to_string(),
    };

    let magnitude = first_value(node_path, value)?;
    let mut op = ElementaryOp::new(kind, axis, magnitude, unit);

    if let Some(offset) = vector_attr(node_path, attrs, OFFSET)? {
        let offset_unit = match attrs.get(OFFSET_UNITS) {
            Some(unit) => unit
                .as_text()
                .ok_or_else(|| TreeError::invalid(node_path, "`offset_units` must be a string"))?,
            None => OpKind::Translation.default_unit(),
        };
        op = op.with_offset(offset, offset_unit);
    }

    Ok(Pending {
        path: node_path.to_string(),
        op: Some(op),
        reference,
        base: path::parent(node_path).to_string(),
        is_target: false,
    })
}

fn text_attr<'a>(
    node_path: &str,
    attrs: &'a BTreeMap<String, Value>,
    name: &str,
) -> Result<&'a str, TreeError> {
    attrs
        .get(name)
        .ok_or_else(|| TreeError::missing(node_path, name))?
        .as_text()
        .ok_or_else(|| TreeError::invalid(node_path, format!("`{name}` must be a string")))
}

fn vector_attr(
    node_path: &str,
    attrs: &BTreeMap<String, Value>,
    name: &str,
) -> Result<Option<DVec3>, TreeError> {
    let Some(value) = attrs.get(name) else {
        return Ok(None);
    };
    match value.as_numbers().as_deref() {
        Some(&[x, y, z]) => Ok(Some(DVec3::new(x, y, z))),
        _ => Err(TreeError::invalid(
            node_path,
            format!("`{name}` must hold exactly three numbers"),
        )),
    }
}

/// Scan fields hold one magnitude per point; the first point is used.
fn first_value(node_path: &str, value: &Value) -> Result<f64, TreeError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Numbers(values) => {
            if values.len() > 1 {
                debug!(path = node_path, points = values.len(), "using first scan point");
            }
            values
                .first()
                .copied()
                .ok_or_else(|| TreeError::invalid(node_path, "empty transformation field"))
        }
        Value::Text(text) => text.trim().parse().map_err(|_| {
            TreeError::invalid(node_path, format!("non-numeric transformation field `{text}`"))
        }),
    }
}

// =============================================================================
// LINKING
// =============================================================================

fn link(reference: &str, base: &str, known: &HashSet<&str>) -> DependsOn {
    let reference = reference.trim();
    if reference == ROOT_SENTINEL {
        return DependsOn::Root;
    }
    if reference.starts_with('/') {
        return DependsOn::Path(path::normalize(reference));
    }

    let relative = path::join(base, reference);
    if !known.contains(relative.as_str()) && reference.contains('/') {
        let from_root = path::normalize(reference);
        if known.contains(from_root.as_str()) {
            return DependsOn::Path(from_root);
        }
    }
    DependsOn::Path(relative)
}
