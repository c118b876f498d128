//! # Group Tree
//!
//! Arena of [`GroupNode`]s indexed by path. Dependency edges are stored as
//! absolute paths and resolved through the index on demand, so the structure
//! never owns a cycle even when the file describes one.

use std::collections::HashMap;

use config::constants::{DEFAULT_PROCESS_GROUP, ROOT_SENTINEL};

use crate::error::TreeError;
use crate::op::ElementaryOp;
use crate::path;

// =============================================================================
// DEPENDS ON
// =============================================================================

/// Target of a `depends_on` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependsOn {
    /// The chain ends here (`.` in the file).
    Root,
    /// Absolute path of the node this one depends on.
    Path(String),
}

impl DependsOn {
    /// Builds a reference from an absolute or sentinel string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nexus_tree::DependsOn;
    ///
    /// assert_eq!(DependsOn::from_absolute("."), DependsOn::Root);
    /// assert_eq!(
    ///     DependsOn::from_absolute("entry/a"),
    ///     DependsOn::Path("/entry/a".to_string())
    /// );
    /// ```
    pub fn from_absolute(raw: &str) -> Self {
        if raw.trim() == ROOT_SENTINEL {
            DependsOn::Root
        } else {
            DependsOn::Path(path::normalize(raw.trim()))
        }
    }

    /// Returns the referenced path, if any.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            DependsOn::Root => None,
            DependsOn::Path(p) => Some(p),
        }
    }
}

// =============================================================================
// GROUP NODE
// =============================================================================

/// A named node of the transformation tree.
///
/// Immutable once inserted into a [`GroupTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    /// Absolute normalized path.
    pub path: String,
    /// Operations of this node, applied in order.
    pub ops: Vec<ElementaryOp>,
    /// Next node towards the root.
    pub depends_on: DependsOn,
    /// True if the node lies in the process subtree.
    pub in_process: bool,
    /// True if the node is a component to be placed (not just a chain step).
    pub is_target: bool,
}

impl GroupNode {
    /// Creates a chain step without operations, depending on the root.
    pub fn new(path: &str) -> Self {
        Self {
            path: path::normalize(path),
            ops: Vec::new(),
            depends_on: DependsOn::Root,
            in_process: false,
            is_target: false,
        }
    }

    /// Creates a component node to be placed in the scene.
    pub fn target(path: &str) -> Self {
        Self {
            is_target: true,
            ..Self::new(path)
        }
    }

    /// Appends an operation.
    pub fn with_op(mut self, op: ElementaryOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Sets the node this one depends on (absolute path or `.`).
    pub fn depends_on(mut self, reference: &str) -> Self {
        self.depends_on = DependsOn::from_absolute(reference);
        self
    }

    /// Name of the node without its entry group.
    pub fn display_name(&self) -> &str {
        path::display_name(&self.path)
    }
}

// =============================================================================
// GROUP TREE
// =============================================================================

/// Read-only index of every transformation node of a file.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use nexus_tree::{ElementaryOp, GroupNode, GroupTree};
///
/// let mut tree = GroupTree::new();
/// tree.insert(
///     GroupNode::new("/entry/a")
///         .with_op(ElementaryOp::translation(DVec3::X, 1.0, "m")),
/// ).unwrap();
/// tree.insert(GroupNode::target("/entry/b").depends_on("/entry/a")).unwrap();
///
/// assert_eq!(tree.len(), 2);
/// assert!(tree.get("entry/b").unwrap().is_target);
/// ```
#[derive(Debug, Clone)]
pub struct GroupTree {
    nodes: Vec<GroupNode>,
    index: HashMap<String, usize>,
    process_group: String,
}

impl Default for GroupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTree {
    /// Creates an empty tree using the default process group name.
    pub fn new() -> Self {
        Self::with_process_group(DEFAULT_PROCESS_GROUP)
    }

    /// Creates an empty tree flagging nodes below `/<entry>/<process_group>`.
    pub fn with_process_group(process_group: &str) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            process_group: process_group.to_string(),
        }
    }

    /// Inserts a node and returns its arena index.
    ///
    /// The process flag is derived from the node path.
    pub fn insert(&mut self, mut node: GroupNode) -> Result<usize, TreeError> {
        node.path = path::normalize(&node.path);
        if self.index.contains_key(&node.path) {
            return Err(TreeError::DuplicatePath { path: node.path });
        }
        node.in_process = path::is_in_group(&node.path, &self.process_group);

        let idx = self.nodes.len();
        self.index.insert(node.path.clone(), idx);
        self.nodes.push(node);
        Ok(idx)
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name of the process group used for the `in_process` flag.
    pub fn process_group(&self) -> &str {
        &self.process_group
    }

    /// Looks up a node by path (normalized before lookup).
    pub fn get(&self, path: &str) -> Option<&GroupNode> {
        self.index_of(path).map(|idx| &self.nodes[idx])
    }

    /// Looks up the arena index of a path.
    pub fn index_of(&self, path: &str) -> Option<usize> {
        match self.index.get(path) {
            Some(idx) => Some(*idx),
            None => self.index.get(&path::normalize(path)).copied(),
        }
    }

    /// Returns the node at an arena index.
    ///
    /// # Panics
    ///
    /// Panics if `idx` was not returned by this tree.
    #[inline]
    pub fn node(&self, idx: usize) -> &GroupNode {
        &self.nodes[idx]
    }

    /// Returns true if a node exists at the path.
    pub fn contains(&self, path: &str) -> bool {
        self.index_of(path).is_some()
    }

    /// Iterates over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupNode> {
        self.nodes.iter()
    }

    /// Iterates over component nodes in insertion order.
    pub fn targets(&self) -> impl Iterator<Item = &GroupNode> {
        self.nodes.iter().filter(|node| node.is_target)
    }

    /// Finds a node by path or by display name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nexus_tree::{GroupNode, GroupTree};
    ///
    /// let mut tree = GroupTree::new();
    /// tree.insert(GroupNode::target("/entry/sample")).unwrap();
    /// assert!(tree.find("sample").is_some());
    /// assert!(tree.find("/entry/sample").is_some());
    /// ```
    pub fn find(&self, name: &str) -> Option<&GroupNode> {
        if name.starts_with('/') {
            return self.get(name);
        }
        self.nodes
            .iter()
            .find(|node| node.display_name() == name)
            .or_else(|| self.get(name))
    }
}
