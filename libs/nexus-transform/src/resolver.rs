//! # Operation Chain Resolver
//!
//! Walks `depends_on` edges from a node to the root and returns the ordered
//! list of nodes whose operations make up its pose.
//!
//! ## Algorithm
//!
//! The walk is iterative: nodes are pushed while following `depends_on`
//! until the root sentinel or an already resolved node is reached, then the
//! chains are built back down and memoized per arena index. Descendants share
//! their ancestors' chain prefix through the memo, so every node is walked at
//! most once per resolver.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use nexus_tree::{DependsOn, ElementaryOp, GroupTree};

use crate::error::{TransformError, TransformResult};

// =============================================================================
// CHAIN
// =============================================================================

/// One node of a resolved chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    /// Arena index of the node in its [`GroupTree`].
    pub index: usize,
    /// Absolute path of the node.
    pub path: String,
    /// Operations of the node, applied in order.
    pub ops: Vec<ElementaryOp>,
    /// False if the node lies in an excluded process subtree.
    pub emitted: bool,
}

/// Root-first list of the nodes contributing to a pose.
///
/// Stored as a persistent list: each chain owns its last link and shares its
/// parent chain, so memoized chains of a deep tree stay linear in size.
#[derive(Debug)]
pub struct Chain {
    link: ChainLink,
    parent: Option<Arc<Chain>>,
    len: usize,
}

impl Chain {
    fn new(link: ChainLink, parent: Option<Arc<Chain>>) -> Self {
        let len = parent.as_ref().map_or(0, |p| p.len) + 1;
        Self { link, parent, len }
    }

    /// The node the chain was resolved for.
    pub fn target(&self) -> &ChainLink {
        &self.link
    }

    /// Chain of the node the target depends on.
    pub fn parent(&self) -> Option<&Arc<Chain>> {
        self.parent.as_ref()
    }

    /// Number of links, excluded ones included.
    #[inline]
    pub fn link_count(&self) -> usize {
        self.len
    }

    /// All links, root first.
    pub fn links(&self) -> Vec<&ChainLink> {
        let mut links = Vec::with_capacity(self.len);
        let mut current = Some(self);
        while let Some(chain) = current {
            links.push(&chain.link);
            current = chain.parent.as_deref();
        }
        links.reverse();
        links
    }

    /// Every operation of the chain, root first, excluded links included.
    pub fn ops(&self) -> impl Iterator<Item = &ElementaryOp> {
        self.links().into_iter().flat_map(|link| link.ops.iter())
    }

    /// Links that may appear as nodes of their own, root first.
    pub fn emitted_links(&self) -> impl Iterator<Item = &ChainLink> {
        self.links().into_iter().filter(|link| link.emitted)
    }

    /// Number of emitted links.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = Some(self);
        while let Some(chain) = current {
            depth += usize::from(chain.link.emitted);
            current = chain.parent.as_deref();
        }
        depth
    }

    /// Links before the target, root first.
    pub fn ancestors(&self) -> Vec<&ChainLink> {
        match &self.parent {
            Some(parent) => parent.links(),
            None => Vec::new(),
        }
    }
}

impl Drop for Chain {
    // Unlink iteratively so dropping a deep chain cannot overflow the stack.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(chain) = parent {
            match Arc::try_unwrap(chain) {
                Ok(mut chain) => parent = chain.parent.take(),
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Resolves and memoizes chains over one [`GroupTree`].
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use nexus_transform::ChainResolver;
/// use nexus_tree::{ElementaryOp, GroupNode, GroupTree};
///
/// let mut tree = GroupTree::new();
/// tree.insert(GroupNode::new("/entry/t/a")
///     .with_op(ElementaryOp::translation(DVec3::X, 1.0, "m"))).unwrap();
/// tree.insert(GroupNode::target("/entry/c").depends_on("/entry/t/a")).unwrap();
///
/// let mut resolver = ChainResolver::new(&tree, false);
/// let chain = resolver.resolve("/entry/c").unwrap();
/// assert_eq!(chain.link_count(), 2);
/// assert_eq!(chain.ops().count(), 1);
/// ```
pub struct ChainResolver<'t> {
    tree: &'t GroupTree,
    include_process: bool,
    memo: HashMap<usize, Arc<Chain>>,
}

impl<'t> ChainResolver<'t> {
    /// Creates a resolver. Process nodes are marked as not emitted unless
    /// `include_process` is set.
    pub fn new(tree: &'t GroupTree, include_process: bool) -> Self {
        Self {
            tree,
            include_process,
            memo: HashMap::new(),
        }
    }

    /// The tree chains are resolved against.
    pub fn tree(&self) -> &'t GroupTree {
        self.tree
    }

    /// Resolves the chain of the node at `path`.
    pub fn resolve(&mut self, path: &str) -> TransformResult<Arc<Chain>> {
        let idx = self
            .tree
            .index_of(path)
            .ok_or_else(|| TransformError::UnknownNode {
                path: path.to_string(),
            })?;
        self.resolve_index(idx)
    }

    /// Resolves the chain of the node at an arena index.
    pub fn resolve_index(&mut self, idx: usize) -> TransformResult<Arc<Chain>> {
        if let Some(chain) = self.memo.get(&idx) {
            return Ok(Arc::clone(chain));
        }

        let mut pending = Vec::new();
        let mut visited = HashSet::new();
        let mut base: Option<Arc<Chain>> = None;
        let mut current = Some(idx);

        while let Some(i) = current {
            if let Some(chain) = self.memo.get(&i) {
                base = Some(Arc::clone(chain));
                break;
            }
            let node = self.tree.node(i);
            if !visited.insert(i) {
                return Err(TransformError::CyclicDependency {
                    path: node.path.clone(),
                });
            }
            pending.push(i);

            current = match &node.depends_on {
                DependsOn::Root => None,
                DependsOn::Path(target) => Some(self.tree.index_of(target).ok_or_else(|| {
                    TransformError::DanglingReference {
                        path: node.path.clone(),
                        target: target.clone(),
                    }
                })?),
            };
        }

        let mut chain = base;
        for i in pending.into_iter().rev() {
            let next = Arc::new(Chain::new(self.link(i), chain.take()));
            self.memo.insert(i, Arc::clone(&next));
            chain = Some(next);
        }
        chain.ok_or_else(|| TransformError::UnknownNode {
            path: self.tree.node(idx).path.clone(),
        })
    }

    fn link(&self, idx: usize) -> ChainLink {
        let node = self.tree.node(idx);
        ChainLink {
            index: idx,
            path: node.path.clone(),
            ops: node.ops.clone(),
            emitted: self.include_process || !node.in_process,
        }
    }

    /// Number of memoized chains.
    pub fn cached(&self) -> usize {
        self.memo.len()
    }
}
