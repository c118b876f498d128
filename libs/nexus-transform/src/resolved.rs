//! # Tree Resolution
//!
//! Resolves every emitted target of a [`GroupTree`] into a world pose.
//!
//! Chains are resolved sequentially against one memo so that structural
//! errors surface deterministically; composition then runs in parallel over
//! the read-only chains.

use std::sync::Arc;

use config::RunConfig;
use glam::DMat4;
use nexus_tree::{path, GroupTree};
use rayon::prelude::*;
use tracing::{debug, error};

use crate::axis::AxisConvention;
use crate::composer::Composer;
use crate::error::{TransformError, TransformResult};
use crate::resolver::{Chain, ChainResolver};
use crate::units::UnitConverter;

/// Pose of one emitted chain node.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    /// Absolute node path.
    pub path: String,
    /// World pose with axis corrections applied.
    pub pose: DMat4,
}

/// A component with its resolved pose.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Absolute node path.
    pub path: String,
    /// World pose with axis corrections applied.
    pub pose: DMat4,
    /// Emitted ancestors with their poses, root first.
    pub intermediates: Vec<ResolvedLink>,
    /// Chain the pose was composed from.
    pub chain: Arc<Chain>,
}

impl ResolvedTarget {
    /// Name of the target without its entry group.
    pub fn name(&self) -> &str {
        path::display_name(&self.path)
    }
}

/// A target whose chain could not be composed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainFailure {
    /// Path of the dropped target.
    pub target: String,
    /// Why the chain failed.
    pub error: TransformError,
}

/// Outcome of resolving a whole tree.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTree {
    /// Resolved targets, sorted by path.
    pub targets: Vec<ResolvedTarget>,
    /// Targets dropped because of per-chain errors, sorted by path.
    pub failures: Vec<ChainFailure>,
    /// Axis convention the poses were computed with.
    pub convention: AxisConvention,
}

impl ResolvedTree {
    /// Number of resolved targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if no target was resolved.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Looks up a target by absolute path or display name.
    pub fn find(&self, name: &str) -> Option<&ResolvedTarget> {
        if name.starts_with('/') {
            let name = path::normalize(name);
            return self.targets.iter().find(|t| t.path == name);
        }
        self.targets.iter().find(|t| t.name() == name)
    }
}

/// Resolves every emitted target of `tree`.
///
/// Cycles and dangling references abort with an error. Unit and axis
/// problems drop only the affected targets into [`ResolvedTree::failures`].
///
/// # Example
///
/// ```rust
/// use config::RunConfig;
/// use glam::DVec3;
/// use nexus_transform::{resolve_tree, UnitTable};
/// use nexus_tree::{ElementaryOp, GroupNode, GroupTree};
///
/// let mut tree = GroupTree::new();
/// tree.insert(GroupNode::new("/entry/t/x")
///     .with_op(ElementaryOp::translation(DVec3::X, 2.0, "m"))).unwrap();
/// tree.insert(GroupNode::target("/entry/sample").depends_on("/entry/t/x")).unwrap();
///
/// let resolved = resolve_tree(&tree, &RunConfig::default(), &UnitTable).unwrap();
/// let sample = resolved.find("sample").unwrap();
/// assert_eq!(sample.pose.w_axis.x, 2.0);
/// ```
pub fn resolve_tree(
    tree: &GroupTree,
    run: &RunConfig,
    units: &dyn UnitConverter,
) -> TransformResult<ResolvedTree> {
    let convention = AxisConvention::from_run(run);
    let composer = Composer::new(units).with_handedness(convention.handedness);

    let mut resolver = ChainResolver::new(tree, run.include_process);
    let mut chains = Vec::new();
    for node in tree.targets() {
        if node.in_process && !run.include_process {
            debug!(path = %node.path, "skipping process component");
            continue;
        }
        let chain = resolver.resolve(&node.path)?;
        debug!(path = %node.path, links = chain.link_count(), "resolved chain");
        chains.push(chain);
    }
    chains.sort_by(|a, b| a.target().path.cmp(&b.target().path));

    let outcomes: Vec<Result<ResolvedTarget, ChainFailure>> = chains
        .into_par_iter()
        .map(|chain| compose_target(&composer, &convention, chain))
        .collect();

    let mut resolved = ResolvedTree {
        convention,
        ..ResolvedTree::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(target) => resolved.targets.push(target),
            Err(failure) => {
                error!(component = %failure.target, error = %failure.error, "dropping component");
                resolved.failures.push(failure);
            }
        }
    }
    Ok(resolved)
}

fn compose_target(
    composer: &Composer<'_>,
    convention: &AxisConvention,
    chain: Arc<Chain>,
) -> Result<ResolvedTarget, ChainFailure> {
    let path = chain.target().path.clone();
    let poses = composer
        .compose_cumulative(&chain)
        .map_err(|error| ChainFailure {
            target: path.clone(),
            error,
        })?;

    let links = chain.links();
    let intermediates = links
        .iter()
        .zip(&poses)
        .take(links.len().saturating_sub(1))
        .filter(|(link, _)| link.emitted)
        .map(|(link, pose)| ResolvedLink {
            path: link.path.clone(),
            pose: convention.apply(*pose),
        })
        .collect();
    let pose = convention.apply(poses.last().copied().unwrap_or(DMat4::IDENTITY));

    Ok(ResolvedTarget {
        path,
        pose,
        intermediates,
        chain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitTable;
    use glam::DVec3;
    use nexus_tree::{ElementaryOp, GroupNode};

    fn tree() -> GroupTree {
        let mut tree = GroupTree::new();
        tree.insert(
            GroupNode::new("/entry/t/x").with_op(ElementaryOp::translation(DVec3::X, 1.0, "m")),
        )
        .unwrap();
        tree.insert(GroupNode::target("/entry/a").depends_on("/entry/t/x"))
            .unwrap();
        tree.insert(
            GroupNode::new("/entry/t/bad")
                .with_op(ElementaryOp::rotation(DVec3::ZERO, 1.0, "deg"))
                .depends_on("/entry/t/x"),
        )
        .unwrap();
        tree.insert(GroupNode::target("/entry/b").depends_on("/entry/t/bad"))
            .unwrap();
        tree.insert(GroupNode::target("/entry/process/p").depends_on("/entry/t/x"))
            .unwrap();
        tree
    }

    #[test]
    fn test_degenerate_chain_is_isolated() {
        let resolved = resolve_tree(&tree(), &RunConfig::default(), &UnitTable).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.targets[0].path, "/entry/a");
        assert_eq!(resolved.failures.len(), 1);
        assert_eq!(resolved.failures[0].target, "/entry/b");
        assert!(matches!(
            resolved.failures[0].error,
            TransformError::DegenerateAxis { .. }
        ));
    }

    #[test]
    fn test_process_targets_opt_in() {
        let run = RunConfig {
            include_process: true,
            ..RunConfig::default()
        };
        let resolved = resolve_tree(&tree(), &run, &UnitTable).unwrap();
        assert!(resolved.find("process/p").is_some());
        assert!(resolve_tree(&tree(), &RunConfig::default(), &UnitTable)
            .unwrap()
            .find("process/p")
            .is_none());
    }

    #[test]
    fn test_intermediates_exclude_target() {
        let resolved = resolve_tree(&tree(), &RunConfig::default(), &UnitTable).unwrap();
        let a = resolved.find("/entry/a").unwrap();
        assert_eq!(a.intermediates.len(), 1);
        assert_eq!(a.intermediates[0].path, "/entry/t/x");
        assert_eq!(a.intermediates[0].pose, a.pose);
    }

    #[test]
    fn test_cycle_aborts() {
        let mut tree = GroupTree::new();
        tree.insert(
            GroupNode::new("/entry/t/x")
                .with_op(ElementaryOp::translation(DVec3::X, 1.0, "m"))
                .depends_on("/entry/t/y"),
        )
        .unwrap();
        tree.insert(
            GroupNode::new("/entry/t/y")
                .with_op(ElementaryOp::translation(DVec3::Y, 1.0, "m"))
                .depends_on("/entry/t/x"),
        )
        .unwrap();
        tree.insert(GroupNode::target("/entry/a").depends_on("/entry/t/x"))
            .unwrap();

        let err = resolve_tree(&tree, &RunConfig::default(), &UnitTable).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_viewer_remap_applied_once() {
        let plain = resolve_tree(&tree(), &RunConfig::default(), &UnitTable).unwrap();
        let run = RunConfig {
            viewer_remap: true,
            ..RunConfig::default()
        };
        let remapped = resolve_tree(&tree(), &run, &UnitTable).unwrap();

        let expected = AxisConvention::remap_matrix() * plain.find("a").unwrap().pose;
        let a = remapped.find("a").unwrap();
        assert!(a.pose.abs_diff_eq(expected, 1e-12));
        assert!(a.intermediates[0].pose.abs_diff_eq(expected, 1e-12));
    }
}
