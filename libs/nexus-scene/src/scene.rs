//! # Scene Graph
//!
//! Turns a [`PlacementPlan`] into the node tree handed to the exporters.
//!
//! ## Layouts
//!
//! ```text
//! retention off             retention on
//!
//! root                      root
//! ├── sample   (world)      └── instrument/manipulator/transformations/rot_x
//! ├── detector (world)          └── ...   (parent-relative)
//! └── ...                           └── sample
//! ```
//!
//! Every node owns its geometry; nothing is instanced.

use std::collections::HashMap;

use config::constants::SCENE_ROOT_NAME;
use glam::DMat4;
use tracing::debug;

use crate::placement::{Geometry, PlacementPlan};

// =============================================================================
// NODES
// =============================================================================

/// A node of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Display name.
    pub name: String,
    /// Absolute node path, `None` for the synthetic root.
    pub path: Option<String>,
    /// Transform relative to the parent node.
    pub transform: DMat4,
    /// Geometry placed at this node.
    pub geometry: Option<Geometry>,
    /// Child nodes in plan order.
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            transform: DMat4::IDENTITY,
            geometry: None,
            children: Vec::new(),
        }
    }
}

// Chains can nest thousands of levels deep; unlink children iteratively.
impl Drop for SceneNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// An assembled scene below one synthetic root.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    root: SceneNode,
}

impl Scene {
    /// The synthetic root node.
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _, depth| {
            if depth > 0 {
                count += 1;
            }
        });
        count
    }

    /// Visits every node depth-first with its world transform and depth.
    ///
    /// The root is visited first at depth 0.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nexus_scene::{PlacementPlan, SceneBuilder};
    ///
    /// let scene = SceneBuilder::new().build(PlacementPlan::default());
    /// let mut visited = 0;
    /// scene.walk(|_, _, _| visited += 1);
    /// assert_eq!(visited, 1);
    /// ```
    pub fn walk<F>(&self, mut visitor: F)
    where
        F: FnMut(&SceneNode, DMat4, usize),
    {
        let mut stack = vec![(&self.root, DMat4::IDENTITY, 0usize)];
        while let Some((node, parent_world, depth)) = stack.pop() {
            let world = parent_world * node.transform;
            visitor(node, world, depth);
            for child in node.children.iter().rev() {
                stack.push((child, world, depth + 1));
            }
        }
    }

    /// Finds a node by display name or absolute path, with its world transform.
    pub fn find(&self, name: &str) -> Option<(&SceneNode, DMat4)> {
        let mut stack = vec![(&self.root, DMat4::IDENTITY)];
        while let Some((node, parent_world)) = stack.pop() {
            let world = parent_world * node.transform;
            if node.path.is_some() && (node.name == name || node.path.as_deref() == Some(name)) {
                return Some((node, world));
            }
            for child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        None
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Assembles a [`Scene`] from a placement plan.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    root_name: String,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self {
            root_name: SCENE_ROOT_NAME.to_string(),
        }
    }
}

impl SceneBuilder {
    /// Creates a builder with the default root name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the synthetic root node.
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Builds the scene, nesting nodes by dependency when the plan retains
    /// intermediate nodes.
    pub fn build(&self, plan: PlacementPlan) -> Scene {
        let mut root = SceneNode::group(&self.root_name);
        let nested = plan.retain_intermediate;

        let worlds: Vec<DMat4> = plan.placements.iter().map(|p| p.world()).collect();
        let index: HashMap<&str, usize> = plan
            .placements
            .iter()
            .enumerate()
            .map(|(i, p)| (p.path.as_str(), i))
            .collect();
        let parents: Vec<Option<usize>> = plan
            .placements
            .iter()
            .map(|p| {
                p.parent
                    .as_deref()
                    .filter(|_| nested)
                    .and_then(|parent| index.get(parent).copied())
            })
            .collect();
        drop(index);

        let mut nodes: Vec<Option<SceneNode>> = plan
            .placements
            .into_iter()
            .enumerate()
            .map(|(i, placement)| {
                let transform = match parents[i] {
                    Some(parent) => worlds[parent].inverse() * worlds[i],
                    None => worlds[i],
                };
                Some(SceneNode {
                    name: placement.name,
                    path: Some(placement.path),
                    transform,
                    geometry: placement.geometry,
                    children: Vec::new(),
                })
            })
            .collect();

        // Parents precede children, so walking backwards finishes every
        // subtree before it is attached.
        for i in (0..nodes.len()).rev() {
            let Some(mut node) = nodes[i].take() else {
                continue;
            };
            node.children.reverse();
            match parents[i].and_then(|parent| nodes[parent].as_mut()) {
                Some(parent) => parent.children.push(node),
                None => root.children.push(node),
            }
        }
        root.children.reverse();

        let scene = Scene { root };
        debug!(
            nodes = scene.node_count(),
            top_level = scene.root.children.len(),
            nested,
            "built scene"
        );
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Placement;
    use crate::primitives::{create_cube, Shape};
    use glam::DVec3;

    fn placement(path: &str, world: DMat4, parent: Option<&str>, is_target: bool) -> Placement {
        Placement {
            path: path.to_string(),
            name: nexus_tree::path::display_name(path).to_string(),
            pose: world,
            offset: DMat4::IDENTITY,
            geometry: is_target.then(|| Geometry::Primitive {
                shape: Shape::Cube,
                mesh: create_cube(0.1).unwrap(),
            }),
            parent: parent.map(str::to_string),
            is_target,
        }
    }

    fn plan(retain_intermediate: bool) -> PlacementPlan {
        let base = DMat4::from_translation(DVec3::X);
        let arm = base * DMat4::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let tip = arm * DMat4::from_translation(DVec3::Y);
        PlacementPlan {
            placements: vec![
                placement("/entry/t/base", base, None, false),
                placement("/entry/t/arm", arm, Some("/entry/t/base"), false),
                placement("/entry/a", tip, Some("/entry/t/arm"), true),
                placement("/entry/b", base, Some("/entry/t/base"), true),
            ],
            issues: Vec::new(),
            retain_intermediate,
        }
    }

    #[test]
    fn test_flat_scene_uses_world_transforms() {
        let scene = SceneBuilder::new().build(plan(false));
        assert_eq!(scene.root().name, SCENE_ROOT_NAME);
        assert_eq!(scene.root().children.len(), 4);
        assert_eq!(scene.node_count(), 4);

        let a = &scene.root().children[2];
        assert_eq!(a.name, "a");
        assert!(a.transform.abs_diff_eq(plan(false).placements[2].world(), 1e-12));
    }

    #[test]
    fn test_nested_scene_preserves_world_transforms() {
        let expected = plan(true);
        let scene = SceneBuilder::new().build(plan(true));

        assert_eq!(scene.root().children.len(), 1);
        assert_eq!(scene.node_count(), 4);

        let base = &scene.root().children[0];
        let names: Vec<_> = base.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["t/arm", "b"]);
        assert_eq!(base.children[0].children[0].name, "a");

        for p in &expected.placements {
            let (_, world) = scene.find(&p.path).unwrap();
            assert!(world.abs_diff_eq(p.world(), 1e-12), "{}", p.path);
        }
    }

    #[test]
    fn test_nested_local_transform_is_relative() {
        let scene = SceneBuilder::new().build(plan(true));
        let (a, _) = scene.find("a").unwrap();
        assert!(a
            .transform
            .abs_diff_eq(DMat4::from_translation(DVec3::Y), 1e-12));
    }

    #[test]
    fn test_walk_order_and_depth() {
        let scene = SceneBuilder::new().build(plan(true));
        let mut visited = Vec::new();
        scene.walk(|node, _, depth| visited.push((node.name.clone(), depth)));
        let expected = [("root", 0), ("t/base", 1), ("t/arm", 2), ("a", 3), ("b", 2)];
        let expected: Vec<_> = expected.iter().map(|(n, d)| (n.to_string(), *d)).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_missing_parent_attaches_to_root() {
        let mut plan = plan(true);
        plan.placements.remove(0);
        let scene = SceneBuilder::new().build(plan);
        let names: Vec<_> = scene
            .root()
            .children
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["t/arm", "b"]);
    }

    #[test]
    fn test_custom_root_name() {
        let scene = SceneBuilder::new()
            .with_root_name("experiment")
            .build(PlacementPlan::default());
        assert_eq!(scene.root().name, "experiment");
        assert_eq!(scene.node_count(), 0);
        assert!(scene.find("experiment").is_none());
    }

    #[test]
    fn test_deep_nesting() {
        let mut placements = Vec::new();
        let mut parent: Option<String> = None;
        for i in 0..10_000 {
            let path = format!("/entry/t/n{i}");
            let world = DMat4::from_translation(DVec3::X * f64::from(i));
            placements.push(placement(&path, world, parent.as_deref(), false));
            parent = Some(path);
        }
        let scene = SceneBuilder::new().build(PlacementPlan {
            placements,
            issues: Vec::new(),
            retain_intermediate: true,
        });
        assert_eq!(scene.node_count(), 10_000);
        let (_, world) = scene.find("t/n9999").unwrap();
        assert!(world.abs_diff_eq(DMat4::from_translation(DVec3::X * 9999.0), 1e-9));
    }
}
