//! # NeXus Scene
//!
//! Places geometry at resolved NeXus poses and assembles the scene graph
//! consumed by the exporters.
//!
//! ## Architecture
//!
//! ```text
//! ResolvedTree (nexus-transform)
//!       ↓
//! PlacementPlanner (primitives, config overrides, mesh loading)
//!       ↓
//! PlacementPlan
//!       ↓
//! SceneBuilder (flat or nested by dependency)
//!       ↓
//! Scene → nexus-export
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use config::RunConfig;
//! use glam::DVec3;
//! use nexus_scene::{InMemoryMeshLoader, PlacementPlanner, SceneBuilder};
//! use nexus_transform::{resolve_tree, UnitTable};
//! use nexus_tree::{ElementaryOp, GroupNode, GroupTree};
//!
//! let mut tree = GroupTree::new();
//! tree.insert(GroupNode::new("/entry/t/x")
//!     .with_op(ElementaryOp::translation(DVec3::X, 1.0, "m"))).unwrap();
//! tree.insert(GroupNode::target("/entry/sample").depends_on("/entry/t/x")).unwrap();
//!
//! let run = RunConfig::default();
//! let resolved = resolve_tree(&tree, &run, &UnitTable).unwrap();
//! let loader = InMemoryMeshLoader::default();
//! let plan = PlacementPlanner::new(&run, &loader, &UnitTable).plan(&resolved).unwrap();
//! let scene = SceneBuilder::new().build(plan);
//! assert_eq!(scene.root().children.len(), 1);
//! ```

pub mod error;
pub mod loader;
pub mod mesh;
pub mod placement;
pub mod primitives;
pub mod scene;

pub use error::{SceneError, SceneResult};
pub use loader::{InMemoryMeshLoader, MeshLoader, StlLoader};
pub use mesh::Mesh;
pub use placement::{
    Geometry, Placement, PlacementConfig, PlacementPlan, PlacementPlanner, PlacementSpec,
};
pub use primitives::Shape;
pub use scene::{Scene, SceneBuilder, SceneNode};
