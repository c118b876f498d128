//! # NeXus Transform
//!
//! Resolves `depends_on` chains of a [`GroupTree`](nexus_tree::GroupTree)
//! into absolute 4x4 poses.
//!
//! ## Architecture
//!
//! ```text
//! GroupTree → ChainResolver (memoized chains)
//!           → Composer (units, handedness)
//!           → AxisConvention (viewer remap)
//!           → ResolvedTree
//! ```
//!
//! ## Example
//!
//! ```rust
//! use config::RunConfig;
//! use glam::DVec3;
//! use nexus_transform::{resolve_tree, UnitTable};
//! use nexus_tree::{ElementaryOp, GroupNode, GroupTree};
//!
//! let mut tree = GroupTree::new();
//! tree.insert(GroupNode::new("/entry/t/rz")
//!     .with_op(ElementaryOp::rotation(DVec3::Z, 90.0, "deg"))).unwrap();
//! tree.insert(GroupNode::target("/entry/detector").depends_on("/entry/t/rz")).unwrap();
//!
//! let resolved = resolve_tree(&tree, &RunConfig::default(), &UnitTable).unwrap();
//! let x = resolved.find("detector").unwrap().pose.transform_vector3(DVec3::X);
//! assert!(x.abs_diff_eq(DVec3::Y, 1e-12));
//! ```

pub mod axis;
pub mod composer;
pub mod error;
pub mod frames;
pub mod resolved;
pub mod resolver;
pub mod units;

pub use axis::AxisConvention;
pub use composer::{Composer, Handedness};
pub use error::{TransformError, TransformResult};
pub use frames::{angle_between, CoordinateSystem};
pub use resolved::{resolve_tree, ChainFailure, ResolvedLink, ResolvedTarget, ResolvedTree};
pub use resolver::{Chain, ChainLink, ChainResolver};
pub use units::{Dimension, UnitConverter, UnitError, UnitTable};
