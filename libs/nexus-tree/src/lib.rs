//! # NeXus Tree
//!
//! Presents the transformation groups of a NeXus file as a read-only tree.
//!
//! ## Architecture
//!
//! ```text
//! JSON dump → Hierarchy (groups + datasets) → GroupTree (path index)
//! ```
//!
//! Every `NXtransformations` dataset becomes a [`GroupNode`] holding one
//! [`ElementaryOp`]. Every group carrying a `depends_on` field becomes a
//! target node with no operations of its own. Dependency edges are stored as
//! resolved absolute paths and looked up through the index, never as owning
//! pointers.
//!
//! ## Example
//!
//! ```rust
//! use nexus_tree::GroupTree;
//!
//! let json = r#"{
//!     "entry": {
//!         "sample": {
//!             "depends_on": "transformations/x",
//!             "transformations": {
//!                 "x": {
//!                     "value": 5.0,
//!                     "attrs": {
//!                         "transformation_type": "translation",
//!                         "vector": [1, 0, 0],
//!                         "units": "mm",
//!                         "depends_on": "."
//!                     }
//!                 }
//!             }
//!         }
//!     }
//! }"#;
//!
//! let tree = GroupTree::from_json_str(json, "process").unwrap();
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.targets().count(), 1);
//! ```

pub mod error;
pub mod hierarchy;
pub mod op;
pub mod path;
pub mod tree;

mod from_hierarchy;

pub use error::TreeError;
pub use hierarchy::{Dataset, HdfNode, Hierarchy, Value};
pub use op::{ElementaryOp, OpKind};
pub use tree::{DependsOn, GroupNode, GroupTree};
