//! # Config Crate
//!
//! Centralized constants and run-wide options for the nexus3d pipeline.
//! Every tunable value used by more than one crate lives here so the
//! transform, scene and export layers agree on defaults.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_SHAPE_SIZE, ROOT_SENTINEL};
//! use config::RunConfig;
//!
//! let run = RunConfig::default();
//! assert_eq!(run.shape_size, DEFAULT_SHAPE_SIZE);
//! assert_eq!(ROOT_SENTINEL, ".");
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Explicit Threading**: Run options are passed as values, never stored
//!   in process-wide state
//! - **NeXus Conventions**: Defaults follow the NXtransformations base class
//!   (`.` as chain terminator, `/entry/process` as the processing subtree)

pub mod constants;
pub mod run;

pub use run::{ConfigError, RunConfig};
