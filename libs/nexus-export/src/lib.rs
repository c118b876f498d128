//! # NeXus Export
//!
//! Serializers for assembled scenes. The format is chosen from the
//! destination extension.
//!
//! ```text
//! Scene ──┬─> .stl   (flattened, world space)
//!         ├─> .gltf  (hierarchy + sibling .bin)
//!         └─> .glb   (hierarchy, single file)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nexus_export::{export_scene, GltfOptions};
//! use nexus_scene::{PlacementPlan, SceneBuilder};
//!
//! let scene = SceneBuilder::new().build(PlacementPlan::default());
//! export_scene(&scene, "experiment.glb".as_ref(), &GltfOptions::default())?;
//! # Ok::<(), nexus_export::ExportError>(())
//! ```

pub mod error;
pub mod format;
pub mod gltf_writer;
pub mod stl;

use std::path::Path;

use nexus_scene::Scene;
use tracing::{info, warn};

pub use error::{ExportError, ExportResult};
pub use format::OutputFormat;
pub use gltf_writer::{build_document, to_glb_bytes, GltfDocument, GltfOptions};
pub use stl::to_stl_bytes;

/// Writes `scene` to `path` in the format named by its extension.
///
/// Existing files are overwritten. Returns the format that was written.
pub fn export_scene(scene: &Scene, path: &Path, options: &GltfOptions) -> ExportResult<OutputFormat> {
    let format = OutputFormat::from_path(path)?;
    match format {
        OutputFormat::Stl => {
            if options.beam.is_some() {
                warn!("beam marker is only written to glTF output");
            }
            stl::write_stl_file(scene, path)?;
        }
        OutputFormat::Gltf => gltf_writer::write_gltf_file(scene, path, options)?,
        OutputFormat::Glb => gltf_writer::write_glb_file(scene, path, options)?,
    }
    info!(path = %path.display(), %format, nodes = scene.node_count(), "exported scene");
    Ok(format)
}
