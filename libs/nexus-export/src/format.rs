//! Output format selection by file extension.

use std::fmt;
use std::path::Path;

use config::constants::is_supported_output;

use crate::error::{ExportError, ExportResult};

/// Serializer chosen for a destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Binary STL, flattened to world space.
    Stl,
    /// glTF JSON with an external `.bin` buffer.
    Gltf,
    /// Single-file binary glTF.
    Glb,
}

impl OutputFormat {
    /// Picks the format from a path's extension, ignoring case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nexus_export::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_path("scene.GLB").unwrap(), OutputFormat::Glb);
    /// assert!(OutputFormat::from_path("scene.obj").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let unsupported = || ExportError::UnsupportedExtension {
            path: path.display().to_string(),
        };
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| is_supported_output(ext))
            .ok_or_else(unsupported)?;

        match extension.to_ascii_lowercase().as_str() {
            "stl" => Ok(OutputFormat::Stl),
            "gltf" => Ok(OutputFormat::Gltf),
            "glb" => Ok(OutputFormat::Glb),
            _ => Err(unsupported()),
        }
    }

    /// Canonical extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Stl => "stl",
            OutputFormat::Gltf => "gltf",
            OutputFormat::Glb => "glb",
        }
    }

    /// True if the format keeps the node hierarchy.
    pub fn is_hierarchical(self) -> bool {
        !matches!(self, OutputFormat::Stl)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
