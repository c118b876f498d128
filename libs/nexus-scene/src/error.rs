//! # Scene Errors
//!
//! Error types for placement planning and mesh loading.

use nexus_transform::UnitError;
use thiserror::Error;

/// Errors that can occur while planning placements or loading geometry.
///
/// Apart from `Config` and `ConfigIo`, every variant is recoverable during
/// planning: it is logged, collected in
/// [`PlacementPlan::issues`](crate::PlacementPlan::issues) and the affected
/// node keeps its default geometry: the primitive for a target, none for an
/// intermediate.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A placement config entry names no resolved node.
    #[error("Config entry `{name}` matches no resolved component")]
    ConfigPathNotFound { name: String },

    /// A placement config entry has an unconvertible unit.
    #[error("Invalid unit in config entry `{name}`: {source}")]
    UnitConversion {
        name: String,
        #[source]
        source: UnitError,
    },

    /// An external mesh could not be read.
    #[error("Failed to load mesh {path}: {source}")]
    MeshLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A vertex index does not fit the mesh's 32-bit index type.
    #[error("Mesh vertex index {index} exceeds the 32-bit index range")]
    IndexOverflow { index: usize },

    /// A primitive was requested with a non-positive size.
    #[error("Shape size must be positive: {size}")]
    InvalidSize { size: f64 },

    /// The placement config is not valid JSON of the expected shape.
    #[error("Malformed placement config: {0}")]
    Config(#[from] serde_json::Error),

    /// The placement config file could not be read.
    #[error("Failed to read placement config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SceneError {
    /// Creates a mesh load error.
    pub fn mesh_load(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::MeshLoad {
            path: path.into(),
            source,
        }
    }

    /// Creates a mesh load error for a path with no mesh behind it.
    pub fn mesh_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such mesh");
        Self::MeshLoad { path, source }
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_not_found_display() {
        let err = SceneError::mesh_not_found("parts/holder.stl");
        assert!(err.to_string().contains("parts/holder.stl"));
        assert!(matches!(err, SceneError::MeshLoad { .. }));
    }

    #[test]
    fn test_config_path_display() {
        let err = SceneError::ConfigPathNotFound {
            name: "detector".into(),
        };
        assert!(err.to_string().contains("`detector`"));
    }
}
