//! # Export Errors

use thiserror::Error;

/// Errors that can occur while writing a scene.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination has no supported extension.
    #[error("Unsupported output file {path}: expected .stl, .gltf or .glb")]
    UnsupportedExtension { path: String },

    /// Writing a file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The glTF document could not be serialized.
    #[error("Failed to serialize glTF document: {0}")]
    Json(#[from] serde_json::Error),

    /// The binary container could not be written.
    #[error("Failed to write binary glTF: {0}")]
    Glb(#[from] gltf::Error),

    /// The scene does not fit the 32-bit sizes of the output format.
    #[error("Scene too large for {format}: {size} bytes")]
    TooLarge { format: &'static str, size: usize },
}

impl ExportError {
    /// Creates an I/O error for a destination path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
