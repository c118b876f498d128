//! # Tree Errors
//!
//! Error types for reading a hierarchy into a group tree.

use thiserror::Error;

/// Errors that can occur while building a [`GroupTree`](crate::GroupTree).
#[derive(Debug, Error)]
pub enum TreeError {
    /// A required attribute is missing on a transformation.
    #[error("`{attribute}` attribute not found in {path}")]
    MissingAttribute { path: String, attribute: String },

    /// The `transformation_type` attribute holds an unsupported kind.
    #[error("Unknown transformation type `{kind}` in {path}")]
    UnknownTransformationType { path: String, kind: String },

    /// A field or attribute has the wrong shape or type.
    #[error("Invalid value in {path}: {message}")]
    InvalidValue { path: String, message: String },

    /// Two nodes were inserted under the same path.
    #[error("Duplicate node path {path}")]
    DuplicatePath { path: String },

    /// The serialized hierarchy could not be parsed.
    #[error("Malformed hierarchy: {0}")]
    Json(#[from] serde_json::Error),

    /// The hierarchy file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    /// Creates a missing attribute error.
    pub fn missing(path: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            path: path.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TreeError::missing("/entry/sample/transformations/x", "vector");
        let text = err.to_string();
        assert!(text.contains("`vector`"));
        assert!(text.contains("/entry/sample/transformations/x"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TreeError>();
    }
}
