//! # Transform Errors

use thiserror::Error;

use crate::units::UnitError;

/// Errors raised while resolving or composing transformation chains.
///
/// `CyclicDependency` and `DanglingReference` describe a broken graph and
/// abort the whole run. `DegenerateAxis` and `UnitConversion` only
/// invalidate the chain they occur in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Following `depends_on` revisited a node.
    #[error("Cyclic dependency detected at {path}")]
    CyclicDependency { path: String },

    /// A `depends_on` names a path that does not exist.
    #[error("{path} depends on missing node {target}")]
    DanglingReference { path: String, target: String },

    /// A rotation axis has zero length.
    #[error("Zero-length rotation axis in {path}")]
    DegenerateAxis { path: String },

    /// A magnitude or offset unit could not be converted.
    #[error("Unit conversion failed in {path}: {source}")]
    UnitConversion {
        path: String,
        #[source]
        source: UnitError,
    },

    /// The requested node is not part of the tree.
    #[error("Node {path} not found")]
    UnknownNode { path: String },
}

impl TransformError {
    /// Creates a unit conversion error.
    pub fn unit(path: impl Into<String>, source: UnitError) -> Self {
        Self::UnitConversion {
            path: path.into(),
            source,
        }
    }

    /// Path of the node the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::CyclicDependency { path }
            | Self::DanglingReference { path, .. }
            | Self::DegenerateAxis { path }
            | Self::UnitConversion { path, .. }
            | Self::UnknownNode { path } => path,
        }
    }

    /// True if the error invalidates the whole graph rather than one chain.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CyclicDependency { .. } | Self::DanglingReference { .. }
        )
    }
}

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors() {
        assert!(TransformError::CyclicDependency { path: "/a".into() }.is_structural());
        assert!(!TransformError::DegenerateAxis { path: "/a".into() }.is_structural());
    }

    #[test]
    fn test_unit_error_display() {
        let err = TransformError::unit(
            "/entry/x",
            UnitError::Unknown {
                unit: "furlong".into(),
            },
        );
        assert_eq!(err.path(), "/entry/x");
        assert!(err.to_string().contains("furlong"));
    }
}
