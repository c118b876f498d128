//! # Elementary Operations
//!
//! A single translation or rotation step of a transformation chain, exactly
//! as stored in the file: the magnitude keeps its unit string, conversion to
//! SI happens during composition.

use std::fmt;
use std::str::FromStr;

use config::constants::{DEFAULT_ANGLE_UNIT, DEFAULT_LENGTH_UNIT};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Kind of an elementary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Move along the axis by the magnitude.
    Translation,
    /// Rotate about the axis by the magnitude.
    Rotation,
}

impl OpKind {
    /// Unit assumed when the file does not name one.
    pub fn default_unit(self) -> &'static str {
        match self {
            OpKind::Translation => DEFAULT_LENGTH_UNIT,
            OpKind::Rotation => DEFAULT_ANGLE_UNIT,
        }
    }
}

impl FromStr for OpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translation" => Ok(OpKind::Translation),
            "rotation" => Ok(OpKind::Rotation),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Translation => f.write_str("translation"),
            OpKind::Rotation => f.write_str("rotation"),
        }
    }
}

/// One translation or rotation along an axis.
///
/// The axis is stored as given; it is normalized when the operation is
/// turned into a matrix.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use nexus_tree::{ElementaryOp, OpKind};
///
/// let op = ElementaryOp::rotation(DVec3::Z, 90.0, "deg");
/// assert_eq!(op.kind, OpKind::Rotation);
/// assert_eq!(op.offset, DVec3::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementaryOp {
    /// Translation or rotation.
    pub kind: OpKind,
    /// Direction of the operation.
    pub axis: DVec3,
    /// Magnitude in `unit`.
    pub magnitude: f64,
    /// Unit of the magnitude.
    pub unit: String,
    /// Fixed origin of the operation in `offset_unit`.
    pub offset: DVec3,
    /// Unit of the offset vector.
    pub offset_unit: String,
}

impl ElementaryOp {
    /// Creates an operation of the given kind with zero offset.
    pub fn new(kind: OpKind, axis: DVec3, magnitude: f64, unit: impl Into<String>) -> Self {
        Self {
            kind,
            axis,
            magnitude,
            unit: unit.into(),
            offset: DVec3::ZERO,
            offset_unit: DEFAULT_LENGTH_UNIT.to_string(),
        }
    }

    /// Creates a translation along `axis`.
    pub fn translation(axis: DVec3, magnitude: f64, unit: impl Into<String>) -> Self {
        Self::new(OpKind::Translation, axis, magnitude, unit)
    }

    /// Creates a rotation about `axis`.
    pub fn rotation(axis: DVec3, magnitude: f64, unit: impl Into<String>) -> Self {
        Self::new(OpKind::Rotation, axis, magnitude, unit)
    }

    /// Sets the fixed offset of the operation.
    pub fn with_offset(mut self, offset: DVec3, unit: impl Into<String>) -> Self {
        self.offset = offset;
        self.offset_unit = unit.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("translation".parse::<OpKind>(), Ok(OpKind::Translation));
        assert_eq!("rotation".parse::<OpKind>(), Ok(OpKind::Rotation));
        assert_eq!("shear".parse::<OpKind>(), Err("shear".to_string()));
    }

    #[test]
    fn test_default_units() {
        assert_eq!(OpKind::Translation.default_unit(), "m");
        assert_eq!(OpKind::Rotation.default_unit(), "deg");
    }

    #[test]
    fn test_with_offset() {
        let op = ElementaryOp::translation(DVec3::X, 1.0, "m").with_offset(DVec3::Y, "mm");
        assert_eq!(op.offset, DVec3::Y);
        assert_eq!(op.offset_unit, "mm");
    }
}
