//! # Primitives
//!
//! Placeholder shapes placed at components without an external mesh.

pub mod cone;
pub mod cube;

pub use cone::create_cone;
pub use cube::create_cube;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SceneResult;
use crate::mesh::Mesh;

/// Placeholder shape kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Direction marker pointing along local z.
    #[default]
    Cone,
    /// Axis-aligned cube.
    Cube,
}

impl Shape {
    /// Builds the mesh of this shape for a size in meters.
    pub fn mesh(self, size: f64) -> SceneResult<Mesh> {
        match self {
            Shape::Cone => create_cone(size),
            Shape::Cube => create_cube(size),
        }
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cone" => Ok(Shape::Cone),
            "cube" => Ok(Shape::Cube),
            other => Err(format!("unknown shape `{other}`, expected `cone` or `cube`")),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Cone => f.write_str("cone"),
            Shape::Cube => f.write_str("cube"),
        }
    }
}
