//! # Cone Primitive
//!
//! Direction marker used as default placeholder: the apex sits at the pose
//! origin and the cone opens towards local -z, so it points along the local
//! z axis. The base ring is stretched along local x to show the x direction.

use std::f64::consts::TAU;

use config::constants::{CONE_ASPECT_RATIO, CONE_SEGMENTS, CONE_X_MARKER};
use glam::DVec3;

use crate::error::{SceneError, SceneResult};
use crate::mesh::Mesh;

/// Creates the marker cone for a shape size.
///
/// The cone is `size / 2` tall with a base radius of
/// `size / (2 * CONE_ASPECT_RATIO)`.
///
/// # Example
///
/// ```rust
/// use nexus_scene::primitives::create_cone;
///
/// let mesh = create_cone(0.1).unwrap();
/// let (min, max) = mesh.bounding_box();
/// assert_eq!(max.z, 0.0);
/// assert!((min.z + 0.05).abs() < 1e-12);
/// ```
pub fn create_cone(size: f64) -> SceneResult<Mesh> {
    if !size.is_finite() || size <= 0.0 {
        return Err(SceneError::InvalidSize { size });
    }

    let scale = size / 2.0 / CONE_ASPECT_RATIO;
    let base_z = -CONE_ASPECT_RATIO * scale;
    let segments = CONE_SEGMENTS;

    let mut mesh = Mesh::with_capacity(segments as usize + 2, 2 * segments as usize);
    let apex = mesh.add_vertex(DVec3::ZERO)?;

    for i in 0..segments {
        let angle = TAU * f64::from(i) / f64::from(segments);
        let (sin, cos) = angle.sin_cos();
        // The ring points on the x axis are pushed out as direction markers
        let stretch = if 2 * i % segments == 0 {
            CONE_X_MARKER
        } else {
            1.0
        };
        mesh.add_vertex(DVec3::new(cos * stretch * scale, sin * scale, base_z))?;
    }
    let center = mesh.add_vertex(DVec3::new(0.0, 0.0, base_z))?;

    for i in 0..segments {
        let current = 1 + i;
        let next = 1 + (i + 1) % segments;
        mesh.add_triangle(apex, current, next);
        mesh.add_triangle(center, next, current);
    }

    Ok(mesh)
}
