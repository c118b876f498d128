//! # Cube Primitive

use glam::DVec3;

use crate::error::{SceneError, SceneResult};
use crate::mesh::Mesh;

/// Creates a cube with edge length `size`, centered at the origin.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use nexus_scene::primitives::create_cube;
///
/// let mesh = create_cube(0.1).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// assert_eq!(mesh.bounding_box(), (DVec3::splat(-0.05), DVec3::splat(0.05)));
/// ```
pub fn create_cube(size: f64) -> SceneResult<Mesh> {
    if !size.is_finite() || size <= 0.0 {
        return Err(SceneError::InvalidSize { size });
    }

    let h = size / 2.0;
    let mut mesh = Mesh::with_capacity(8, 12);

    // Bottom ring (z = -h), then top ring (z = +h), both counter-clockwise
    for z in [-h, h] {
        mesh.add_vertex(DVec3::new(-h, -h, z))?;
        mesh.add_vertex(DVec3::new(h, -h, z))?;
        mesh.add_vertex(DVec3::new(h, h, z))?;
        mesh.add_vertex(DVec3::new(-h, h, z))?;
    }

    const FACES: [[u32; 3]; 12] = [
        // -z
        [0, 2, 1],
        [0, 3, 2],
        // +z
        [4, 5, 6],
        [4, 6, 7],
        // -y
        [0, 1, 5],
        [0, 5, 4],
        // +y
        [2, 3, 7],
        [2, 7, 6],
        // -x
        [3, 0, 4],
        [3, 4, 7],
        // +x
        [1, 2, 6],
        [1, 6, 5],
    ];
    for [a, b, c] in FACES {
        mesh.add_triangle(a, b, c);
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_validates() {
        assert!(create_cube(1.0).unwrap().validate());
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = create_cube(2.0).unwrap();
        for i in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_vertices(i);
            let center = (a + b + c) / 3.0;
            assert!(mesh.face_normal(i).dot(center) > 0.0, "face {i} points inward");
        }
    }

    #[test]
    fn test_cube_invalid_size() {
        assert!(matches!(
            create_cube(0.0),
            Err(SceneError::InvalidSize { .. })
        ));
        assert!(create_cube(-1.0).is_err());
        assert!(create_cube(f64::NAN).is_err());
    }
}
