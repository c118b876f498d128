//! # STL Writer
//!
//! STL has no hierarchy, so every placed mesh is baked into world space and
//! all triangles go into one binary file.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use nexus_scene::Scene;
use stl_io::{Normal, Triangle, Vertex};
use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Collects the world-space triangles of every node with geometry.
pub fn world_triangles(scene: &Scene) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    scene.walk(|node, world, _| {
        let Some(geometry) = &node.geometry else {
            return;
        };
        let mesh = geometry.mesh().transformed(&world);
        for i in 0..mesh.triangle_count() {
            let n = mesh.face_normal(i);
            let corners = mesh.triangle_vertices(i);
            triangles.push(Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: corners.map(|v| Vertex::new([v.x as f32, v.y as f32, v.z as f32])),
            });
        }
    });
    triangles
}

/// Encodes the scene as binary STL.
pub fn to_stl_bytes(scene: &Scene) -> ExportResult<Vec<u8>> {
    let triangles = world_triangles(scene);
    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter())
        .map_err(|source| ExportError::io("<memory>", source))?;
    Ok(cursor.into_inner())
}

/// Writes the scene as binary STL to `path`.
pub fn write_stl_file(scene: &Scene, path: &Path) -> ExportResult<()> {
    let triangles = world_triangles(scene);
    let io_err = |source| ExportError::io(path.display().to_string(), source);

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    stl_io::write_stl(&mut writer, triangles.iter()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    debug!(path = %path.display(), triangles = triangles.len(), "wrote stl");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DMat4, DVec3};
    use nexus_scene::primitives::create_cube;
    use nexus_scene::{Geometry, Placement, PlacementPlan, SceneBuilder, Shape};

    fn scene(retain_intermediate: bool) -> Scene {
        let base = DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0));
        let placements = vec![
            Placement {
                path: "/entry/t/x".into(),
                name: "t/x".into(),
                pose: base,
                offset: DMat4::IDENTITY,
                geometry: None,
                parent: None,
                is_target: false,
            },
            Placement {
                path: "/entry/sample".into(),
                name: "sample".into(),
                pose: base,
                offset: DMat4::from_translation(DVec3::Z),
                geometry: Some(Geometry::Primitive {
                    shape: Shape::Cube,
                    mesh: create_cube(2.0).unwrap(),
                }),
                parent: Some("/entry/t/x".into()),
                is_target: true,
            },
        ];
        SceneBuilder::new().build(PlacementPlan {
            placements,
            issues: Vec::new(),
            retain_intermediate,
        })
    }

    #[test]
    fn test_triangles_are_in_world_space() {
        for retain in [false, true] {
            let triangles = world_triangles(&scene(retain));
            assert_eq!(triangles.len(), 12);
            for t in &triangles {
                for v in &t.vertices {
                    assert!((9.0..=11.0).contains(&v[0]));
                    assert!((0.0..=2.0).contains(&v[2]));
                }
            }
        }
    }

    #[test]
    fn test_stl_bytes_read_back() {
        let bytes = to_stl_bytes(&scene(true)).unwrap();
        assert_eq!(bytes.len(), 84 + 12 * 50);
        let mesh = stl_io::read_stl(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(mesh.faces.len(), 12);
        assert_eq!(mesh.vertices.len(), 8);
    }
}
