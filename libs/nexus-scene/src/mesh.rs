//! # Mesh Data Structure
//!
//! Indexed triangle mesh carried as geometry payload of scene nodes.

use config::constants::VERTEX_MERGE_EPSILON;
use glam::{DMat4, DVec3};

use crate::error::{SceneError, SceneResult};

/// Converts a vertex position in the buffer into a triangle index.
pub fn vertex_index(index: usize) -> SceneResult<u32> {
    u32::try_from(index).map_err(|_| SceneError::IndexOverflow { index })
}

/// An indexed triangle mesh in meters.
///
/// Geometry stays in f64 until an exporter writes it out.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use nexus_scene::Mesh;
///
/// let mut mesh = Mesh::new();
/// let a = mesh.add_vertex(DVec3::ZERO).unwrap();
/// let b = mesh.add_vertex(DVec3::X).unwrap();
/// let c = mesh.add_vertex(DVec3::Y).unwrap();
/// mesh.add_triangle(a, b, c);
/// assert_eq!(mesh.face_normal(0), DVec3::Z);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> SceneResult<u32> {
        let index = vertex_index(self.vertices.len())?;
        self.vertices.push(position);
        Ok(index)
    }

    /// Adds a triangle by vertex indices (counter-clockwise seen from outside).
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Triangle indices.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Corner positions of a triangle.
    pub fn triangle_vertices(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit normal of a triangle, zero for degenerate triangles.
    pub fn face_normal(&self, index: usize) -> DVec3 {
        let [a, b, c] = self.triangle_vertices(index);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Axis-aligned bounding box as (min, max); zero for an empty mesh.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };
        self.vertices
            .iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Transforms all vertices as points.
    pub fn transform(&mut self, matrix: &DMat4) {
        for v in &mut self.vertices {
            *v = matrix.transform_point3(*v);
        }
    }

    /// Returns a transformed copy.
    pub fn transformed(&self, matrix: &DMat4) -> Self {
        let mut mesh = self.clone();
        mesh.transform(matrix);
        mesh
    }

    /// Scales all vertices uniformly about the origin.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            *v *= factor;
        }
    }

    /// Checks index bounds and rejects zero-area triangles.
    pub fn validate(&self) -> bool {
        let count = self.vertices.len();
        self.triangles.iter().enumerate().all(|(i, tri)| {
            tri.iter().all(|&idx| (idx as usize) < count) && {
                let [a, b, c] = self.triangle_vertices(i);
                (b - a).cross(c - a).length() >= VERTEX_MERGE_EPSILON
            }
        })
    }

    /// Vertices flattened to `[x, y, z, x, y, z, ...]` in f32.
    pub fn vertices_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
            .collect()
    }

    /// Triangle indices flattened to `[i0, i1, i2, ...]`.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(DVec3::ZERO).unwrap();
        mesh.add_vertex(DVec3::X).unwrap();
        mesh.add_vertex(DVec3::Y).unwrap();
        mesh.add_triangle(0, 1, 2);
        mesh
    }

    #[test]
    fn test_empty_mesh_has_zero_bounds() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounding_box(), (DVec3::ZERO, DVec3::ZERO));
    }

    #[test]
    fn test_bounds_follow_rotation() {
        let rotation = DMat4::from_rotation_z(std::f64::consts::PI);
        let (min, max) = triangle().transformed(&rotation).bounding_box();
        assert!(min.abs_diff_eq(DVec3::new(-1.0, -1.0, 0.0), 1e-12));
        assert!(max.abs_diff_eq(DVec3::ZERO, 1e-12));
    }

    #[test]
    fn test_transform_translates_points() {
        let mesh = triangle().transformed(&DMat4::from_translation(DVec3::Z));
        assert_eq!(mesh.vertices()[0], DVec3::Z);
        assert_eq!(mesh.face_normal(0), DVec3::Z);
    }

    #[test]
    fn test_scale() {
        let mut mesh = triangle();
        mesh.scale(1e-3);
        assert_eq!(mesh.bounding_box().1, DVec3::new(1e-3, 1e-3, 0.0));
    }

    #[test]
    fn test_validate() {
        assert!(triangle().validate());

        let mut bad = Mesh::new();
        bad.add_vertex(DVec3::ZERO).unwrap();
        bad.add_triangle(0, 1, 2);
        assert!(!bad.validate());
    }

    #[test]
    fn test_vertex_index_range() {
        assert_eq!(vertex_index(7).unwrap(), 7);
        assert_eq!(vertex_index(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_vertex_index_overflow() {
        let index = u32::MAX as usize + 1;
        assert!(matches!(
            vertex_index(index),
            Err(SceneError::IndexOverflow { index: i }) if i == index
        ));
    }

    #[test]
    fn test_flat_exports() {
        let mesh = triangle();
        assert_eq!(mesh.vertices_f32().len(), 9);
        assert_eq!(mesh.indices_u32(), vec![0, 1, 2]);
    }
}
