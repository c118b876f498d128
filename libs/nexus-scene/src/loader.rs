//! Mesh loading services.
//!
//! Placement planning only sees the [`MeshLoader`] trait. [`StlLoader`] reads
//! ASCII and binary STL files from disk; [`InMemoryMeshLoader`] serves meshes
//! registered up front and is used in tests.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use glam::DVec3;
use tracing::debug;

use crate::error::{SceneError, SceneResult};
use crate::mesh::{vertex_index, Mesh};

/// Loads a mesh referenced by a placement config entry.
///
/// # Examples
/// ```
/// use nexus_scene::{InMemoryMeshLoader, MeshLoader};
/// let loader = InMemoryMeshLoader::default();
/// assert!(loader.load_mesh("holder.stl").is_err());
/// ```
pub trait MeshLoader {
    /// Loads the mesh at `path` in the file's own units.
    fn load_mesh(&self, path: &str) -> SceneResult<Mesh>;
}

/// Reads STL files, resolving relative paths against a base directory.
#[derive(Debug, Clone, Default)]
pub struct StlLoader {
    base_dir: Option<PathBuf>,
}

impl StlLoader {
    /// Creates a loader resolving relative paths against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader resolving relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl MeshLoader for StlLoader {
    fn load_mesh(&self, path: &str) -> SceneResult<Mesh> {
        let resolved = self.resolve(path);
        let file = File::open(&resolved).map_err(|e| SceneError::mesh_load(path, e))?;
        let stl = stl_io::read_stl(&mut BufReader::new(file))
            .map_err(|e| SceneError::mesh_load(path, e))?;

        let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
        for v in &stl.vertices {
            mesh.add_vertex(DVec3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])))?;
        }
        for face in &stl.faces {
            let [a, b, c] = face.vertices;
            mesh.add_triangle(vertex_index(a)?, vertex_index(b)?, vertex_index(c)?);
        }

        debug!(
            path = %resolved.display(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "loaded stl mesh"
        );
        Ok(mesh)
    }
}

/// Mesh loader backed by a map of registered meshes.
///
/// # Examples
/// ```
/// use nexus_scene::{primitives::create_cube, InMemoryMeshLoader, MeshLoader};
/// let mut loader = InMemoryMeshLoader::default();
/// loader.insert("holder.stl", create_cube(1.0).unwrap());
/// assert_eq!(loader.load_mesh("holder.stl").unwrap().triangle_count(), 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeshLoader {
    meshes: HashMap<String, Mesh>,
}

impl InMemoryMeshLoader {
    /// Registers or replaces a mesh.
    pub fn insert(&mut self, path: impl Into<String>, mesh: Mesh) {
        self.meshes.insert(path.into(), mesh);
    }
}

impl MeshLoader for InMemoryMeshLoader {
    fn load_mesh(&self, path: &str) -> SceneResult<Mesh> {
        self.meshes
            .get(path)
            .cloned()
            .ok_or_else(|| SceneError::mesh_not_found(path))
    }
}
