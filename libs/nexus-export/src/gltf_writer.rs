//! # glTF Writer
//!
//! Maps the scene graph one-to-one onto glTF nodes. Node transforms are
//! written as column-major matrices, so nested scenes keep their
//! parent-relative transforms.
//!
//! ## Buffer layout
//!
//! ```text
//! buffer 0: [positions mesh 0][indices mesh 0][positions mesh 1]...[beam]
//!              view/accessor     view/accessor
//! ```
//!
//! All data is 4-byte aligned (f32 positions, u32 indices).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use config::constants::DEFAULT_COLOR;
use glam::{DMat4, DVec3};
use gltf::binary::{Glb, Header};
use gltf::json;
use gltf::json::validation::Checked::Valid;
use gltf::json::validation::USize64;
use nexus_scene::{Mesh, Scene};
use tracing::debug;

use crate::error::{ExportError, ExportResult};

const GENERATOR: &str = concat!("nexus3d ", env!("CARGO_PKG_VERSION"));
const BEAM_NODE_NAME: &str = "beam";

/// Options for glTF output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GltfOptions {
    /// Direction of the beam marker line, if one should be drawn.
    pub beam: Option<DVec3>,
}

impl GltfOptions {
    /// Adds a one meter beam line from the origin along `direction`.
    pub fn with_beam(mut self, direction: DVec3) -> Self {
        self.beam = Some(direction);
        self
    }
}

/// A glTF document with its binary buffer.
#[derive(Debug)]
pub struct GltfDocument {
    /// JSON document.
    pub root: json::Root,
    /// Contents of buffer 0, padded to four bytes.
    pub buffer: Vec<u8>,
}

// =============================================================================
// DOCUMENT BUILDING
// =============================================================================

struct DocumentBuilder {
    root: json::Root,
    buffer: Vec<u8>,
    buffer_index: json::Index<json::Buffer>,
    material: json::Index<json::Material>,
}

impl DocumentBuilder {
    fn new() -> Self {
        let mut root = json::Root::default();
        root.asset.generator = Some(GENERATOR.to_string());
        // Length and uri are filled in by `finish`
        let buffer_index = root.push(json::Buffer {
            byte_length: USize64(0),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        });
        let material = root.push(json::Material {
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor(DEFAULT_COLOR),
                ..Default::default()
            },
            double_sided: true,
            ..Default::default()
        });
        Self {
            root,
            buffer: Vec::new(),
            buffer_index,
            material,
        }
    }

    fn push_view(
        &mut self,
        bytes: &[u8],
        target: json::buffer::Target,
    ) -> json::Index<json::buffer::View> {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        self.root.push(json::buffer::View {
            buffer: self.buffer_index,
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        })
    }

    fn push_positions(&mut self, positions: &[f32]) -> json::Index<json::Accessor> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        let bytes: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, json::buffer::Target::ArrayBuffer);
        self.root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: None,
            count: USize64::from(positions.len() / 3),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::F32,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(json::accessor::Type::Vec3),
            min: Some(json::Value::from(min.to_vec())),
            max: Some(json::Value::from(max.to_vec())),
            name: None,
            normalized: false,
            sparse: None,
        })
    }

    fn push_indices(&mut self, indices: &[u32]) -> json::Index<json::Accessor> {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_view(&bytes, json::buffer::Target::ElementArrayBuffer);
        self.root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: None,
            count: USize64::from(indices.len()),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::U32,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(json::accessor::Type::Scalar),
            min: None,
            max: None,
            name: None,
            normalized: false,
            sparse: None,
        })
    }

    fn push_mesh(
        &mut self,
        name: &str,
        positions: json::Index<json::Accessor>,
        indices: Option<json::Index<json::Accessor>>,
        mode: json::mesh::Mode,
        material: Option<json::Index<json::Material>>,
    ) -> json::Index<json::Mesh> {
        let mut attributes = BTreeMap::new();
        attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices,
            material,
            mode: Valid(mode),
            targets: None,
        };
        self.root.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        })
    }

    fn push_triangle_mesh(&mut self, name: &str, mesh: &Mesh) -> Option<json::Index<json::Mesh>> {
        if mesh.is_empty() {
            return None;
        }
        let positions = self.push_positions(&mesh.vertices_f32());
        let indices = self.push_indices(&mesh.indices_u32());
        let material = Some(self.material);
        Some(self.push_mesh(
            name,
            positions,
            Some(indices),
            json::mesh::Mode::Triangles,
            material,
        ))
    }

    fn push_beam(&mut self, direction: DVec3) -> json::Index<json::Node> {
        let end = direction.normalize_or_zero();
        let positions = [0.0, 0.0, 0.0, end.x as f32, end.y as f32, end.z as f32];
        let positions = self.push_positions(&positions);
        let mesh = self.push_mesh(BEAM_NODE_NAME, positions, None, json::mesh::Mode::Lines, None);
        self.root.push(json::Node {
            mesh: Some(mesh),
            name: Some(BEAM_NODE_NAME.to_string()),
            ..Default::default()
        })
    }

    fn finish(mut self, uri: Option<String>) -> GltfDocument {
        while self.buffer.len() % 4 != 0 {
            self.buffer.push(0);
        }
        let buffer = &mut self.root.buffers[self.buffer_index.value()];
        buffer.byte_length = USize64::from(self.buffer.len());
        buffer.uri = uri;
        GltfDocument {
            root: self.root,
            buffer: self.buffer,
        }
    }
}

fn matrix(transform: &DMat4) -> Option<[f32; 16]> {
    (*transform != DMat4::IDENTITY).then(|| transform.to_cols_array().map(|v| v as f32))
}

/// Builds the glTF document for a scene.
///
/// `buffer_uri` names the external buffer file; pass `None` for GLB.
pub fn build_document(scene: &Scene, options: &GltfOptions, buffer_uri: Option<String>) -> GltfDocument {
    let mut builder = DocumentBuilder::new();

    // Pre-order walk: a node's parent is the nearest open node one level up
    let mut open: Vec<json::Index<json::Node>> = Vec::new();
    let mut children: BTreeMap<usize, Vec<json::Index<json::Node>>> = BTreeMap::new();
    let mut scene_root = None;
    scene.walk(|node, _, depth| {
        let mesh = node
            .geometry
            .as_ref()
            .and_then(|geometry| builder.push_triangle_mesh(&node.name, geometry.mesh()));
        let index = builder.root.push(json::Node {
            matrix: matrix(&node.transform),
            mesh,
            name: Some(node.name.clone()),
            ..Default::default()
        });

        open.truncate(depth);
        match open.last() {
            Some(parent) => children.entry(parent.value()).or_default().push(index),
            None => scene_root = Some(index),
        }
        open.push(index);
    });

    for (parent, kids) in children {
        builder.root.nodes[parent].children = Some(kids);
    }

    let mut nodes: Vec<json::Index<json::Node>> = scene_root.into_iter().collect();
    if let Some(direction) = options.beam {
        nodes.push(builder.push_beam(direction));
    }
    let scene_index = builder.root.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes,
    });
    builder.root.scene = Some(scene_index);

    builder.finish(buffer_uri)
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Encodes the scene as a GLB container.
pub fn to_glb_bytes(scene: &Scene, options: &GltfOptions) -> ExportResult<Vec<u8>> {
    let document = build_document(scene, options, None);
    let mut json = serde_json::to_vec(&document.root)?;
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    // header + JSON chunk + BIN chunk, chunk headers are 8 bytes each
    let size = 12 + 8 + json.len() + 8 + document.buffer.len();
    let length = u32::try_from(size).map_err(|_| ExportError::TooLarge {
        format: "glb",
        size,
    })?;
    let glb = Glb {
        header: Header {
            magic: *b"glTF",
            version: 2,
            length,
        },
        json: Cow::Owned(json),
        bin: Some(Cow::Owned(document.buffer)),
    };
    Ok(glb.to_vec()?)
}

/// Writes the scene as GLB to `path`.
pub fn write_glb_file(scene: &Scene, path: &Path, options: &GltfOptions) -> ExportResult<()> {
    let bytes = to_glb_bytes(scene, options)?;
    std::fs::write(path, &bytes).map_err(|e| ExportError::io(path.display().to_string(), e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote glb");
    Ok(())
}

/// Writes the scene as glTF JSON to `path` with the buffer next to it.
///
/// The buffer file takes the stem of `path` with a `.bin` extension.
pub fn write_gltf_file(scene: &Scene, path: &Path, options: &GltfOptions) -> ExportResult<()> {
    let bin_path = path.with_extension("bin");
    let uri = bin_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let document = build_document(scene, options, uri);

    let file = File::create(path).map_err(|e| ExportError::io(path.display().to_string(), e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &document.root)?;
    std::fs::write(&bin_path, &document.buffer)
        .map_err(|e| ExportError::io(bin_path.display().to_string(), e))?;

    debug!(
        path = %path.display(),
        nodes = document.root.nodes.len(),
        buffer = document.buffer.len(),
        "wrote gltf"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_scene::primitives::create_cube;
    use nexus_scene::{Geometry, Placement, PlacementPlan, SceneBuilder, Shape};

    fn scene() -> Scene {
        let base = DMat4::from_translation(DVec3::X);
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
                pose: base * DMat4::from_rotation_z(1.0),
                offset: DMat4::IDENTITY,
                geometry: Some(Geometry::Primitive {
                    shape: Shape::Cube,
                    mesh: create_cube(0.1).unwrap(),
                }),
                parent: Some("/entry/t/x".into()),
                is_target: true,
            },
        ];
        SceneBuilder::new().build(PlacementPlan {
            placements,
            issues: Vec::new(),
            retain_intermediate: true,
        })
    }

    #[test]
    fn test_document_mirrors_hierarchy() {
        let document = build_document(&scene(), &GltfOptions::default(), None);
        let root = &document.root;

        assert_eq!(root.nodes.len(), 3);
        assert_eq!(root.nodes[0].name.as_deref(), Some("root"));
        assert_eq!(root.nodes[1].name.as_deref(), Some("t/x"));
        assert_eq!(root.nodes[2].name.as_deref(), Some("sample"));
        assert_eq!(root.nodes[0].children.as_ref().map(Vec::len), Some(1));
        assert_eq!(root.nodes[1].children.as_ref().map(Vec::len), Some(1));
        assert!(root.nodes[0].matrix.is_none());
        assert!(root.nodes[1].mesh.is_none());
        assert!(root.nodes[2].mesh.is_some());
        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.scenes[0].nodes.len(), 1);
        assert_eq!(document.buffer.len() % 4, 0);
    }

    #[test]
    fn test_node_matrix_is_column_major() {
        let document = build_document(&scene(), &GltfOptions::default(), None);
        let matrix = document.root.nodes[1].matrix.unwrap();
        assert_eq!(&matrix[12..16], &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_beam_node() {
        let options = GltfOptions::default().with_beam(-DVec3::Z * 5.0);
        let document = build_document(&scene(), &options, None);
        let root = &document.root;

        assert_eq!(root.scenes[0].nodes.len(), 2);
        let beam = root.nodes.last().unwrap();
        assert_eq!(beam.name.as_deref(), Some("beam"));
        let mesh = &root.meshes[beam.mesh.unwrap().value()];
        assert_eq!(mesh.primitives[0].mode, Valid(json::mesh::Mode::Lines));
        let positions = &root.accessors[mesh.primitives[0].attributes
            [&Valid(json::mesh::Semantic::Positions)]
            .value()];
        assert_eq!(positions.min, Some(json::Value::from(vec![0.0f32, 0.0, -1.0])));
    }

    #[test]
    fn test_glb_reads_back() {
        let bytes = to_glb_bytes(&scene(), &GltfOptions::default()).unwrap();
        let gltf = gltf::Gltf::from_slice(&bytes).unwrap();
        assert_eq!(gltf.nodes().count(), 3);
        assert_eq!(gltf.meshes().count(), 1);
        let blob = gltf.blob.as_ref().unwrap();
        assert_eq!(blob.len() % 4, 0);

        let mesh = gltf.meshes().next().unwrap();
        let primitive = mesh.primitives().next().unwrap();
        assert_eq!(primitive.indices().unwrap().count(), 36);
        assert_eq!(std::mem::size_of::<u32>() * 36 + 8 * 12, blob.len());
    }
}
