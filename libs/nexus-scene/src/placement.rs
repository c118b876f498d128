//! # Placement Planner
//!
//! Decides what geometry goes where: a placeholder primitive at every
//! resolved component, overridden per component by a JSON placement config.
//!
//! ## Config format
//!
//! ```text
//! {
//!   "instrument/manipulator": { "file": "manipulator.stl", "unit": "mm",
//!                               "x": 0, "y": 0, "z": 12.5,
//!                               "rot_x": 90, "rot_y": 0, "rot_z": 0 },
//!   "sample": { "rot_z": 45 }
//! }
//! ```
//!
//! Keys are display names (path without the entry group) or absolute paths.
//! The local offset is `T(xyz * unit) * Rz * Ry * Rx`, applied after the
//! resolved pose; the same unit scales a loaded mesh into meters.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use config::constants::DEFAULT_LENGTH_UNIT;
use config::RunConfig;
use glam::{DMat4, DVec3};
use nexus_transform::{ResolvedTree, UnitConverter, UnitError};
use nexus_tree::path;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SceneError, SceneResult};
use crate::loader::MeshLoader;
use crate::mesh::Mesh;
use crate::primitives::Shape;

// =============================================================================
// CONFIG
// =============================================================================

fn default_unit() -> String {
    DEFAULT_LENGTH_UNIT.to_string()
}

/// Placement override for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSpec {
    /// Mesh file placed instead of the primitive.
    #[serde(default)]
    pub file: Option<String>,
    /// Local translation along x in `unit`.
    #[serde(default)]
    pub x: f64,
    /// Local translation along y in `unit`.
    #[serde(default)]
    pub y: f64,
    /// Local translation along z in `unit`.
    #[serde(default)]
    pub z: f64,
    /// Rotation about x in degrees, applied first.
    #[serde(default)]
    pub rot_x: f64,
    /// Rotation about y in degrees.
    #[serde(default)]
    pub rot_y: f64,
    /// Rotation about z in degrees, applied last.
    #[serde(default)]
    pub rot_z: f64,
    /// Length unit of the translation and of the mesh file.
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl Default for PlacementSpec {
    fn default() -> Self {
        Self {
            file: None,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 0.0,
            unit: default_unit(),
        }
    }
}

impl PlacementSpec {
    /// Meters per `unit`.
    pub fn unit_scale(&self, units: &dyn UnitConverter) -> Result<f64, UnitError> {
        units.to_meters(1.0, &self.unit)
    }

    /// Local offset applied after the resolved pose.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glam::{DMat4, DVec3};
    /// use nexus_scene::PlacementSpec;
    /// use nexus_transform::UnitTable;
    ///
    /// let spec = PlacementSpec { z: 3.0, rot_x: 90.0, unit: "mm".into(), ..Default::default() };
    /// let offset = spec.local_offset(&UnitTable).unwrap();
    /// let expected = DMat4::from_translation(DVec3::new(0.0, 0.0, 0.003))
    ///     * DMat4::from_rotation_x(90f64.to_radians());
    /// assert!(offset.abs_diff_eq(expected, 1e-12));
    /// ```
    pub fn local_offset(&self, units: &dyn UnitConverter) -> Result<DMat4, UnitError> {
        Ok(self.offset_with_scale(self.unit_scale(units)?))
    }

    fn offset_with_scale(&self, scale: f64) -> DMat4 {
        let translation = DVec3::new(self.x, self.y, self.z) * scale;
        DMat4::from_translation(translation)
            * DMat4::from_rotation_z(self.rot_z.to_radians())
            * DMat4::from_rotation_y(self.rot_y.to_radians())
            * DMat4::from_rotation_x(self.rot_x.to_radians())
    }
}

/// Placement overrides keyed by component name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementConfig {
    entries: BTreeMap<String, PlacementSpec>,
}

impl PlacementConfig {
    /// Parses a config from JSON.
    pub fn from_json_str(source: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Reads and parses a config file.
    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SceneError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, name: impl Into<String>, spec: PlacementSpec) {
        self.entries.insert(name.into(), spec);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the config has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Finds the entry for a node path, by display name or absolute path.
    pub fn lookup(&self, node_path: &str) -> Option<(&str, &PlacementSpec)> {
        if let Some((key, spec)) = self.entries.get_key_value(path::display_name(node_path)) {
            return Some((key.as_str(), spec));
        }
        self.entries
            .iter()
            .find(|(key, _)| key.starts_with('/') && path::normalize(key) == node_path)
            .map(|(key, spec)| (key.as_str(), spec))
    }
}

// =============================================================================
// PLAN
// =============================================================================

/// Geometry payload of a placement.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Placeholder primitive.
    Primitive { shape: Shape, mesh: Mesh },
    /// Mesh loaded from a file, scaled to meters.
    External { file: String, mesh: Mesh },
}

impl Geometry {
    /// Mesh in local coordinates.
    pub fn mesh(&self) -> &Mesh {
        match self {
            Geometry::Primitive { mesh, .. } | Geometry::External { mesh, .. } => mesh,
        }
    }
}

/// One node to be emitted into the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Absolute node path.
    pub path: String,
    /// Display name.
    pub name: String,
    /// Resolved pose of the node.
    pub pose: DMat4,
    /// Local offset from the placement config.
    pub offset: DMat4,
    /// Geometry, absent for unconfigured intermediate nodes.
    pub geometry: Option<Geometry>,
    /// Path of the nearest emitted node this one depends on.
    pub parent: Option<String>,
    /// True for components, false for retained intermediate nodes.
    pub is_target: bool,
}

impl Placement {
    /// World transform of the placed geometry.
    #[inline]
    pub fn world(&self) -> DMat4 {
        self.pose * self.offset
    }
}

/// Everything the scene builder needs.
///
/// Placements are ordered so that every parent precedes its children.
#[derive(Debug, Default)]
pub struct PlacementPlan {
    /// Nodes to emit.
    pub placements: Vec<Placement>,
    /// Recoverable problems met while planning.
    pub issues: Vec<SceneError>,
    /// True if intermediate nodes were materialized.
    pub retain_intermediate: bool,
}

impl PlacementPlan {
    /// Component placements.
    pub fn targets(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.is_target)
    }

    /// Finds a placement by display name or absolute path.
    pub fn find(&self, name: &str) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.name == name || p.path == name)
    }
}

// =============================================================================
// PLANNER
// =============================================================================

/// Builds a [`PlacementPlan`] from resolved poses.
pub struct PlacementPlanner<'a> {
    shape: Shape,
    shape_size: f64,
    retain_intermediate: bool,
    config: Option<&'a PlacementConfig>,
    loader: &'a dyn MeshLoader,
    units: &'a dyn UnitConverter,
}

impl<'a> PlacementPlanner<'a> {
    /// Creates a planner using the run's shape size and retention flag.
    pub fn new(run: &RunConfig, loader: &'a dyn MeshLoader, units: &'a dyn UnitConverter) -> Self {
        Self {
            shape: Shape::default(),
            shape_size: run.shape_size,
            retain_intermediate: run.retain_intermediate,
            config: None,
            loader,
            units,
        }
    }

    /// Sets the placeholder shape.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Sets the placement overrides.
    pub fn with_config(mut self, config: &'a PlacementConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Plans every resolved target and, when retaining, its emitted ancestors.
    ///
    /// Fails only if the placeholder primitive cannot be built.
    pub fn plan(&self, resolved: &ResolvedTree) -> SceneResult<PlacementPlan> {
        let primitive = self.shape.mesh(self.shape_size)?;
        let target_paths: HashSet<&str> = resolved.targets.iter().map(|t| t.path.as_str()).collect();

        let mut plan = PlacementPlan {
            retain_intermediate: self.retain_intermediate,
            ..PlacementPlan::default()
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut matched: HashSet<String> = HashSet::new();

        for target in &resolved.targets {
            let mut parent: Option<String> = None;
            if self.retain_intermediate {
                for link in &target.intermediates {
                    if seen.insert(link.path.clone()) {
                        let is_target = target_paths.contains(link.path.as_str());
                        let placement = self.place(
                            &link.path,
                            link.pose,
                            parent.clone(),
                            is_target,
                            &primitive,
                            &mut plan.issues,
                            &mut matched,
                        );
                        plan.placements.push(placement);
                    }
                    parent = Some(link.path.clone());
                }
            }
            if seen.insert(target.path.clone()) {
                let placement = self.place(
                    &target.path,
                    target.pose,
                    parent,
                    true,
                    &primitive,
                    &mut plan.issues,
                    &mut matched,
                );
                plan.placements.push(placement);
            }
        }

        if let Some(config) = self.config {
            for name in config.names().filter(|name| !matched.contains(*name)) {
                warn!(entry = name, "placement config entry matches no component");
                plan.issues.push(SceneError::ConfigPathNotFound {
                    name: name.to_string(),
                });
            }
        }

        debug!(
            placements = plan.placements.len(),
            issues = plan.issues.len(),
            "planned placements"
        );
        Ok(plan)
    }

    fn place(
        &self,
        node_path: &str,
        pose: DMat4,
        parent: Option<String>,
        is_target: bool,
        primitive: &Mesh,
        issues: &mut Vec<SceneError>,
        matched: &mut HashSet<String>,
    ) -> Placement {
        let mut placement = Placement {
            path: node_path.to_string(),
            name: path::display_name(node_path).to_string(),
            pose,
            offset: DMat4::IDENTITY,
            geometry: is_target.then(|| self.primitive(primitive)),
            parent,
            is_target,
        };

        let Some((key, spec)) = self.config.and_then(|config| config.lookup(node_path)) else {
            return placement;
        };
        matched.insert(key.to_string());

        match self.configured(&placement.name, spec, primitive) {
            Ok((offset, geometry)) => {
                placement.offset = offset;
                placement.geometry = Some(geometry);
            }
            Err(err) => {
                warn!(component = %placement.name, error = %err, "ignoring placement entry");
                issues.push(err);
            }
        }
        placement
    }

    fn configured(
        &self,
        name: &str,
        spec: &PlacementSpec,
        primitive: &Mesh,
    ) -> SceneResult<(DMat4, Geometry)> {
        let scale = spec
            .unit_scale(self.units)
            .map_err(|source| SceneError::UnitConversion {
                name: name.to_string(),
                source,
            })?;

        let geometry = match &spec.file {
            Some(file) => {
                let mut mesh = self.loader.load_mesh(file)?;
                mesh.scale(scale);
                Geometry::External {
                    file: file.clone(),
                    mesh,
                }
            }
            None => self.primitive(primitive),
        };
        Ok((spec.offset_with_scale(scale), geometry))
    }

    fn primitive(&self, mesh: &Mesh) -> Geometry {
        Geometry::Primitive {
            shape: self.shape,
            mesh: mesh.clone(),
        }
    }
}
