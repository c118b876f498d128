//! # Axis Convention Adapter
//!
//! Run-wide axis corrections: the optional viewer remap (Z-up viewers such
//! as Blender) and the rotation sense handed to the composer.

use config::constants::VIEWER_REMAP_ANGLE_DEG;
use config::RunConfig;
use glam::{DMat4, DVec3};

use crate::composer::Handedness;

/// Axis corrections for one run.
///
/// # Example
///
/// ```rust
/// use glam::{DMat4, DVec3};
/// use nexus_transform::AxisConvention;
///
/// let convention = AxisConvention { viewer_remap: true, ..Default::default() };
/// let beam = convention.apply_vector(-DVec3::Z);
/// assert!(beam.abs_diff_eq(-DVec3::Y, 1e-12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisConvention {
    /// Pre-multiply poses by a fixed rotation about x.
    pub viewer_remap: bool,
    /// Rotation sense used during composition.
    pub handedness: Handedness,
}

impl AxisConvention {
    /// Convention selected by a run configuration.
    pub fn from_run(run: &RunConfig) -> Self {
        Self {
            viewer_remap: run.viewer_remap,
            handedness: if run.left_handed {
                Handedness::Left
            } else {
                Handedness::Right
            },
        }
    }

    /// Fixed viewer remap rotation.
    pub fn remap_matrix() -> DMat4 {
        DMat4::from_rotation_x(VIEWER_REMAP_ANGLE_DEG.to_radians())
    }

    /// Applies the run-wide correction to a resolved pose.
    pub fn apply(&self, pose: DMat4) -> DMat4 {
        if self.viewer_remap {
            Self::remap_matrix() * pose
        } else {
            pose
        }
    }

    /// Applies the run-wide correction to a direction given in the root frame.
    pub fn apply_vector(&self, direction: DVec3) -> DVec3 {
        if self.viewer_remap {
            Self::remap_matrix().transform_vector3(direction)
        } else {
            direction
        }
    }
}
