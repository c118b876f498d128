//! Coordinate frames extracted from resolved poses.

use glam::{DMat4, DVec3};

/// Origin and axes of a local frame, expressed in the root frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    /// Image of the local origin.
    pub origin: DVec3,
    /// Image of the local x direction.
    pub x_axis: DVec3,
    /// Image of the local y direction.
    pub y_axis: DVec3,
    /// Image of the local z direction.
    pub z_axis: DVec3,
}

impl CoordinateSystem {
    /// Frame described by a pose matrix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glam::{DMat4, DVec3};
    /// use nexus_transform::CoordinateSystem;
    ///
    /// let cs = CoordinateSystem::from_pose(&DMat4::from_translation(DVec3::X));
    /// assert_eq!(cs.origin, DVec3::X);
    /// assert_eq!(cs.z_axis, DVec3::Z);
    /// ```
    pub fn from_pose(pose: &DMat4) -> Self {
        Self {
            origin: pose.transform_point3(DVec3::ZERO),
            x_axis: pose.transform_vector3(DVec3::X),
            y_axis: pose.transform_vector3(DVec3::Y),
            z_axis: pose.transform_vector3(DVec3::Z),
        }
    }
}

/// Angle in radians between two directions, or `None` if either is zero.
pub fn angle_between(a: DVec3, b: DVec3) -> Option<f64> {
    let a = a.try_normalize()?;
    let b = b.try_normalize()?;
    Some(a.dot(b).clamp(-1.0, 1.0).acos())
}
