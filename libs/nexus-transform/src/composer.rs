//! # Affine Composer
//!
//! Turns elementary operations into 4x4 homogeneous matrices and multiplies
//! them along a chain.
//!
//! Matrices act on column vectors. A chain `op1, op2, ..., opN` (root first)
//! composes to `op1 * op2 * ... * opN`, so a point given in the frame of the
//! last node is mapped into the root frame.

use config::constants::{approx_zero, MIN_AXIS_LENGTH_SQUARED};
use glam::{DMat4, DVec3};
use nexus_tree::{ElementaryOp, OpKind};

use crate::error::{TransformError, TransformResult};
use crate::resolver::Chain;
use crate::units::UnitConverter;

/// Rotation sense applied to every rotation of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handedness {
    /// Counter-clockwise rotation about the axis (NeXus convention).
    #[default]
    Right,
    /// Clockwise rotation about the axis.
    Left,
}

impl Handedness {
    /// Factor applied to rotation angles.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        }
    }
}

/// Composes operations with one unit service and handedness.
///
/// # Example
///
/// ```rust
/// use glam::{DMat4, DVec3};
/// use nexus_transform::{Composer, UnitTable};
/// use nexus_tree::ElementaryOp;
///
/// let composer = Composer::new(&UnitTable);
/// let op = ElementaryOp::translation(DVec3::X, 100.0, "cm");
/// let m = composer.op_matrix("/entry/x", &op).unwrap();
/// assert!(m.abs_diff_eq(DMat4::from_translation(DVec3::X), 1e-12));
/// ```
#[derive(Clone, Copy)]
pub struct Composer<'u> {
    units: &'u dyn UnitConverter,
    handedness: Handedness,
}

impl<'u> Composer<'u> {
    /// Creates a right-handed composer.
    pub fn new(units: &'u dyn UnitConverter) -> Self {
        Self {
            units,
            handedness: Handedness::Right,
        }
    }

    /// Sets the rotation sense.
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    /// Rotation sense of this composer.
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Matrix of a single operation. `path` names the owning node in errors.
    pub fn op_matrix(&self, path: &str, op: &ElementaryOp) -> TransformResult<DMat4> {
        let offset = self.offset_meters(path, op)?;

        match op.kind {
            OpKind::Translation => {
                let distance = self
                    .units
                    .to_meters(op.magnitude, &op.unit)
                    .map_err(|e| TransformError::unit(path, e))?;
                // A zero axis is a placeholder and moves by the offset only
                let axis = op.axis.normalize_or_zero();
                Ok(DMat4::from_translation(axis * distance + offset))
            }
            OpKind::Rotation => {
                if op.axis.length_squared() < MIN_AXIS_LENGTH_SQUARED {
                    return Err(TransformError::DegenerateAxis {
                        path: path.to_string(),
                    });
                }
                let axis = op.axis.normalize();
                let angle = self
                    .units
                    .to_radians(op.magnitude, &op.unit)
                    .map_err(|e| TransformError::unit(path, e))?;
                let rotation = DMat4::from_axis_angle(axis, angle * self.handedness.sign());
                if approx_zero(offset.length()) {
                    Ok(rotation)
                } else {
                    Ok(DMat4::from_translation(offset)
                        * rotation
                        * DMat4::from_translation(-offset))
                }
            }
        }
    }

    fn offset_meters(&self, path: &str, op: &ElementaryOp) -> TransformResult<DVec3> {
        if op.offset == DVec3::ZERO {
            return Ok(DVec3::ZERO);
        }
        let scale = self
            .units
            .to_meters(1.0, &op.offset_unit)
            .map_err(|e| TransformError::unit(path, e))?;
        Ok(op.offset * scale)
    }

    /// Product of every operation in the chain.
    pub fn compose(&self, chain: &Chain) -> TransformResult<DMat4> {
        let mut acc = DMat4::IDENTITY;
        for link in chain.links() {
            for op in &link.ops {
                acc *= self.op_matrix(&link.path, op)?;
            }
        }
        Ok(acc)
    }

    /// Accumulated matrix after each link of the chain, root first.
    ///
    /// The last entry equals [`Composer::compose`].
    pub fn compose_cumulative(&self, chain: &Chain) -> TransformResult<Vec<DMat4>> {
        let mut acc = DMat4::IDENTITY;
        let mut poses = Vec::with_capacity(chain.link_count());
        for link in chain.links() {
            for op in &link.ops {
                acc *= self.op_matrix(&link.path, op)?;
            }
            poses.push(acc);
        }
        Ok(poses)
    }
}

impl std::fmt::Debug for Composer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("handedness", &self.handedness)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ChainResolver;
    use crate::units::{UnitError, UnitTable};
    use nexus_tree::{GroupNode, GroupTree};
    use std::f64::consts::FRAC_PI_2;

    const TOL: f64 = 1e-12;

    fn composer() -> Composer<'static> {
        Composer::new(&UnitTable)
    }

    #[test]
    fn test_translation_matrix() {
        let op = ElementaryOp::translation(DVec3::new(0.0, 2.0, 0.0), 5.0, "mm");
        let m = composer().op_matrix("/x", &op).unwrap();
        assert!(m.abs_diff_eq(DMat4::from_translation(DVec3::new(0.0, 0.005, 0.0)), TOL));
    }

    #[test]
    fn test_translation_with_offset() {
        let op = ElementaryOp::translation(DVec3::X, 1.0, "m").with_offset(DVec3::Y, "cm");
        let m = composer().op_matrix("/x", &op).unwrap();
        assert!(m.abs_diff_eq(DMat4::from_translation(DVec3::new(1.0, 0.01, 0.0)), TOL));
    }

    #[test]
    fn test_rotation_matrix() {
        let op = ElementaryOp::rotation(DVec3::Z, 90.0, "deg");
        let m = composer().op_matrix("/r", &op).unwrap();
        let p = m.transform_point3(DVec3::X);
        assert!(p.abs_diff_eq(DVec3::Y, TOL));
    }

    #[test]
    fn test_rotation_about_offset_point() {
        let op = ElementaryOp::rotation(DVec3::Z, 180.0, "deg").with_offset(DVec3::X, "m");
        let m = composer().op_matrix("/r", &op).unwrap();
        // the offset point is fixed, the origin swings around it
        assert!(m.transform_point3(DVec3::X).abs_diff_eq(DVec3::X, TOL));
        assert!(m
            .transform_point3(DVec3::ZERO)
            .abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), TOL));
    }

    #[test]
    fn test_left_handed_negates_angle() {
        let op = ElementaryOp::rotation(DVec3::Z, 90.0, "deg");
        let m = composer()
            .with_handedness(Handedness::Left)
            .op_matrix("/r", &op)
            .unwrap();
        assert!(m.transform_point3(DVec3::X).abs_diff_eq(-DVec3::Y, TOL));
    }

    #[test]
    fn test_axis_is_normalized() {
        let op = ElementaryOp::translation(DVec3::new(0.0, 0.0, 10.0), 1.0, "m");
        let m = composer().op_matrix("/x", &op).unwrap();
        assert!(m.abs_diff_eq(DMat4::from_translation(DVec3::Z), TOL));
    }

    #[test]
    fn test_degenerate_axis() {
        let op = ElementaryOp::rotation(DVec3::ZERO, 10.0, "deg");
        assert_eq!(
            composer().op_matrix("/r", &op).unwrap_err(),
            TransformError::DegenerateAxis { path: "/r".into() }
        );
    }

    #[test]
    fn test_zero_axis_translation_keeps_offset() {
        let op = ElementaryOp::translation(DVec3::ZERO, 0.0, "m");
        let m = composer().op_matrix("/entry/x", &op).unwrap();
        assert!(m.abs_diff_eq(DMat4::IDENTITY, TOL));

        let op = ElementaryOp::translation(DVec3::ZERO, 5.0, "m")
            .with_offset(DVec3::new(0.0, 2.0, 0.0), "m");
        let m = composer().op_matrix("/entry/x", &op).unwrap();
        assert!(m.abs_diff_eq(DMat4::from_translation(DVec3::new(0.0, 2.0, 0.0)), TOL));
    }

    #[test]
    fn test_unknown_unit() {
        let op = ElementaryOp::translation(DVec3::X, 1.0, "parsec");
        let err = composer().op_matrix("/x", &op).unwrap_err();
        assert_eq!(
            err,
            TransformError::UnitConversion {
                path: "/x".into(),
                source: UnitError::Unknown {
                    unit: "parsec".into()
                },
            }
        );
    }

    #[test]
    fn test_centimeters_equal_meters() {
        let cm = ElementaryOp::translation(DVec3::X, 100.0, "cm");
        let m = ElementaryOp::translation(DVec3::X, 1.0, "m");
        let c = composer();
        assert!(c
            .op_matrix("/a", &cm)
            .unwrap()
            .abs_diff_eq(c.op_matrix("/b", &m).unwrap(), TOL));
    }

    #[test]
    fn test_chain_translate_then_rotate() {
        let mut tree = GroupTree::new();
        tree.insert(
            GroupNode::new("/entry/a").with_op(ElementaryOp::translation(DVec3::X, 1.0, "m")),
        )
        .unwrap();
        tree.insert(
            GroupNode::new("/entry/b")
                .with_op(ElementaryOp::rotation(DVec3::Z, 90.0, "deg"))
                .depends_on("/entry/a"),
        )
        .unwrap();

        let chain = ChainResolver::new(&tree, false).resolve("/entry/b").unwrap();
        let m = composer().compose(&chain).unwrap();
        let expected = DMat4::from_translation(DVec3::X) * DMat4::from_rotation_z(FRAC_PI_2);
        assert!(m.abs_diff_eq(expected, TOL));
    }

    #[test]
    fn test_empty_root_chain_is_identity() {
        let mut tree = GroupTree::new();
        tree.insert(GroupNode::target("/entry/c")).unwrap();
        let chain = ChainResolver::new(&tree, false).resolve("/entry/c").unwrap();
        assert_eq!(composer().compose(&chain).unwrap(), DMat4::IDENTITY);
    }

    #[test]
    fn test_cumulative_ends_with_full_pose() {
        let mut tree = GroupTree::new();
        tree.insert(
            GroupNode::new("/entry/a").with_op(ElementaryOp::translation(DVec3::X, 1.0, "m")),
        )
        .unwrap();
        tree.insert(
            GroupNode::new("/entry/b")
                .with_op(ElementaryOp::rotation(DVec3::Z, 30.0, "deg"))
                .depends_on("/entry/a"),
        )
        .unwrap();
        tree.insert(GroupNode::target("/entry/c").depends_on("/entry/b"))
            .unwrap();

        let chain = ChainResolver::new(&tree, false).resolve("/entry/c").unwrap();
        let c = composer();
        let poses = c.compose_cumulative(&chain).unwrap();
        assert_eq!(poses.len(), 3);
        assert!(poses[0].abs_diff_eq(DMat4::from_translation(DVec3::X), TOL));
        assert!(poses[2].abs_diff_eq(c.compose(&chain).unwrap(), TOL));
        assert_eq!(poses[1], poses[2]);
    }
}
