//! # Units
//!
//! Conversion of magnitudes to meters and radians.
//!
//! The composer only sees the [`UnitConverter`] trait; [`UnitTable`] is the
//! built-in implementation covering the unit strings found in NeXus files.

use thiserror::Error;

/// Physical dimension a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Length, converted to meters.
    Length,
    /// Plane angle, converted to radians.
    Angle,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Length => f.write_str("length"),
            Dimension::Angle => f.write_str("angle"),
        }
    }
}

/// Errors raised when a unit string cannot be converted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The unit string is not known at all.
    #[error("Unknown unit `{unit}`")]
    Unknown { unit: String },

    /// The unit is known but measures something else.
    #[error("Unit `{unit}` is not a {expected} unit")]
    WrongDimension { unit: String, expected: Dimension },
}

/// Converts magnitudes given with a unit string into SI base units.
///
/// Implementations must be shareable across threads; chains are composed in
/// parallel against one converter.
pub trait UnitConverter: Send + Sync {
    /// Converts a length to meters.
    fn to_meters(&self, magnitude: f64, unit: &str) -> Result<f64, UnitError>;

    /// Converts an angle to radians.
    fn to_radians(&self, magnitude: f64, unit: &str) -> Result<f64, UnitError>;
}

// =============================================================================
// UNIT TABLE
// =============================================================================

const LENGTH_UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("meter", 1.0),
    ("meters", 1.0),
    ("metre", 1.0),
    ("metres", 1.0),
    ("km", 1e3),
    ("cm", 1e-2),
    ("centimeter", 1e-2),
    ("centimeters", 1e-2),
    ("mm", 1e-3),
    ("millimeter", 1e-3),
    ("millimeters", 1e-3),
    ("um", 1e-6),
    ("µm", 1e-6),
    ("μm", 1e-6),
    ("micrometer", 1e-6),
    ("micrometers", 1e-6),
    ("micron", 1e-6),
    ("nm", 1e-9),
    ("nanometer", 1e-9),
    ("nanometers", 1e-9),
    ("pm", 1e-12),
    ("angstrom", 1e-10),
    ("angstroms", 1e-10),
    ("Å", 1e-10),
    ("A", 1e-10),
    ("in", 0.0254),
    ("inch", 0.0254),
    ("ft", 0.3048),
];

const ANGLE_UNITS: &[(&str, f64)] = &[
    ("rad", 1.0),
    ("radian", 1.0),
    ("radians", 1.0),
    ("mrad", 1e-3),
    ("urad", 1e-6),
    ("µrad", 1e-6),
    ("deg", std::f64::consts::PI / 180.0),
    ("degree", std::f64::consts::PI / 180.0),
    ("degrees", std::f64::consts::PI / 180.0),
    ("°", std::f64::consts::PI / 180.0),
];

/// Table-driven [`UnitConverter`] for common length and angle units.
///
/// Symbols match exactly, so `Mm` is not `mm`. Spelled-out names such as
/// `Meter` or `DEGREES` also match ignoring ASCII case.
///
/// # Example
///
/// ```rust
/// use nexus_transform::{UnitConverter, UnitTable};
///
/// let units = UnitTable;
/// assert!((units.to_meters(100.0, "cm").unwrap() - 1.0).abs() < 1e-12);
/// assert!(units.to_radians(1.0, "mm").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitTable;

impl UnitTable {
    fn factor(unit: &str, dimension: Dimension) -> Result<f64, UnitError> {
        let unit = unit.trim();
        let (table, other) = match dimension {
            Dimension::Length => (LENGTH_UNITS, ANGLE_UNITS),
            Dimension::Angle => (ANGLE_UNITS, LENGTH_UNITS),
        };

        if let Some(factor) = lookup(table, unit) {
            return Ok(factor);
        }
        if lookup(other, unit).is_some() {
            return Err(UnitError::WrongDimension {
                unit: unit.to_string(),
                expected: dimension,
            });
        }
        Err(UnitError::Unknown {
            unit: unit.to_string(),
        })
    }
}

/// Shortest spelled-out name in the tables; anything shorter is a symbol.
const MIN_WORD_LENGTH: usize = 4;

fn lookup(table: &[(&str, f64)], unit: &str) -> Option<f64> {
    table
        .iter()
        .find(|(name, _)| *name == unit)
        .or_else(|| {
            table.iter().find(|(name, _)| {
                name.len() >= MIN_WORD_LENGTH && name.eq_ignore_ascii_case(unit)
            })
        })
        .map(|(_, factor)| *factor)
}

impl UnitConverter for UnitTable {
    fn to_meters(&self, magnitude: f64, unit: &str) -> Result<f64, UnitError> {
        Ok(magnitude * Self::factor(unit, Dimension::Length)?)
    }

    fn to_radians(&self, magnitude: f64, unit: &str) -> Result<f64, UnitError> {
        Ok(magnitude * Self::factor(unit, Dimension::Angle)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centimeters_to_meters() {
        assert_relative_eq!(UnitTable.to_meters(100.0, "cm").unwrap(), 1.0);
    }

    #[test]
    fn test_millimeters_to_meters() {
        assert_relative_eq!(
            UnitTable.to_meters(34.82, "mm").unwrap(),
            0.03482,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degrees_to_radians() {
        assert_relative_eq!(
            UnitTable.to_radians(180.0, "deg").unwrap(),
            std::f64::consts::PI
        );
    }

    #[test]
    fn test_spelled_out_names_ignore_case() {
        assert_relative_eq!(UnitTable.to_meters(1.0, "Meter").unwrap(), 1.0);
        assert_relative_eq!(
            UnitTable.to_radians(180.0, " DEGREES ").unwrap(),
            std::f64::consts::PI
        );
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        for unit in ["Mm", "MM", "Nm", "a", "Rad"] {
            assert!(UnitTable.to_meters(1.0, unit).is_err(), "{unit}");
        }
        assert!(UnitTable.to_radians(1.0, "Rad").is_err());
        assert_relative_eq!(UnitTable.to_meters(1.0, "A").unwrap(), 1e-10);
    }

    #[test]
    fn test_unknown_unit() {
        let err = UnitTable.to_meters(1.0, "furlong").unwrap_err();
        assert_eq!(
            err,
            UnitError::Unknown {
                unit: "furlong".into()
            }
        );
    }

    #[test]
    fn test_wrong_dimension() {
        let err = UnitTable.to_meters(1.0, "deg").unwrap_err();
        assert!(matches!(
            err,
            UnitError::WrongDimension {
                expected: Dimension::Length,
                ..
            }
        ));
    }
}
