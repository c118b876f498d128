//! # Configuration Constants
//!
//! Centralized constants for the nexus3d pipeline. Precision values, NeXus
//! naming conventions, default shape parameters and output defaults are
//! defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **NeXus**: Path sentinels and attribute names
//! - **Shapes**: Default placeholder geometry
//! - **Axis**: Viewer remap parameters
//! - **Output**: Default output file and supported extensions

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Minimum squared length for a rotation or translation axis.
///
/// Axis vectors shorter than this cannot be normalized and are rejected as
/// degenerate.
pub const MIN_AXIS_LENGTH_SQUARED: f64 = 1e-24;

/// Epsilon for zero-area triangle detection in mesh validation.
pub const VERTEX_MERGE_EPSILON: f64 = 1e-12;

// =============================================================================
// NEXUS CONVENTIONS
// =============================================================================

/// Value of `depends_on` marking the end of a transformation chain.
///
/// # Example
///
/// ```rust
/// use config::constants::ROOT_SENTINEL;
///
/// let depends_on = ".";
/// assert_eq!(depends_on, ROOT_SENTINEL);
/// ```
pub const ROOT_SENTINEL: &str = ".";

/// Name of the field or attribute holding a chain reference.
pub const DEPENDS_ON: &str = "depends_on";

/// Attribute holding the transformation kind (`translation` / `rotation`).
pub const TRANSFORMATION_TYPE: &str = "transformation_type";

/// Attribute holding the axis direction of a transformation.
pub const VECTOR: &str = "vector";

/// Attribute holding the unit of a transformation magnitude.
pub const UNITS: &str = "units";

/// Attribute holding the fixed offset of a transformation.
pub const OFFSET: &str = "offset";

/// Attribute holding the unit of the offset vector.
pub const OFFSET_UNITS: &str = "offset_units";

/// Name of the group (directly below an entry) holding processing steps.
///
/// Components inside this subtree are excluded from the scene unless
/// processing transformations are explicitly included.
pub const DEFAULT_PROCESS_GROUP: &str = "process";

/// Default unit for translation magnitudes and offsets.
pub const DEFAULT_LENGTH_UNIT: &str = "m";

/// Default unit for rotation magnitudes.
pub const DEFAULT_ANGLE_UNIT: &str = "deg";

// =============================================================================
// SHAPE CONSTANTS
// =============================================================================

/// Default edge length of placeholder shapes in meters.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_SHAPE_SIZE;
///
/// let user_size: Option<f64> = None;
/// assert_eq!(user_size.unwrap_or(DEFAULT_SHAPE_SIZE), 0.1);
/// ```
pub const DEFAULT_SHAPE_SIZE: f64 = 0.1;

/// Number of segments on the base ring of the placeholder cone.
pub const CONE_SEGMENTS: u32 = 10;

/// Height-to-radius ratio of the placeholder cone.
pub const CONE_ASPECT_RATIO: f64 = 2.0;

/// Stretch applied to the base ring along local x so the cone shows its
/// orientation around the z-axis.
pub const CONE_X_MARKER: f64 = 1.3;

// =============================================================================
// AXIS CONSTANTS
// =============================================================================

/// Angle in degrees of the viewer remap rotation about the x-axis.
///
/// Maps the NeXus convention (y up, beam along z) onto Z-up viewers such as
/// Blender.
pub const VIEWER_REMAP_ANGLE_DEG: f64 = -90.0;

// =============================================================================
// OUTPUT CONSTANTS
// =============================================================================

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "experiment.glb";

/// File extensions accepted for output (without the leading dot).
pub const SUPPORTED_OUTPUT_EXTENSIONS: [&str; 3] = ["stl", "gltf", "glb"];

/// Name of the synthetic root node of every scene.
pub const SCENE_ROOT_NAME: &str = "root";

/// Default color when none is specified (light gray).
///
/// RGBA values in range [0.0, 1.0].
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if a f64 value is approximately zero within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Returns true if `extension` (without dot, any case) is a supported output.
///
/// # Example
///
/// ```rust
/// use config::constants::is_supported_output;
///
/// assert!(is_supported_output("GLB"));
/// assert!(!is_supported_output("obj"));
/// ```
pub fn is_supported_output(extension: &str) -> bool {
    SUPPORTED_OUTPUT_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}
