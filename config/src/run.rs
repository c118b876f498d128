//! Run-wide options shared by every stage of the pipeline.
//!
//! A single [`RunConfig`] value is created per invocation and threaded through
//! resolution, placement and scene assembly. Nothing here is global state, so
//! repeated or concurrent runs in one process cannot interfere.

use std::fmt;

use crate::constants::{DEFAULT_PROCESS_GROUP, DEFAULT_SHAPE_SIZE};

/// Immutable snapshot of the options controlling one resolution run.
///
/// # Examples
/// ```
/// use config::RunConfig;
/// let run = RunConfig::default();
/// assert!(!run.include_process);
/// assert!(!run.left_handed);
/// assert!(run.shape_size > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Emit components below the process subtree.
    pub include_process: bool,
    /// Materialize every ancestor on a chain as its own scene node.
    pub retain_intermediate: bool,
    /// Apply rotations left-handedly.
    pub left_handed: bool,
    /// Pre-multiply every pose by the fixed viewer remap rotation.
    pub viewer_remap: bool,
    /// Edge length of placeholder shapes in meters.
    pub shape_size: f64,
    /// Name of the process group directly below an entry.
    pub process_group: String,
}

impl RunConfig {
    /// Builds a configuration with the given shape size, validating it.
    ///
    /// # Examples
    /// ```
    /// use config::{ConfigError, RunConfig};
    /// let run = RunConfig::with_shape_size(0.25).expect("valid size");
    /// assert_eq!(run.shape_size, 0.25);
    /// assert_eq!(
    ///     RunConfig::with_shape_size(0.0).unwrap_err(),
    ///     ConfigError::InvalidShapeSize(0.0)
    /// );
    /// ```
    pub fn with_shape_size(shape_size: f64) -> Result<Self, ConfigError> {
        let run = Self {
            shape_size,
            ..Self::default()
        };
        run.validate()?;
        Ok(run)
    }

    /// Checks that every option holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.shape_size.is_finite() && self.shape_size > 0.0) {
            return Err(ConfigError::InvalidShapeSize(self.shape_size));
        }
        if self.process_group.is_empty() || self.process_group.contains('/') {
            return Err(ConfigError::InvalidProcessGroup(self.process_group.clone()));
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            include_process: false,
            retain_intermediate: false,
            left_handed: false,
            viewer_remap: false,
            shape_size: DEFAULT_SHAPE_SIZE,
            process_group: DEFAULT_PROCESS_GROUP.to_string(),
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the shape size is zero, negative or not finite.
    InvalidShapeSize(f64),
    /// Raised when the process group name is empty or contains a separator.
    InvalidProcessGroup(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidShapeSize(value) => {
                write!(f, "shape size must be > 0: {value}")
            }
            ConfigError::InvalidProcessGroup(value) => {
                write!(f, "process group must be a single non-empty name: `{value}`")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
