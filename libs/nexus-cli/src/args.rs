//! Command-line arguments and their validation.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use config::constants::{DEFAULT_OUTPUT, DEFAULT_SHAPE_SIZE};
use config::{ConfigError, RunConfig};
use nexus_export::{ExportError, OutputFormat};
use nexus_scene::Shape;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "nexus3d")]
#[command(about = "Create a glb/gltf or stl scene from a NeXus transformation tree")]
#[command(version)]
pub struct Args {
    /// NeXus file hierarchy dumped as JSON.
    pub file: PathBuf,

    /// Output file; the format follows the extension (.stl, .gltf, .glb).
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// JSON config placing mesh files at components.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Edge length of the placeholder shapes in meters.
    #[arg(short, long, default_value_t = DEFAULT_SHAPE_SIZE)]
    pub size: f64,

    /// Overwrite the output file if it exists.
    #[arg(short, long)]
    pub force: bool,

    /// Include components inside /entry/process.
    #[arg(long)]
    pub include_process: bool,

    /// Store every intermediate transformation as its own node.
    /// Only meaningful for gltf or glb files.
    #[arg(long)]
    pub store_intermediate: bool,

    /// Placeholder shape drawn at each component.
    #[arg(long, default_value_t = Shape::Cone)]
    pub shape: Shape,

    /// Rotate the coordinate system by -90 degrees about x for Blender.
    #[arg(long)]
    pub blender: bool,

    /// Apply rotations left-handedly.
    #[arg(short, long)]
    pub left_handed: bool,

    /// Do not draw the beam line into gltf or glb files.
    #[arg(long)]
    pub no_beam: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Problems with the command line found before any work is done.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("File `{}` does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("`{}` is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("File `{}` already exists. Use -f to overwrite", .0.display())]
    OutputExists(PathBuf),

    #[error(transparent)]
    UnsupportedOutput(#[from] ExportError),

    #[error("Config file `{}` does not exist or is not a file", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Config file `{}` must be a json file", .0.display())]
    ConfigNotJson(PathBuf),

    #[error(transparent)]
    Run(#[from] ConfigError),
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

impl Args {
    /// Checks paths and options, returning the output format.
    pub fn validate(&self) -> Result<OutputFormat, UsageError> {
        if !self.file.exists() {
            return Err(UsageError::InputNotFound(self.file.clone()));
        }
        if !self.file.is_file() {
            return Err(UsageError::NotAFile(self.file.clone()));
        }
        if self.output.exists() && !self.force {
            return Err(UsageError::OutputExists(self.output.clone()));
        }
        let format = OutputFormat::from_path(&self.output)?;

        if let Some(config) = &self.config {
            if !config.is_file() {
                return Err(UsageError::ConfigNotFound(config.clone()));
            }
            if !has_extension(config, "json") {
                return Err(UsageError::ConfigNotJson(config.clone()));
            }
        }

        self.run_config()?;
        Ok(format)
    }

    /// Run-wide options selected by the flags.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let run = RunConfig {
            include_process: self.include_process,
            retain_intermediate: self.store_intermediate,
            left_handed: self.left_handed,
            viewer_remap: self.blender,
            shape_size: self.size,
            ..RunConfig::default()
        };
        run.validate()?;
        Ok(run)
    }

    /// Default log filter for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
