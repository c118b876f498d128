//! End-to-end run: read tree, resolve, place, assemble, export.

use std::path::Path;

use anyhow::Context;
use glam::DVec3;
use nexus_export::{export_scene, GltfOptions, OutputFormat};
use nexus_scene::{PlacementConfig, PlacementPlanner, SceneBuilder, StlLoader};
use nexus_transform::{resolve_tree, UnitTable};
use nexus_tree::GroupTree;
use tracing::{info, warn};

use crate::args::Args;

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Format that was written.
    pub format: OutputFormat,
    /// Components placed into the scene.
    pub components: usize,
    /// Scene nodes below the root.
    pub nodes: usize,
    /// Components dropped because their chain could not be composed.
    pub dropped: usize,
    /// Recoverable placement problems.
    pub issues: usize,
}

/// Runs the whole pipeline for parsed arguments.
pub fn run(args: &Args) -> anyhow::Result<Summary> {
    args.validate()?;
    let run = args.run_config()?;

    let tree = GroupTree::from_path(&args.file, &run.process_group)
        .with_context(|| format!("reading {}", args.file.display()))?;
    info!(groups = tree.len(), "loaded transformation tree");

    let resolved = resolve_tree(&tree, &run, &UnitTable)
        .context("resolving transformation chains")?;

    let config = args
        .config
        .as_deref()
        .map(PlacementConfig::from_path)
        .transpose()?;
    let loader = match args.config.as_deref().and_then(Path::parent) {
        Some(dir) => StlLoader::with_base_dir(dir),
        None => StlLoader::new(),
    };

    let mut planner = PlacementPlanner::new(&run, &loader, &UnitTable).with_shape(args.shape);
    if let Some(config) = &config {
        planner = planner.with_config(config);
    }
    let plan = planner.plan(&resolved)?;
    let issues = plan.issues.len();
    let components = plan.targets().count();
    if run.retain_intermediate && !OutputFormat::from_path(&args.output)?.is_hierarchical() {
        warn!("intermediate nodes are flattened in stl output");
    }

    let scene = SceneBuilder::new().build(plan);

    let mut options = GltfOptions::default();
    if !args.no_beam {
        // NeXus beam travels along -z
        options = options.with_beam(resolved.convention.apply_vector(-DVec3::Z));
    }
    let format = export_scene(&scene, &args.output, &options)?;

    Ok(Summary {
        format,
        components,
        nodes: scene.node_count(),
        dropped: resolved.failures.len(),
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn fixture() -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../nexus-tree/tests/data/transformation_example.json")
            .display()
            .to_string()
    }

    fn args(extra: &[&str]) -> Args {
        let file = fixture();
        let argv = ["nexus3d", file.as_str()].into_iter().chain(extra.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_writes_glb() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("experiment.glb");
        let summary = run(&args(&["-o", output.to_str().unwrap()])).unwrap();

        assert_eq!(summary.format, OutputFormat::Glb);
        assert_eq!(summary.components, 3);
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.dropped, 0);
        assert!(output.exists());
    }

    #[test]
    fn test_store_intermediate_and_process() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("experiment.gltf");
        let summary = run(&args(&[
            "-o",
            output.to_str().unwrap(),
            "--store-intermediate",
            "--include-process",
        ]))
        .unwrap();

        assert_eq!(summary.components, 4);
        // 12 instrument and sample groups, the calibration shift, 4 components
        assert_eq!(summary.nodes, 17);
        assert!(dir.path().join("experiment.bin").exists());
    }

    #[test]
    fn test_config_with_mesh_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("holder.stl"),
            "solid h\nfacet normal 0 0 1\n outer loop\n  vertex 0 0 0\n  vertex 1 0 0\n  vertex 0 1 0\n endloop\nendfacet\nendsolid h\n",
        )
        .unwrap();
        let config = dir.path().join("placement.json");
        std::fs::write(
            &config,
            r#"{"sample": {"file": "holder.stl", "unit": "mm"}, "nowhere": {}}"#,
        )
        .unwrap();
        let output = dir.path().join("experiment.stl");

        let summary = run(&args(&[
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(summary.format, OutputFormat::Stl);
        assert_eq!(summary.issues, 1);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("experiment.glb");
        std::fs::write(&output, b"keep").unwrap();

        let err = run(&args(&["-o", output.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read(&output).unwrap(), b"keep");
    }
}
