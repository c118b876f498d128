//! nexus3d command-line interface.
//!
//! Create a glb/gltf or stl scene from a NeXus transformation tree:
//! ```sh
//! nexus3d scan.json
//! nexus3d scan.json -o experiment.stl -s 0.05 --shape cube
//! nexus3d scan.json -c placement.json --store-intermediate --blender
//! ```

mod args;
mod pipeline;

use args::Args;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; RUST_LOG overrides -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let summary = pipeline::run(&args)?;

    println!(
        "Wrote {} components ({} nodes) as {} to {}",
        summary.components,
        summary.nodes,
        summary.format,
        args.output.display()
    );
    if summary.dropped > 0 {
        println!("{} components dropped, see log for details", summary.dropped);
    }
    if summary.issues > 0 {
        println!("{} placement config problems, see log for details", summary.issues);
    }
    Ok(())
}
