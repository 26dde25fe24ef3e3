use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use meshview::{window, ViewerConfig};

/// Views a glTF/GLB model with an orbit camera.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path or URL of the glTF/GLB mesh
    mesh: Option<String>,

    /// Path or URL of a JSON material library applied to the mesh
    material: Option<String>,

    /// TOML viewer configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let startup = args.mesh.map(|mesh_url| window::StartupLoad {
        mesh_url,
        material_url: args.material,
    });

    window::run(config, startup)
}
