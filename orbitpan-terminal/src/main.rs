/// orbitpan terminal demo
///
/// Controls:
///   - Left-drag on the object: pan it parallel to the screen
///   - Right-drag on the object: rotate it like a trackball
///   - R: reset, Q/ESC: quit
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use orbitpan_core::{obj, ManipulatorConfig, Mesh, RotateMissPolicy};
use orbitpan_terminal::TerminalApp;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "orbitpan-terminal")]
#[clap(about = "Pan and rotate a mesh with the mouse, in the terminal", version)]
struct Args {
    /// Wavefront OBJ file to load (defaults to a cube)
    #[clap(long)]
    obj: Option<PathBuf>,

    /// Largest rotation accepted from one mouse move, in degrees (0 disables)
    #[clap(long, default_value_t = 45.0)]
    max_rotation_step: f32,

    /// Keep the last cursor position when a rotate move misses the object
    #[clap(long)]
    hold_cursor_on_miss: bool,

    /// Target frame rate
    #[clap(long, default_value_t = 30)]
    fps: u32,

    /// Write logs here (filtered by RUST_LOG, default "info")
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn manipulator_config(&self) -> ManipulatorConfig {
        let max_step = (self.max_rotation_step > 0.0).then(|| self.max_rotation_step.to_radians());
        let policy = if self.hold_cursor_on_miss {
            RotateMissPolicy::HoldCursor
        } else {
            RotateMissPolicy::AdvanceCursor
        };
        ManipulatorConfig::default()
            .with_max_rotation_step(max_step)
            .with_rotate_miss_policy(policy)
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The alternate screen owns stdout, so logs only go to a file.
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let mesh = match &args.obj {
        Some(path) => obj::load_obj(path).with_context(|| format!("loading {}", path.display()))?,
        None => Mesh::cube(1.0),
    };
    info!(triangles = mesh.triangles.len(), config = ?args.manipulator_config(), "starting");

    let mut app = TerminalApp::new(mesh, args.manipulator_config(), args.fps)?;
    app.run()?;

    info!("exited cleanly");
    Ok(())
}
