//! Lumen - render one of the built-in scenes to a PPM image.
//!
//! Set `RUST_LOG=debug` for detailed logs.

mod progress;

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lumen_renderer::{
    render_with, ImageBuffer, LogProgress, NoProgress, ProgressMonitor, RenderConfig, Scheduler,
};
use lumen_scenes::{SceneKind, SceneOptions};
use progress::BarProgress;

/// Lumen, a multi-threaded Monte Carlo path tracer
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    version,
    about = "Render a built-in scene to a plain-text PPM image",
    after_help = "EXAMPLES:\n  \
                  lumen --scene cornell-box --samples 200 -o cornell.ppm\n  \
                  lumen --scene final-scene -W 800 --scheduler buckets\n  \
                  lumen --scene two-spheres --samples 16 -o - > spheres.ppm"
)]
struct Cli {
    /// Scene to render
    #[arg(short, long, value_enum, default_value_t = SceneArg::RandomSpheres)]
    scene: SceneArg,

    /// Image width in pixels; the height follows the scene's aspect ratio
    #[arg(short = 'W', long, default_value_t = 400)]
    width: u32,

    /// Samples per pixel
    #[arg(long, default_value_t = 100)]
    samples: u32,

    /// Maximum number of bounces per path
    #[arg(long, default_value_t = 50)]
    max_depth: u32,

    /// Output file, or `-` for stdout
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// How work is split between threads
    #[arg(long, value_enum, default_value_t = SchedulerArg::Rows)]
    scheduler: SchedulerArg,

    /// Image wrapped around the globe in the earth and final scenes
    #[arg(long, default_value = "earthmap.jpg")]
    earth_texture: PathBuf,

    /// Hide progress output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneArg {
    RandomSpheres,
    TwoSpheres,
    TwoPerlinSpheres,
    Earth,
    SimpleLight,
    CornellBox,
    CornellSmoke,
    FinalScene,
}

impl From<SceneArg> for SceneKind {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::RandomSpheres => SceneKind::RandomSpheres,
            SceneArg::TwoSpheres => SceneKind::TwoSpheres,
            SceneArg::TwoPerlinSpheres => SceneKind::TwoPerlinSpheres,
            SceneArg::Earth => SceneKind::Earth,
            SceneArg::SimpleLight => SceneKind::SimpleLight,
            SceneArg::CornellBox => SceneKind::CornellBox,
            SceneArg::CornellSmoke => SceneKind::CornellSmoke,
            SceneArg::FinalScene => SceneKind::FinalScene,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchedulerArg {
    /// One band of rows per thread
    Rows,
    /// Square tiles from the center outward
    Buckets,
}

impl From<SchedulerArg> for Scheduler {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::Rows => Scheduler::Rows,
            SchedulerArg::Buckets => Scheduler::Buckets,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Lumen v{}", env!("CARGO_PKG_VERSION"));

    let options = SceneOptions {
        earth_texture: cli.earth_texture.clone(),
    };
    let scene = SceneKind::from(cli.scene).build(&options);
    let camera = scene.camera.build();

    let mut config = RenderConfig::for_aspect(cli.width.max(1), scene.aspect_ratio());
    config.samples_per_pixel = cli.samples.max(1);
    config.max_depth = cli.max_depth;
    config.threads = cli.threads;
    scene.configure(&mut config);

    let scheduler = Scheduler::from(cli.scheduler);
    let unit = match scheduler {
        Scheduler::Rows => "rows",
        Scheduler::Buckets => "buckets",
    };
    // Redirected stderr gets plain log lines instead of a redrawn bar
    let mut monitor: Box<dyn ProgressMonitor> = if cli.quiet {
        Box::new(NoProgress)
    } else if io::stderr().is_terminal() {
        Box::new(BarProgress::new(unit))
    } else {
        Box::new(LogProgress::new())
    };

    let start = Instant::now();
    let image = render_with(scheduler, &camera, scene.world.as_ref(), &config, monitor.as_mut())
        .context("Render failed")?;
    log::info!("Rendered in {:.2?}", start.elapsed());

    write_image(&image, &cli.output)
}

fn write_image(image: &ImageBuffer, output: &Path) -> Result<()> {
    if output == Path::new("-") {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        image
            .write_ppm(&mut lock)
            .context("Failed to write image to stdout")?;
        lock.flush().context("Failed to flush stdout")?;
        return Ok(());
    }

    image
        .save_ppm(output)
        .with_context(|| format!("Failed to write {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["lumen"]);
        assert_eq!(SceneKind::from(cli.scene), SceneKind::default());
        assert_eq!(Scheduler::from(cli.scheduler), Scheduler::Rows);
        assert_eq!(cli.width, 400);
        assert_eq!(cli.samples, 100);
        assert_eq!(cli.max_depth, 50);
        assert_eq!(cli.output, PathBuf::from("image.ppm"));
        assert!(cli.threads.is_none());
    }

    #[test]
    fn test_every_scene_is_selectable() {
        let kinds: Vec<SceneKind> = SceneArg::value_variants()
            .iter()
            .map(|&arg| SceneKind::from(arg))
            .collect();
        assert_eq!(kinds, SceneKind::ALL);

        let cli = Cli::parse_from(["lumen", "--scene", "cornell-smoke", "-j", "3", "--scheduler", "buckets"]);
        assert_eq!(SceneKind::from(cli.scene), SceneKind::CornellSmoke);
        assert_eq!(Scheduler::from(cli.scheduler), Scheduler::Buckets);
        assert_eq!(cli.threads, Some(3));
    }
}
