use anyhow::{Context, Result};
use bouncing_shapes::palette::{Color, PASTEL, VIBRANT};
use bouncing_shapes::raster::{apply_opacity, fit_within};
use bouncing_shapes::{
    AnimationConfig, Animator, CanvasAction, DrawingCanvas, Scene, ShapeKind, Typeface,
    INITIAL_SHAPES, MAX_SHAPES,
};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Bouncing shapes - animate gradient shapes and export the frames as images
///
/// Runs the animation panel headless: a fixed number of ticks is simulated
/// and the resulting frames are written to an output directory.
#[derive(Parser)]
#[command(name = "bouncing-shapes")]
#[command(about = "Animate bouncing gradient shapes and export the frames", long_about = None)]
#[command(version)]
struct Args {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 400)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 300)]
    height: u32,

    /// Number of shapes to animate (at most 20)
    #[arg(short = 'n', long, default_value_t = INITIAL_SHAPES)]
    shapes: usize,

    /// Restrict the random shapes to these kinds (circle, square, triangle, star)
    #[arg(short, long, value_delimiter = ',')]
    kinds: Vec<String>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 120)]
    frames: usize,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 16)]
    interval_ms: u64,

    /// Save a frame every N ticks (the last tick is always saved)
    #[arg(long, default_value_t = 1)]
    save_interval: usize,

    /// Output directory for the rendered frames
    #[arg(short, long, default_value = "./frames")]
    output: PathBuf,

    /// Image format of the exported frames
    #[arg(long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,

    /// Seed for the random shapes; omit for a different animation every run
    #[arg(long)]
    seed: Option<u64>,

    /// Image drawn behind the shapes (shrunk to fit the panel)
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Opacity of the background image, 0.0-1.0
    #[arg(long, default_value_t = 0.35)]
    background_opacity: f32,

    /// Draw a rounded frame around the panel with this corner radius
    #[arg(long)]
    frame_radius: Option<f32>,

    /// Wait one interval between ticks, like a live timer would
    #[arg(long)]
    realtime: bool,

    /// Number of threads used to render frames (defaults to all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// TrueType/OpenType font for the panel title and canvas text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Also paint the drawing canvas and save it to this file
    #[arg(long)]
    canvas: Option<PathBuf>,

    /// Canvas actions in order (rect, ellipse, line, text, rainbow, clear)
    #[arg(long, value_delimiter = ',')]
    canvas_actions: Vec<String>,

    /// Pick a random color from this palette before each canvas action
    #[arg(long, value_enum)]
    palette: Option<Palette>,

    /// Canvas pen width in pixels
    #[arg(long, default_value_t = 3.0)]
    line_width: f32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Palette {
    Pastel,
    Vibrant,
}

impl Palette {
    fn colors(self) -> &'static [Color] {
        match self {
            Palette::Pastel => &PASTEL,
            Palette::Vibrant => &VIBRANT,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Png,
    Jpg,
    Bmp,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Bmp => "bmp",
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .context("failed to configure thread pool")?;
        log::info!("rendering with {} thread(s)", num_threads);
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create output directory {}", args.output.display()))?;

    let kinds = args
        .kinds
        .iter()
        .map(|kind| kind.parse::<ShapeKind>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(anyhow::Error::msg)?;

    let backdrop = match &args.background {
        Some(path) => {
            let image = image::open(path)
                .with_context(|| format!("cannot load background image {}", path.display()))?
                .to_rgba8();
            let fitted = fit_within(
                &image,
                args.width.saturating_sub(20),
                args.height.saturating_sub(20),
            );
            Some(apply_opacity(&fitted, args.background_opacity))
        }
        None => None,
    };

    let typeface = match &args.font {
        Some(path) => Some(
            Typeface::open(path).with_context(|| format!("cannot use font {}", path.display()))?,
        ),
        None => None,
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(path) = &args.canvas {
        paint_canvas(&args, path, typeface.as_ref(), &mut rng)?;
    }

    let interval = Duration::from_millis(args.interval_ms);
    let config = AnimationConfig {
        width: args.width,
        height: args.height,
        initial_shapes: args.shapes.min(INITIAL_SHAPES),
        max_shapes: MAX_SHAPES,
        interval,
        frame_radius: args.frame_radius,
        kinds,
        title_font: typeface,
        ..AnimationConfig::default()
    };

    let mut animator = Animator::new(config, &mut rng);
    // Shapes beyond the initial set go through the capacity guard one by one
    while animator.scene().len() < args.shapes {
        if animator.add_random(&mut rng).is_err() {
            break;
        }
    }

    log::info!("viewport: {}x{}", args.width, args.height);
    log::info!("shapes: {}", animator.scene().len());
    log::info!("ticks: {} every {} ms", args.frames, args.interval_ms);
    log::info!("output: {}", args.output.display());

    // Simulation is strictly sequential: one tick after another
    let save_interval = args.save_interval.max(1);
    let mut snapshots: Vec<(usize, Scene)> = Vec::new();

    let pb = progress_bar(args.frames as u64)?;
    pb.set_message("simulating");
    for frame in 0..args.frames {
        if args.realtime {
            thread::sleep(interval);
        }
        animator.tick(args.width, args.height);

        if frame % save_interval == 0 || frame + 1 == args.frames {
            snapshots.push((frame, animator.scene().clone()));
        }
        pb.inc(1);
    }
    pb.finish_with_message("simulation done");

    // Snapshots are independent, so they can be rendered in parallel
    let extension = args.format.extension();
    let pb = progress_bar(snapshots.len() as u64)?;
    pb.set_message("rendering");
    snapshots.par_iter().try_for_each(|(frame, scene)| -> Result<()> {
        let path = frame_path(&args.output, *frame, extension);
        animator
            .render_scene(scene, backdrop.as_ref())
            .save(&path)
            .with_context(|| format!("cannot save {}", path.display()))?;
        pb.inc(1);
        Ok(())
    })?;
    pb.finish_with_message("rendering done");

    // The last tick is always among the snapshots; reuse its file
    let latest = args.output.join(format!("latest.{}", extension));
    match snapshots.last() {
        Some((frame, _)) => {
            let last = frame_path(&args.output, *frame, extension);
            fs::copy(&last, &latest)
                .with_context(|| format!("cannot copy {} to {}", last.display(), latest.display()))?;
        }
        None => animator
            .render_scene(animator.scene(), backdrop.as_ref())
            .save(&latest)
            .with_context(|| format!("cannot save {}", latest.display()))?,
    }

    log::info!(
        "wrote {} frame(s) covering {:.2}s of animation",
        snapshots.len(),
        animator.elapsed().as_secs_f32()
    );
    log::info!("latest frame: {}", latest.display());

    Ok(())
}

fn frame_path(dir: &Path, frame: usize, extension: &str) -> PathBuf {
    dir.join(format!("frame_{:05}.{}", frame, extension))
}

/// Run the requested canvas actions on a fresh canvas and save it
fn paint_canvas(
    args: &Args,
    path: &Path,
    typeface: Option<&Typeface>,
    rng: &mut StdRng,
) -> Result<()> {
    let actions = if args.canvas_actions.is_empty() {
        CanvasAction::DEFAULT.to_vec()
    } else {
        args.canvas_actions
            .iter()
            .map(|action| action.parse::<CanvasAction>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(anyhow::Error::msg)?
    };

    let mut canvas = DrawingCanvas::new(args.width, args.height);
    canvas.set_line_width(args.line_width);
    for action in actions {
        if let Some(palette) = args.palette {
            if let Some(color) = palette.colors().choose(rng) {
                canvas.set_color(*color);
            }
        }
        canvas
            .apply(action, rng, typeface)
            .with_context(|| format!("canvas action '{}' failed", action))?;
    }

    canvas
        .save(path)
        .with_context(|| format!("cannot save {}", path.display()))?;
    log::info!("canvas: {}", path.display());
    Ok(())
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}
