#![warn(clippy::all)]

//! Toroidal Game of Life driven by one of three parallel backends.
//!
//! ```bash
//! # 2048x2048 field, 2000 generations, 8 explicit worker threads
//! torus-life --backend pool --workers 8
//!
//! # 4 message-passing ranks, headless, random field
//! torus-life --backend distributed --workers 4 --render none --pattern random --seed 7
//! ```

use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use torus_life::{
    classic_seed, parse_rle, random_seed, run, BackendKind, Grid, Observer, Report, SimConfig,
    TextObserver,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    /// Message-passing ranks without shared memory
    Distributed,
    /// Fork-join over a rayon pool
    Shared,
    /// Explicit worker threads and a barrier
    Pool,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Distributed => BackendKind::Distributed,
            BackendArg::Shared => BackendKind::SharedMemory,
            BackendArg::Pool => BackendKind::WorkerPool,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PatternArg {
    /// Glider and R-pentomino
    Classic,
    /// Uniformly random cells, see --density and --seed
    Random,
    /// RLE file given by --rle
    Rle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RenderArg {
    None,
    Text,
    Window,
}

/// Conway's Game of Life on a torus
#[derive(Parser, Debug)]
#[command(name = "torus-life")]
#[command(version, about, long_about = None)]
struct Args {
    /// Concurrency strategy
    #[arg(short, long, value_enum, default_value = "pool")]
    backend: BackendArg,

    /// Side of the square field in cells
    #[arg(short, long, default_value = "2048")]
    size: usize,

    /// Number of generations to compute
    #[arg(short, long, default_value = "2000")]
    generations: u64,

    /// Worker threads, or number of ranks for the distributed backend.
    /// Defaults to the available parallelism.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Initial field
    #[arg(short, long, value_enum, default_value = "classic")]
    pattern: PatternArg,

    /// RLE file placed at the top-left corner
    #[arg(long, required_if_eq("pattern", "rle"))]
    rle: Option<PathBuf>,

    /// Fraction of alive cells for the random pattern
    #[arg(long, default_value = "0.3")]
    density: f64,

    /// Random seed for the random pattern. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Render collaborator
    #[arg(short, long, value_enum, default_value = "window")]
    render: RenderArg,

    /// Minimum time each rendered generation stays in the window
    #[arg(long, default_value = "500")]
    frame_delay_ms: u64,
}

fn seed_grid(args: &Args) -> Result<Grid> {
    let (rows, cols) = (args.size, args.size);
    let grid = match args.pattern {
        PatternArg::Classic => classic_seed(rows, cols)?,
        PatternArg::Random => random_seed(rows, cols, args.density, args.seed)?,
        PatternArg::Rle => {
            let path = args
                .rle
                .as_ref()
                .ok_or_else(|| anyhow!("--rle is required for the rle pattern"))?;
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_rle(&data, rows, cols)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
    };
    Ok(grid)
}

fn run_headless(
    kind: BackendKind,
    config: SimConfig,
    seed: Grid,
    observer: Option<&mut dyn Observer>,
) -> Result<Report> {
    let (report, _) = run(kind, config, seed, observer)?;
    Ok(report)
}

fn run_windowed(
    kind: BackendKind,
    config: SimConfig,
    seed: Grid,
    frame_delay: Duration,
) -> Result<Report> {
    use eframe::egui::{vec2, ViewportBuilder};

    let closed = Arc::new(AtomicBool::new(false));
    let (result_tx, result_rx) = crossbeam::channel::bounded(1);
    let title = format!("{kind}: {}x{}, {} workers", config.rows, config.cols, config.workers);

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size(vec2(1160., 880.))
            .with_min_inner_size(vec2(640.0, 360.0)),
        follow_system_theme: false,
        default_theme: eframe::Theme::Light,
        ..Default::default()
    };
    let app_closed = Arc::clone(&closed);
    eframe::run_native(
        "Game of Life",
        options,
        Box::new(move |cc| {
            let (app, mut observer) =
                torus_life::App::new(&cc.egui_ctx, title, app_closed, frame_delay);
            std::thread::Builder::new()
                .name("life-simulation".to_string())
                .spawn(move || {
                    let result = torus_life::run_observed(kind, config, seed, &mut observer);
                    let _ = result_tx.send(result);
                })?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow!("failed to open window: {err}"))?;

    // The event loop is over; an interruptible run stops at the next generation.
    closed.store(true, Ordering::Relaxed);
    let (report, _) = result_rx
        .recv()
        .context("simulation thread exited without a result")??;
    Ok(report)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,torus_life=info")),
        )
        .init();

    let args = Args::parse();
    let workers = args.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });
    let kind = BackendKind::from(args.backend);
    let config = SimConfig::square(args.size, args.generations, workers);
    config.validate().context("invalid configuration")?;

    let seed = seed_grid(&args)?;
    info!(
        backend = %kind,
        size = args.size,
        generations = args.generations,
        workers,
        alive = seed.alive_count(),
        "seeded field"
    );

    let report = match args.render {
        RenderArg::None => run_headless(kind, config, seed, None)?,
        RenderArg::Text => {
            let mut observer = TextObserver::new(std::io::stdout().lock());
            run_headless(kind, config, seed, Some(&mut observer))?
        }
        RenderArg::Window => {
            run_windowed(kind, config, seed, Duration::from_millis(args.frame_delay_ms))?
        }
    };

    if report.interrupted {
        println!("Interrupted after {} generations", report.generations_run);
    }
    println!("{report}");
    Ok(())
}
