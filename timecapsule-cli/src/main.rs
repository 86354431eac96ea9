use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "timecapsule", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write mask and glitch artifacts for every consecutive screenshot pair.
    Analyse(AnalyseArgs),
    /// Diff a single pair of images.
    Diff(DiffArgs),
    /// List screenshots with their date labels and artifact status.
    List(ListArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of captured screenshots.
    #[arg(long)]
    screenshots: Option<PathBuf>,

    /// Output directory for change masks.
    #[arg(long)]
    masks: Option<PathBuf>,

    /// Output directory for glitch composites.
    #[arg(long)]
    glitches: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnalyseArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Max channel delta that still counts as unchanged (0-255).
    #[arg(long)]
    threshold: Option<u8>,

    /// Only use this many screenshots, spread evenly over the sequence.
    #[arg(long)]
    max_snapshots: Option<usize>,

    /// Recompute pairs whose inputs changed since their artifacts were written.
    #[arg(long, default_value_t = false)]
    verify_inputs: bool,

    /// Enable pair-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Exit with an error when any pair failed.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct DiffArgs {
    /// Earlier snapshot.
    #[arg(long)]
    earlier: PathBuf,

    /// Later snapshot.
    #[arg(long)]
    later: PathBuf,

    /// Output mask PNG path.
    #[arg(long)]
    mask: PathBuf,

    /// Output glitch PNG path.
    #[arg(long)]
    glitch: PathBuf,

    /// Max channel delta that still counts as unchanged (0-255).
    #[arg(long, default_value_t = timecapsule::DEFAULT_THRESHOLD)]
    threshold: u8,
}

#[derive(Parser, Debug)]
struct ListArgs {
    #[command(flatten)]
    layout: LayoutArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.cmd {
        Command::Analyse(args) => cmd_analyse(args),
        Command::Diff(args) => cmd_diff(args),
        Command::List(args) => cmd_list(args),
    }
}

fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .init();
}

fn load_config(layout: &LayoutArgs) -> anyhow::Result<timecapsule::CapsuleConfig> {
    let mut cfg = match &layout.config {
        Some(path) => timecapsule::CapsuleConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => timecapsule::CapsuleConfig::default(),
    };
    if let Some(dir) = &layout.screenshots {
        cfg.screenshots_dir = dir.clone();
    }
    if let Some(dir) = &layout.masks {
        cfg.masks_dir = dir.clone();
    }
    if let Some(dir) = &layout.glitches {
        cfg.glitches_dir = dir.clone();
    }
    Ok(cfg)
}

fn cmd_analyse(args: AnalyseArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.layout)?;
    if let Some(t) = args.threshold {
        cfg.threshold = t;
    }
    if args.verify_inputs {
        cfg.cache = timecapsule::CachePolicy::ContentHash;
    }
    if args.parallel {
        cfg.threading.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }

    let mut shots = timecapsule::list_screenshots(&cfg.screenshots_dir)
        .with_context(|| format!("list screenshots in '{}'", cfg.screenshots_dir.display()))?;
    if let Some(max) = args.max_snapshots {
        shots = timecapsule::pick_evenly(&shots, max);
    }

    let driver = timecapsule::BatchDriver::new(&cfg)?;
    let report = driver.run(&shots)?;

    match report.status {
        timecapsule::BatchStatus::InsufficientInput { available } => {
            eprintln!("need at least 2 screenshots, found {available}");
            return Ok(());
        }
        timecapsule::BatchStatus::Completed => {}
    }

    for (pair, err) in report.failures() {
        eprintln!("failed {pair}: {err}");
    }
    eprintln!(
        "pairs: {} written, {} cached, {} degenerate, {} failed",
        report.written(),
        report.cached(),
        report.degenerate(),
        report.failed()
    );

    if args.strict && report.failed() > 0 {
        anyhow::bail!("{} pair(s) failed", report.failed());
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<()> {
    let out = timecapsule::process_pair(
        &args.earlier,
        &args.later,
        args.threshold,
        &timecapsule::GlitchRecipe::default(),
    )?;

    for path in [&args.mask, &args.glitch] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
    }
    timecapsule::write_mask_png(&out.mask, &args.mask)?;
    timecapsule::write_grid_png(&out.glitch, &args.glitch)?;

    eprintln!(
        "wrote {} and {} ({:.1}% changed)",
        args.mask.display(),
        args.glitch.display(),
        out.mask.changed_ratio() * 100.0
    );
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.layout)?;
    let shots = timecapsule::list_screenshots(&cfg.screenshots_dir)?;
    if shots.is_empty() {
        println!("no screenshots in {}", cfg.screenshots_dir.display());
        return Ok(());
    }

    let layout = timecapsule::ArtifactLayout::new(&cfg.masks_dir, &cfg.glitches_dir);
    let pairs = timecapsule::consecutive_pairs(&shots).unwrap_or_default();
    for (i, shot) in shots.iter().enumerate() {
        let stem = shot
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let overlay = match pairs.get(i).map(|p| layout.overlay_for(p)) {
            Some(Some(timecapsule::Overlay::Glitch(_))) => "glitch",
            Some(Some(timecapsule::Overlay::Mask(_))) => "mask",
            Some(None) => "missing",
            None => "-",
        };
        println!(
            "{:>3}  {:<10}  {:<8}  {}",
            i,
            timecapsule::snapshot_label(&stem),
            overlay,
            shot.display()
        );
    }
    Ok(())
}
