use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codecity_pipeline::{
    CityBuilder, CityConfig, CityError, ErrorKind, ErrorReport, RunStats, SnapshotMeta,
    SnapshotStore, Tile,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codecity")]
#[command(about = "Render a source tree as a city of complexity buildings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a directory and print its city tiles as JSON
    Build(BuildArgs),

    /// Inspect stored snapshots
    Snapshots {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Source tree to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// TOML or JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of files to analyze
    #[arg(long)]
    max_files: Option<usize>,

    /// Concurrent analyses (clamped to 1..=64)
    #[arg(long)]
    workers: Option<usize>,

    /// Canvas side per sqrt(file count)
    #[arg(long)]
    area_scale: Option<f64>,

    /// Minimum canvas side
    #[arg(long)]
    area_floor: Option<f64>,

    /// Building height per complexity point
    #[arg(long)]
    height_scale: Option<f64>,

    /// Abort the analysis after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write JSON here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Emit `{tiles, stats}` instead of the bare tile list
    #[arg(long)]
    stats: bool,

    /// Also persist the result as a snapshot in this directory
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Snapshot label (defaults to the source)
    #[arg(long)]
    label: Option<String>,

    /// Recorded origin of the tree, e.g. a repository URL (defaults to PATH)
    #[arg(long)]
    source: Option<String>,
}

#[derive(Subcommand)]
enum SnapshotCommands {
    /// List snapshot metadata, newest first
    List(SnapshotDirArgs),

    /// Print one snapshot
    Show(ShowArgs),
}

#[derive(Args)]
struct SnapshotDirArgs {
    /// Snapshot directory
    #[arg(long)]
    dir: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// Snapshot id as printed by `snapshots list`
    id: String,

    #[command(flatten)]
    store: SnapshotDirArgs,
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    tiles: &'a [Tile],
    stats: &'a RunStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a SnapshotMeta>,
}

#[derive(Serialize)]
struct ErrorOutput {
    error: ErrorReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Build(args) => run_build(args).await,
        Commands::Snapshots { command } => match command {
            SnapshotCommands::List(args) => run_list(args).await,
            SnapshotCommands::Show(args) => run_show(args).await,
        },
    }
}

async fn run_build(args: BuildArgs) -> Result<()> {
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(err) => fail(&err),
    };
    let builder = CityBuilder::new(config);

    let city = match builder.build(&args.path).await {
        Ok(city) => city,
        Err(err) => fail(&err),
    };

    let snapshot = match &args.snapshot_dir {
        Some(dir) => {
            let source = args
                .source
                .clone()
                .unwrap_or_else(|| args.path.display().to_string());
            let store = SnapshotStore::new(dir);
            match store.save(&source, args.label.as_deref(), &city.tiles).await {
                Ok(meta) => {
                    log::info!("Snapshot {} stored in {}", meta.id, store.dir().display());
                    Some(meta)
                }
                Err(err) => fail(&err),
            }
        }
        None => None,
    };

    let body = if args.stats {
        to_json(
            &BuildOutput {
                tiles: &city.tiles,
                stats: &city.stats,
                snapshot: snapshot.as_ref(),
            },
            args.pretty,
        )?
    } else {
        to_json(&city.tiles, args.pretty)?
    };
    emit(&body, args.out.as_deref())
}

async fn run_list(args: SnapshotDirArgs) -> Result<()> {
    let store = SnapshotStore::new(&args.dir);
    match store.list().await {
        Ok(metas) => emit(&to_json(&metas, args.pretty)?, None),
        Err(err) => fail(&err),
    }
}

async fn run_show(args: ShowArgs) -> Result<()> {
    let store = SnapshotStore::new(&args.store.dir);
    match store.load(&args.id).await {
        Ok(Some(snapshot)) => emit(&to_json(&snapshot, args.store.pretty)?, None),
        Ok(None) => fail_with(ErrorReport {
            kind: ErrorKind::Input,
            message: format!("Snapshot not found: {}", args.id),
        }),
        Err(err) => fail(&err),
    }
}

/// defaults < config file < environment < flags
fn resolve_config(args: &BuildArgs) -> codecity_pipeline::Result<CityConfig> {
    let base = match &args.config {
        Some(path) => CityConfig::load(path)?,
        None => CityConfig::default(),
    };
    let mut config = base.apply_env();

    if let Some(max_files) = args.max_files {
        config.max_files = max_files;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(area_scale) = args.area_scale {
        config.area_scale = area_scale;
    }
    if let Some(area_floor) = args.area_floor {
        config.area_floor = area_floor;
    }
    if let Some(height_scale) = args.height_scale {
        config.height_scale = height_scale;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    Ok(config)
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let body = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(body)
}

fn emit(body: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn fail(err: &CityError) -> ! {
    fail_with(err.report())
}

fn fail_with(report: ErrorReport) -> ! {
    log::error!("{}", report.message);
    let output = ErrorOutput { error: report };
    match serde_json::to_string(&output) {
        Ok(body) => println!("{body}"),
        Err(_) => println!(r#"{{"error":{{"kind":"internal","message":"unserializable error"}}}}"#),
    }
    std::process::exit(1);
}
