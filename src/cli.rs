//! Headless front-end.
//!
//! Usage examples:
//!   georef run --image scan.png --points gcps.json --output warped.tif
//!   georef check gcps.json
//!   georef --base-url http://10.0.0.5:8000 download --output warped.tif
//!   georef init-config

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use georef_remote::{GeorefService, HttpGeorefService};

use crate::config::{GeorefConfig, LogLevel};
use crate::map::OverlayManifestView;
use crate::model::{GateReport, PointStore};
use crate::points_file::{apply_points, fill_store, load_points};
use crate::state::is_image_filename;
use crate::viewer::Viewport;
use crate::views::PointTable;
use crate::workflow::Workflow;

/// Viewer size assumed when no window exists.
const HEADLESS_VIEWPORT: (f64, f64) = (1024.0, 768.0);

/// Ground control point georeferencing client.
#[derive(Parser, Debug)]
#[command(name = "georef", version, about = "Georeference an image from ground control points")]
pub struct Cli {
    /// Configuration file. Defaults to the per-user config location.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Service base URL, overriding the configuration.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// error, warn, info, debug or trace. Overrides the configuration.
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload an image, submit its GCPs, georeference and download the result.
    Run {
        #[arg(short, long, value_name = "IMAGE")]
        image: PathBuf,

        /// JSON array of {x, y, lon, lat}
        #[arg(short, long, value_name = "POINTS.json")]
        points: PathBuf,

        /// Where to write the georeferenced image
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Also write the map overlay description here
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },

    /// Validate a GCP file without contacting the service.
    Check {
        #[arg(value_name = "POINTS.json")]
        points: PathBuf,
    },

    /// Fetch the service's current result.
    Download {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Write a configuration file with default values.
    InitConfig {
        /// Target file. Defaults to the per-user config location.
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_log_level(name: &str) -> std::result::Result<LogLevel, String> {
    LogLevel::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = LogLevel::all().iter().map(LogLevel::name).collect();
        format!("expected one of {}", names.join(", ").to_lowercase())
    })
}

/// Run one command and return the process exit code.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => GeorefConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => GeorefConfig::load_from_default_path().unwrap_or_default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.service.base_url = base_url.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_logging(config.log_level);
    log::debug!("Service at {}", config.service.base_url);

    match cli.command {
        Command::Run {
            image,
            points,
            output,
            manifest,
        } => {
            block_on(run_workflow(&config, &image, &points, &output, manifest.as_deref()))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { points } => check_points(&points),
        Command::Download { output } => {
            block_on(download(&config, &output))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig { path, force } => {
            init_config(&config, path, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(level: LogLevel) {
    // RUST_LOG still wins when set
    let _ = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init();
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

async fn run_workflow(
    config: &GeorefConfig,
    image: &Path,
    points: &Path,
    output: &Path,
    manifest: Option<&Path>,
) -> Result<()> {
    let records = load_points(points)
        .with_context(|| format!("Failed to read GCPs from {}", points.display()))?;

    let service = HttpGeorefService::new(config.service.clone())?;
    let (width, height) = HEADLESS_VIEWPORT;
    let mut workflow = Workflow::new(
        service,
        OverlayManifestView::new(),
        config,
        Viewport::new(0.0, 0.0, width, height),
    );

    if !is_image_filename(&image.to_string_lossy()) {
        log::warn!("{} does not have a known image extension", image.display());
    }
    workflow
        .load_image_path(image)
        .with_context(|| format!("Failed to load image {}", image.display()))?;
    workflow.upload_image().await?;

    apply_points(&records, &mut workflow)
        .with_context(|| format!("Failed to place GCPs from {}", points.display()))?;
    print!("{}", PointTable::from_points(workflow.session().points()).render_text());

    if !workflow.session().can_georeference() {
        bail!("Not ready to georeference:\n{}", workflow.session().gate_report());
    }

    let outcome = workflow.start_georeferencing().await?;
    if let Some(e) = &outcome.display_error {
        log::warn!("{}", e);
    }

    let bytes = workflow.download_and_show_result().await?;
    write_output(output, &bytes)?;

    if let Some(path) = manifest {
        workflow
            .map()
            .view()
            .manifest()
            .write_to(path)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    }

    println!(
        "Georeferenced {} points, result written to {}",
        workflow.session().point_count(),
        output.display()
    );
    Ok(())
}

fn check_points(points: &Path) -> Result<ExitCode> {
    let records = load_points(points)
        .with_context(|| format!("Failed to read GCPs from {}", points.display()))?;
    let mut store = PointStore::new();
    fill_store(&records, &mut store)?;

    print!("{}", PointTable::from_points(store.snapshot()).render_text());
    let report = GateReport::build(store.snapshot());
    println!("{}", report);

    Ok(if report.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn download(config: &GeorefConfig, output: &Path) -> Result<()> {
    let service = HttpGeorefService::new(config.service.clone())?;
    let bytes = service
        .fetch_result()
        .await
        .with_context(|| format!("Failed to download from {}", service.result_url()))?;
    write_output(output, &bytes)?;
    println!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("💾 Saved {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

fn init_config(config: &GeorefConfig, path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => GeorefConfig::default_path().context("Could not determine config directory")?,
    };
    if path.exists() && !force {
        bail!("{} already exists, pass --force to replace it", path.display());
    }
    config.save_to_path(&path)?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
