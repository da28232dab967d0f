//! Star visibility and cloud coverage from all-sky camera frames
//!
//! # Usage
//!
//! ```bash
//! # Process image files (or directories of them), one JSON result per line
//! skycam -c site.json --catalog hipparcos.csv process frames/*.png
//!
//! # With cloud map, rate scan and two kernel sizes
//! skycam -c site.json --catalog hipparcos.csv --cloud-map --rate-scan -k 1 -k 2 process frames/
//!
//! # Follow the directory the camera writes into
//! skycam -c site.json --catalog hipparcos.csv --poi sources.csv watch /data/cam --interval 60
//! ```
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use skycam::acquisition::{list_images, newest_image, Change, ChangeDetector};
use skycam::catalog::{load_points_of_interest, Catalog};
use skycam::detection::ResponseFunction;
use skycam::positioning::PositioningLog;
use skycam::{Config, Frame, FrameResult, Pipeline, PipelineOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    setup: Setup,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Setup {
    /// Site configuration (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Star catalog CSV: id,name,ra,dec,vmag (degrees)
    #[arg(long)]
    catalog: PathBuf,

    /// Points of interest CSV: id,name,ra,dec[,radius] (degrees)
    #[arg(long)]
    poi: Option<PathBuf>,

    /// Pointing log CSV: MJD,ra,dec (degrees)
    #[arg(long)]
    positioning: Option<PathBuf>,

    /// Kernel size override, may be repeated
    #[arg(short, long = "kernel")]
    kernel: Vec<f64>,

    /// Response function override: All, DoG, LoG, Grad or Sobel
    #[arg(short, long)]
    function: Option<String>,

    /// Compute the cloud map and global coverage
    #[arg(long)]
    cloud_map: bool,

    /// Scan thresholds on the gradient, Sobel and LoG maps
    #[arg(long)]
    rate_scan: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process image files or directories of images
    Process {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Poll a directory and process each new frame
    Watch {
        directory: PathBuf,

        /// Seconds between polls
        #[arg(short, long, default_value = "60")]
        interval: u64,
    },
}

fn build_pipeline(setup: &Setup) -> Result<Pipeline> {
    let config = Config::load(&setup.config)
        .with_context(|| format!("Failed to load config {}", setup.config.display()))?;
    let catalog = Catalog::load(&setup.catalog)?;
    let pois = match &setup.poi {
        Some(path) => load_points_of_interest(path, config.analysis.poi_radius_deg)?,
        None => Vec::new(),
    };
    let function = setup
        .function
        .as_deref()
        .map(str::parse::<ResponseFunction>)
        .transpose()?;

    let options = PipelineOptions {
        kernel_sizes: (!setup.kernel.is_empty()).then(|| setup.kernel.clone()),
        response_function: function,
        cloud_map: setup.cloud_map,
        rate_scan: setup.rate_scan,
    };
    let mut pipeline = Pipeline::new(config, catalog, pois, options)?;
    if let Some(path) = &setup.positioning {
        pipeline = pipeline.with_positioning(PositioningLog::load(path)?);
    }
    Ok(pipeline)
}

fn emit(result: &FrameResult) -> Result<()> {
    let line = serde_json::to_string(result)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}

fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(list_images(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn process(pipeline: &Pipeline, inputs: &[PathBuf]) -> Result<()> {
    let paths = collect_inputs(inputs)?;
    log::info!("Processing {} frames", paths.len());
    let mut failed = 0;
    for (path, result) in pipeline.process_files(&paths) {
        match result {
            Ok(result) => emit(&result)?,
            Err(e) => {
                failed += 1;
                log::warn!("Skipping {}: {e}", path.display());
            }
        }
    }
    log::info!("Done: {} processed, {failed} skipped", paths.len() - failed);
    Ok(())
}

fn poll_once(pipeline: &Pipeline, directory: &Path, detector: &mut ChangeDetector) -> Result<()> {
    let Some((path, modified)) = newest_image(directory)? else {
        log::debug!("No images in {}", directory.display());
        return Ok(());
    };
    if detector.check_modified(modified) != Change::New {
        log::debug!("{} not modified since last poll", path.display());
        return Ok(());
    }
    let frame = Frame::load(&path, &pipeline.config().properties)?;
    if detector.check_content(&frame.hash) != Change::New {
        log::debug!("{} rewritten with identical content", path.display());
        return Ok(());
    }
    emit(&pipeline.process_frame(&frame)?)
}

fn watch(pipeline: &Pipeline, directory: &Path, interval: u64) -> Result<()> {
    let mut detector = ChangeDetector::new();
    log::info!("Watching {} every {interval} s", directory.display());
    loop {
        if let Err(e) = poll_once(pipeline, directory, &mut detector) {
            log::error!("{e:#}");
        }
        std::thread::sleep(Duration::from_secs(interval));
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let pipeline = build_pipeline(&cli.setup)?;

    match cli.command {
        Commands::Process { inputs } => process(&pipeline, &inputs),
        Commands::Watch {
            directory,
            interval,
        } => watch(&pipeline, &directory, interval),
    }
}
