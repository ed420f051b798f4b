//! Distance maps of grayscale image stacks
//!
//! Reads one or more grayscale images as the Z slices of a volume, computes
//! its Euclidean (`edt`) or signed Euclidean (`sedt`) distance transform and
//! reports range statistics. Optionally writes normalized 16-bit PNG slices
//! and/or the raw `f32` volume.
//!
//! # Usage
//!
//! ```bash
//! # Distance of every foreground pixel to the background
//! cargo run --release --bin distance_map -- edt mask.png -o out/
//!
//! # Signed distance of a 3D stack with anisotropic voxels
//! cargo run --release --bin distance_map -- sedt slices/*.png --spacing 0.5 0.5 2.0 --raw field.f32
//!
//! # Seeds are the bright pixels, threshold 128
//! cargo run --release --bin distance_map -- edt mask.png --foreground-seeds -t 128
//!
//! # Write the default options as a starting point for --config
//! cargo run --release --bin distance_map -- config > options.json
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use distmap::{Calibration, DistanceStats, DistanceTransform, Execution, Polarity, TransformOptions};
use distmap_tools::output::{write_png_slices, write_raw};
use distmap_tools::progress_bar::RowProgressBar;
use distmap_tools::{load_options, stack::load_stack};
use log::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unsigned Euclidean distance transform
    Edt(TransformArgs),
    /// Signed Euclidean distance transform (negative inside, positive outside)
    Sedt(TransformArgs),
    /// Print the default transform options as JSON
    Config,
}

#[derive(Args)]
struct TransformArgs {
    /// Input images, one per Z slice, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON options file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Samples strictly above this value are foreground
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Use foreground pixels as the distance-zero seeds (edt only)
    #[arg(long)]
    foreground_seeds: bool,

    /// Voxel spacing along X, Y and Z
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    spacing: Option<Vec<f64>>,

    /// Process rows on a single thread
    #[arg(long)]
    sequential: bool,

    /// Directory for normalized 16-bit PNG slices
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File for the raw little-endian f32 volume
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl TransformArgs {
    fn options(&self, signed: bool) -> Result<TransformOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)?,
            None => TransformOptions::default(),
        };
        options.signed = signed;

        if let Some(threshold) = self.threshold {
            options = options.with_threshold(threshold);
        }
        if self.foreground_seeds {
            if signed {
                warn!("--foreground-seeds has no effect on the signed transform");
            }
            options = options.with_polarity(Polarity::ForegroundSeeds);
        }
        if let Some(spacing) = &self.spacing {
            options = options.with_calibration(Calibration::new(spacing[0], spacing[1], spacing[2]));
        }
        if self.sequential {
            options = options.with_execution(Execution::Sequential);
        }

        options.validate()?;
        Ok(options)
    }
}

fn run_transform(args: TransformArgs, signed: bool) -> Result<()> {
    let name = if signed { "sedt" } else { "edt" };
    let options = args.options(signed)?;

    let volume = load_stack(&args.inputs)?;
    println!("Loaded {} slice(s) of shape {:?}", args.inputs.len(), volume.shape());

    let bar = if args.quiet {
        RowProgressBar::hidden()
    } else {
        RowProgressBar::new(name)
    };

    let started = Instant::now();
    let field = DistanceTransform::new(options)
        .with_progress(&bar)
        .compute(&volume)?;
    bar.finish();
    info!("{name} finished in {:?}", started.elapsed());

    if let Some(path) = &args.raw {
        write_raw(&field, path)?;
        println!("Wrote raw volume to {}", path.display());
    }

    let Some(stats) = DistanceStats::from_field(&field) else {
        warn!("No finite distances: the volume has no seed voxels");
        return Ok(());
    };
    println!("{name}: {stats}");

    if let Some(dir) = &args.output_dir {
        let written = write_png_slices(&field, &stats, dir, name)?;
        println!("Wrote {} PNG slice(s) to {}", written.len(), dir.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Edt(args) => run_transform(args, false),
        Commands::Sedt(args) => run_transform(args, true),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&TransformOptions::default())?);
            Ok(())
        }
    }
}
