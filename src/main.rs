use clap::{Args as ClapArgs, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod degradation;
mod error;
mod score;
mod utils;

use config::{
    FetchConfig, DEFAULT_NOISE_STD_DEV, DEFAULT_OUTPUT_ROOT, DEFAULT_SCALE_FACTOR,
    DEFAULT_SHARPEN_AMOUNT, DEFAULT_SHARPEN_RADIUS, DEFAULT_SOURCE_URL, DEFAULT_TARGET_COUNT,
    DEFAULT_TIMEOUT_SECS,
};
use score::fetch::{fetch_and_store, FetchOutcome};
use utils::http::HttpFetcher;
use utils::images::{load_image, save_image};

/// Build a sheet-music image dataset: scrape score pairs and synthesize degraded inputs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the PNG thumbnail and SVG of a score page
    Fetch {
        /// Score page to scrape
        #[arg(short, long, default_value = DEFAULT_SOURCE_URL)]
        url: String,

        /// Directory that receives `<name>/<name>.{png,svg}`
        #[arg(short, long, default_value = DEFAULT_OUTPUT_ROOT)]
        output: PathBuf,

        /// Skip the run when the output directory holds exactly this many entries
        #[arg(long, default_value_t = DEFAULT_TARGET_COUNT)]
        target_count: usize,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
    /// Produce a degraded (or sharpened) variant of a reference image
    Degrade {
        #[command(subcommand)]
        method: DegradeMethod,
    },
}

#[derive(ClapArgs, Debug)]
struct ImagePaths {
    /// Reference image to read
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the result; the extension picks the format
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Subcommand, Debug)]
enum DegradeMethod {
    /// Lanczos upscale of the grayscale image followed by unsharp masking
    Sharpen {
        #[command(flatten)]
        paths: ImagePaths,

        #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
        scale: f64,

        #[arg(long, default_value_t = DEFAULT_SHARPEN_AMOUNT)]
        amount: f32,

        /// Gaussian sigma of the sharpening mask
        #[arg(long, default_value_t = DEFAULT_SHARPEN_RADIUS)]
        radius: f32,
    },
    /// Bicubic downscale
    Downscale {
        #[command(flatten)]
        paths: ImagePaths,

        /// Downscale ratio in (0, 1], e.g. 0.25 for 4x degradation
        #[arg(short, long)]
        ratio: f64,
    },
    /// Bicubic downscale followed by additive Gaussian noise
    Noisy {
        #[command(flatten)]
        paths: ImagePaths,

        /// Downscale ratio in (0, 1]
        #[arg(short, long)]
        ratio: f64,

        /// Noise standard deviation on the 0-255 scale
        #[arg(long, default_value_t = DEFAULT_NOISE_STD_DEV)]
        noise: f32,

        /// Seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,
    },
}

async fn run_fetch(config: FetchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let transport = HttpFetcher::new(config.timeout)?;

    match fetch_and_store(&config, &transport).await? {
        FetchOutcome::Stored(pair) => {
            info!("Saved pair to {}", pair.dir(&config.output_root).display())
        }
        FetchOutcome::AlreadyPopulated { count } => {
            info!("Nothing to do, {} entries present", count)
        }
        FetchOutcome::PageUnavailable { reason } => info!("Nothing stored ({})", reason),
        FetchOutcome::NoPair => info!("Nothing stored"),
    }

    Ok(())
}

fn run_degrade(method: DegradeMethod) -> Result<(), Box<dyn std::error::Error>> {
    let (degraded, output) = match method {
        DegradeMethod::Sharpen {
            paths,
            scale,
            amount,
            radius,
        } => {
            let sharpened =
                degradation::upscale_and_sharpen(&paths.input, scale, amount, radius)?;
            (image::DynamicImage::ImageRgb8(sharpened), paths.output)
        }
        DegradeMethod::Downscale { paths, ratio } => {
            let i_ref = load_image(&paths.input)?;
            (degradation::simple_downscale(&i_ref, ratio)?, paths.output)
        }
        DegradeMethod::Noisy {
            paths,
            ratio,
            noise,
            seed,
        } => {
            let i_ref = load_image(&paths.input)?;
            let noisy = degradation::downscale_with_noise(&i_ref, ratio, noise, seed)?;
            (noisy, paths.output)
        }
    };

    if utils::images::is_empty(&degraded) {
        return Err("Reference image is empty, nothing to write".into());
    }

    save_image(&degraded, &output)?;
    info!(
        "Wrote {}x{} image to {}",
        degraded.width(),
        degraded.height(),
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Fetch {
            url,
            output,
            target_count,
            timeout,
        } => {
            let config = FetchConfig {
                source_url: url,
                output_root: output,
                target_count,
                timeout: Duration::from_secs(timeout),
            };
            run_fetch(config).await
        }
        Commands::Degrade { method } => run_degrade(method),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
