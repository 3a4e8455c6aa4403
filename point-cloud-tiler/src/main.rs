/// Command line entry point for the point cloud tiling engine.
use anyhow::Context;
use clap::Parser;
use log::warn;
use point_cloud_tiler::{
    AggregateMethod, DEFAULT_GSD, DEFAULT_TILE_SIZE, DEFAULT_Z_MAX, DEFAULT_Z_MIN, PointCloudTiler,
    TilerConfig,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Parser, Debug)]
#[command(name = "point-cloud-tiler", version)]
struct Args {
    /// Source LAS/LAZ point cloud.
    input: PathBuf,

    /// Output directory for tile artifacts, created if absent.
    #[arg(long, default_value = "tiles")]
    output_dir: PathBuf,

    /// Tile width in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_width: u32,

    /// Tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_height: u32,

    /// Ground sample distance in world units per pixel.
    #[arg(long, default_value_t = DEFAULT_GSD)]
    gsd: f64,

    /// Lower bound of the global height normalization range.
    #[arg(long, default_value_t = DEFAULT_Z_MIN, allow_negative_numbers = true)]
    z_min: f64,

    /// Upper bound of the global height normalization range.
    #[arg(long, default_value_t = DEFAULT_Z_MAX, allow_negative_numbers = true)]
    z_max: f64,

    /// Per-cell height aggregation.
    #[arg(long, value_enum, default_value_t = AggregateMethod::Sum)]
    aggregate: AggregateMethod,
}

impl Args {
    fn into_config(self) -> TilerConfig {
        TilerConfig {
            input: self.input,
            output_dir: self.output_dir,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            gsd: self.gsd,
            z_min: self.z_min,
            z_max: self.z_max,
            aggregate: self.aggregate,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let tiler = PointCloudTiler::new(args.into_config())?;

    let cancel = tiler.cancel_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        cancel.store(true, Ordering::SeqCst);
    })
    .context("failed to install shutdown handler")?;

    let summary = tiler.run()?;
    if summary.cancelled {
        warn!(
            "Run cancelled: {} of {} tiles skipped",
            summary.tiles_cancelled, summary.tiles_total
        );
    }

    Ok(())
}
