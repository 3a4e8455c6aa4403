/// Run-level metadata: the tile index CSV and the run manifest.
use crate::bounds::PointCloudBounds;
use crate::config::AggregateMethod;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CSV index of every committed tile, written at the end of a run.
pub const RUN_INDEX_FILENAME: &str = "metadata.csv";
/// JSON summary of the run configuration and outcome.
pub const RUN_MANIFEST_FILENAME: &str = "manifest.json";

/// Column order of the tile index; must match the field order of
/// [`TileRecord`].
pub const RUN_INDEX_HEADER: [&str; 11] = [
    "image",
    "source",
    "row",
    "col",
    "x_min",
    "y_min",
    "x_max",
    "y_max",
    "z_min",
    "z_max",
    "point_count",
];

/// Metadata record for one committed tile.
///
/// The bounds are the tile's half-open footprint and the z range is the
/// normalization range the raster was encoded with, so a record is enough to
/// interpret its image without the run configuration at hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Raster image filename, relative to the output directory.
    pub image: String,
    /// Source cloud identifier shared by all tiles of a run.
    pub source: String,
    pub row: usize,
    pub col: usize,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    /// Lower bound of the height normalization range.
    pub z_min: f64,
    /// Upper bound of the height normalization range.
    pub z_max: f64,
    /// Number of points in the tile's subset.
    pub point_count: usize,
}

/// Run summary manifest linking configuration, extent, and tile outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Source cloud identifier.
    pub source: String,
    /// Per-cell aggregation the rasters were built with.
    pub aggregate: AggregateMethod,
    pub tile_width: u32,
    pub tile_height: u32,
    pub gsd: f64,
    pub z_min: f64,
    pub z_max: f64,
    /// Grid dimensions derived from the cloud extent.
    pub x_tiles: usize,
    pub y_tiles: usize,
    pub tiles_written: usize,
    pub tiles_empty: usize,
    pub tiles_failed: usize,
    pub tiles_cancelled: usize,
    /// Points loaded from the source cloud.
    pub point_count: usize,
    /// Points emitted across all tile subsets.
    pub points_emitted: usize,
    /// Spatial bounds of the source cloud.
    pub bounds: PointCloudBounds,
}

/// Write the tile index CSV, header row included even when no tiles were
/// committed.
pub fn write_run_index(output_dir: &Path, records: &[TileRecord]) -> Result<PathBuf> {
    let path = output_dir.join(RUN_INDEX_FILENAME);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;

    writer.write_record(RUN_INDEX_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(path)
}

/// Write the run manifest JSON to the output directory.
pub fn write_run_manifest(output_dir: &Path, manifest: &RunManifest) -> Result<PathBuf> {
    let path = output_dir.join(RUN_MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json)?;

    Ok(path)
}
