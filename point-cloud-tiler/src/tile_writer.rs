/// Per-tile artifact persistence: raster image, point subset, and record.
use crate::cloud::PointCloud;
use crate::config::TilerConfig;
use crate::error::{Error, Result};
use crate::grid::{TileBounds, TileIndex};
use crate::manifest::TileRecord;
use image::GrayImage;
use las::Writer;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Attempts per artifact before a tile write is given up on.
const WRITE_ATTEMPTS: usize = 3;
/// Pause between attempts at the same artifact.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Filename root shared by a tile's three artifacts.
pub fn tile_name(source_id: &str, index: TileIndex) -> String {
    format!("{}_{}_{}", source_id, index.row, index.col)
}

/// Writes the three artifacts of a committed tile into the output directory.
///
/// Every tile owns distinct output paths, so one writer is shared across
/// concurrent tile tasks without coordination.
pub struct TileWriter {
    output_dir: PathBuf,
    source_id: String,
    subset_extension: String,
    header: las::Header,
    z_min: f64,
    z_max: f64,
}

impl TileWriter {
    /// Create the writer, creating the output directory if absent.
    pub fn new(config: &TilerConfig, cloud: &PointCloud) -> Result<Self> {
        fs::create_dir_all(&config.output_dir)?;

        Ok(Self {
            output_dir: config.output_dir.clone(),
            source_id: cloud.source_id().to_string(),
            subset_extension: cloud.source_extension().to_string(),
            header: cloud.header().clone(),
            z_min: config.z_min,
            z_max: config.z_max,
        })
    }

    /// Persist one tile's raster, point subset, and metadata record.
    ///
    /// The record is written only after the raster and subset succeed, so its
    /// presence marks the tile committed. Any failure is wrapped with the
    /// tile name so the caller can isolate it without aborting the run.
    pub fn write_tile(
        &self,
        index: TileIndex,
        bounds: &TileBounds,
        raster: &GrayImage,
        cloud: &PointCloud,
        indices: &[usize],
    ) -> Result<TileRecord> {
        let name = tile_name(&self.source_id, index);
        self.write_artifacts(&name, index, bounds, raster, cloud, indices)
            .map_err(|source| Error::TileWrite {
                tile: name,
                source: Box::new(source),
            })
    }

    fn write_artifacts(
        &self,
        name: &str,
        index: TileIndex,
        bounds: &TileBounds,
        raster: &GrayImage,
        cloud: &PointCloud,
        indices: &[usize],
    ) -> Result<TileRecord> {
        let image_name = format!("{name}.png");
        let image_path = self.output_dir.join(&image_name);
        with_retries(&image_name, || {
            raster.save(&image_path)?;
            Ok(())
        })?;

        let subset_name = format!("{name}.{}", self.subset_extension);
        let subset_path = self.output_dir.join(&subset_name);
        with_retries(&subset_name, || {
            self.write_subset(&subset_path, cloud, indices)
        })?;

        let record = TileRecord {
            image: image_name,
            source: self.source_id.clone(),
            row: index.row,
            col: index.col,
            x_min: bounds.x_min,
            y_min: bounds.y_min,
            x_max: bounds.x_max,
            y_max: bounds.y_max,
            z_min: self.z_min,
            z_max: self.z_max,
            point_count: indices.len(),
        };

        let record_name = format!("{name}.json");
        let record_path = self.output_dir.join(&record_name);
        with_retries(&record_name, || {
            let json = serde_json::to_string_pretty(&record)?;
            fs::write(&record_path, json)?;
            Ok(())
        })?;

        Ok(record)
    }

    /// Write the tile's points back out under the source schema.
    ///
    /// The cloned source header carries scale, offset, and all attribute
    /// dimensions; the output extension decides compression.
    fn write_subset(&self, path: &Path, cloud: &PointCloud, indices: &[usize]) -> Result<()> {
        let mut writer = Writer::from_path(path, self.header.clone())?;
        let points = cloud.points();
        for &idx in indices {
            writer.write_point(points[idx].clone())?;
        }
        writer.close()?;
        Ok(())
    }
}

/// Run a write closure up to [`WRITE_ATTEMPTS`] times with a short pause
/// between attempts, returning the last error once attempts are exhausted.
fn with_retries<T>(what: &str, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
    for tried in 1..WRITE_ATTEMPTS {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("Write attempt {tried}/{WRITE_ATTEMPTS} for {what} failed: {err}");
                thread::sleep(RETRY_DELAY);
            }
        }
    }
    attempt()
}
