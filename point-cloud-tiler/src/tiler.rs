/// Tiling pipeline orchestration from source cloud to committed tiles.
use crate::cloud::PointCloud;
use crate::config::TilerConfig;
use crate::error::Result;
use crate::grid::{TileGrid, TileIndex};
use crate::manifest::{self, RunManifest, TileRecord};
use crate::raster::HeightRasterizer;
use crate::tile_writer::TileWriter;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome tally of one tiling run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub tiles_total: usize,
    pub tiles_written: usize,
    pub tiles_empty: usize,
    pub tiles_failed: usize,
    pub tiles_cancelled: usize,
    /// Points emitted across all committed tile subsets.
    pub points_emitted: usize,
    /// True when the run was cut short by the cancellation flag.
    pub cancelled: bool,
}

enum TileOutcome {
    Written(TileRecord),
    Empty,
    Failed,
    Cancelled,
}

/// Pipeline coordinator for one tiling run.
///
/// Tiles are processed as parallel tasks over the shared immutable cloud;
/// each tile commits or fails independently and the run-level metadata is
/// written last, once every outcome is known.
pub struct PointCloudTiler {
    config: TilerConfig,
    cancel: Arc<AtomicBool>,
}

impl PointCloudTiler {
    /// Validate the configuration and build the pipeline.
    pub fn new(config: TilerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag that stops the tile loop when set.
    ///
    /// In-flight tiles finish their writes so nothing is left half persisted;
    /// pending tiles are skipped.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Execute the full pipeline for the configured source cloud.
    pub fn run(&self) -> Result<RunSummary> {
        let cloud = PointCloud::load(&self.config.input)?;
        let grid = TileGrid::compute(
            cloud.bounds(),
            (self.config.tile_width, self.config.tile_height),
            self.config.gsd,
        )?;

        let bounds = cloud.bounds();
        if bounds.is_valid() {
            info!(
                "Extent: X {:.2} to {:.2}, Y {:.2} to {:.2}",
                bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
            );
        }
        info!(
            "Grid: {} x {} tiles of {} x {} px at {} per pixel",
            grid.x_tiles(),
            grid.y_tiles(),
            self.config.tile_width,
            self.config.tile_height,
            self.config.gsd
        );
        if grid.is_empty() {
            info!("Extent smaller than one tile; nothing to emit");
        }

        let writer = TileWriter::new(&self.config, &cloud)?;
        let rasterizer = HeightRasterizer::from_config(&self.config);

        let indices: Vec<TileIndex> = grid.indices().collect();

        let pb = ProgressBar::new(indices.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} tiles ({percent}%) {msg}")
                .unwrap()
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Writing tiles");

        let outcomes: Vec<TileOutcome> = indices
            .par_iter()
            .map(|&index| {
                let outcome = self.process_tile(index, &cloud, &grid, &rasterizer, &writer);
                pb.inc(1);
                outcome
            })
            .collect();
        pb.finish_with_message("Tiles processed");

        let mut summary = RunSummary {
            tiles_total: indices.len(),
            ..RunSummary::default()
        };
        let mut records = Vec::new();
        for outcome in outcomes {
            match outcome {
                TileOutcome::Written(record) => {
                    summary.tiles_written += 1;
                    summary.points_emitted += record.point_count;
                    records.push(record);
                }
                TileOutcome::Empty => summary.tiles_empty += 1,
                TileOutcome::Failed => summary.tiles_failed += 1,
                TileOutcome::Cancelled => summary.tiles_cancelled += 1,
            }
        }
        summary.cancelled = self.cancel.load(Ordering::SeqCst);

        manifest::write_run_index(&self.config.output_dir, &records)?;
        manifest::write_run_manifest(
            &self.config.output_dir,
            &RunManifest {
                source: cloud.source_id().to_string(),
                aggregate: self.config.aggregate,
                tile_width: self.config.tile_width,
                tile_height: self.config.tile_height,
                gsd: self.config.gsd,
                z_min: self.config.z_min,
                z_max: self.config.z_max,
                x_tiles: grid.x_tiles(),
                y_tiles: grid.y_tiles(),
                tiles_written: summary.tiles_written,
                tiles_empty: summary.tiles_empty,
                tiles_failed: summary.tiles_failed,
                tiles_cancelled: summary.tiles_cancelled,
                point_count: cloud.len(),
                points_emitted: summary.points_emitted,
                bounds: cloud.bounds().clone(),
            },
        )?;

        info!(
            "Run complete: {} of {} tiles written, {} empty, {} failed, {} points emitted",
            summary.tiles_written,
            summary.tiles_total,
            summary.tiles_empty,
            summary.tiles_failed,
            summary.points_emitted
        );

        Ok(summary)
    }

    fn process_tile(
        &self,
        index: TileIndex,
        cloud: &PointCloud,
        grid: &TileGrid,
        rasterizer: &HeightRasterizer,
        writer: &TileWriter,
    ) -> TileOutcome {
        if self.cancel.load(Ordering::SeqCst) {
            return TileOutcome::Cancelled;
        }

        let bounds = grid.tile_bounds(index);
        let selected = cloud.select_within(&bounds);
        if selected.is_empty() {
            return TileOutcome::Empty;
        }

        let raster = rasterizer.rasterize(cloud, &selected, &bounds);
        match writer.write_tile(index, &bounds, &raster, cloud, &selected) {
            Ok(record) => TileOutcome::Written(record),
            Err(err) => {
                warn!("Skipping tile after write failure: {err}");
                TileOutcome::Failed
            }
        }
    }
}
