/// Immutable run configuration for the tiling engine.
use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 1024;
/// Default ground sample distance in world units per pixel.
pub const DEFAULT_GSD: f64 = 0.01;
/// Default lower bound of the height normalization range.
pub const DEFAULT_Z_MIN: f64 = -5.0;
/// Default upper bound of the height normalization range.
pub const DEFAULT_Z_MAX: f64 = 45.0;

/// Per-cell Z aggregation policy for the height raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMethod {
    /// Sum all Z values landing in a cell.
    Sum,
    /// Average the Z values landing in a cell.
    Mean,
    /// Keep the highest Z value landing in a cell.
    Max,
}

impl std::fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AggregateMethod::Sum => "sum",
            AggregateMethod::Mean => "mean",
            AggregateMethod::Max => "max",
        })
    }
}

/// Validated, immutable configuration for one tiling run.
///
/// Built once at startup and passed by reference into the pipeline; nothing
/// in the engine reads configuration from anywhere else.
#[derive(Debug, Clone, Serialize)]
pub struct TilerConfig {
    /// Source LAS/LAZ file.
    pub input: PathBuf,
    /// Output directory, created if absent.
    pub output_dir: PathBuf,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Ground sample distance in world units per pixel.
    pub gsd: f64,
    /// Global lower bound of the height normalization range.
    pub z_min: f64,
    /// Global upper bound of the height normalization range.
    pub z_max: f64,
    /// Per-cell aggregation policy.
    pub aggregate: AggregateMethod,
}

impl TilerConfig {
    /// Check the invariants that must hold before any processing starts.
    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(Error::Config(format!(
                "tile pixel size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if !self.gsd.is_finite() || self.gsd <= 0.0 {
            return Err(Error::Config(format!(
                "ground sample distance must be a positive number, got {}",
                self.gsd
            )));
        }
        if !self.z_min.is_finite() || !self.z_max.is_finite() || self.z_min >= self.z_max {
            return Err(Error::Config(format!(
                "normalization range must satisfy z_min < z_max, got {}..{}",
                self.z_min, self.z_max
            )));
        }
        Ok(())
    }

    /// World-space width covered by one tile.
    pub fn tile_world_width(&self) -> f64 {
        f64::from(self.tile_width) * self.gsd
    }

    /// World-space height covered by one tile.
    pub fn tile_world_height(&self) -> f64 {
        f64::from(self.tile_height) * self.gsd
    }
}
