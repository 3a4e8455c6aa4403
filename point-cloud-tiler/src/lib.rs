//! Spatial tiling and rasterization engine for LAS/LAZ point clouds.
//!
//! A run loads one source cloud, partitions its footprint into a regular
//! grid of fixed-pixel-size tiles, and emits per non-empty tile a height
//! raster PNG, the tile's point subset under the source schema, and a
//! metadata record. Tiles are independent and processed as parallel tasks
//! over the shared immutable cloud.

pub mod bounds;
pub mod cloud;
pub mod config;
pub mod error;
pub mod grid;
pub mod manifest;
pub mod raster;
pub mod tile_writer;
pub mod tiler;

pub use bounds::PointCloudBounds;
pub use cloud::PointCloud;
pub use config::{
    AggregateMethod, DEFAULT_GSD, DEFAULT_TILE_SIZE, DEFAULT_Z_MAX, DEFAULT_Z_MIN, TilerConfig,
};
pub use error::{Error, Result};
pub use grid::{TileBounds, TileGrid, TileIndex};
pub use manifest::{RUN_INDEX_FILENAME, RUN_MANIFEST_FILENAME, RunManifest, TileRecord};
pub use raster::HeightRasterizer;
pub use tile_writer::{TileWriter, tile_name};
pub use tiler::{PointCloudTiler, RunSummary};
