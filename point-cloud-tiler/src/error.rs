/// Error taxonomy for the tiling pipeline.
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the tiling pipeline.
///
/// Configuration and source errors are fatal and abort the run before or
/// during cloud loading; tile write errors are isolated per tile by the
/// pipeline and never abort the tile loop.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected run configuration, reported before any tile processing.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The source point cloud could not be opened.
    #[error("failed to open point cloud {}: {}", .path.display(), .source)]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source point cloud could not be read or decoded.
    #[error("failed to read point cloud {}: {}", .path.display(), .source)]
    SourceRead {
        path: PathBuf,
        #[source]
        source: las::Error,
    },

    /// One of a tile's three artifacts failed to write; the tile is not
    /// committed but the run continues.
    #[error("failed to write tile {tile}: {source}")]
    TileWrite {
        tile: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Las(#[from] las::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
