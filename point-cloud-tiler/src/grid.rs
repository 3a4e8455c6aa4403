/// Tile grid derivation and world-space tile bounds.
use crate::bounds::PointCloudBounds;
use crate::error::{Error, Result};

/// Zero-based tile coordinates within one run's grid.
///
/// Rows count upward from the extent's minimum Y; the raster's row flip is
/// applied inside the rasterizer only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub row: usize,
    pub col: usize,
}

/// World-space rectangle covered by one tile, half-open on the upper edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl TileBounds {
    /// Half-open membership test shared by point selection and raster
    /// binning: lower-inclusive, upper-exclusive on both axes.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x < self.x_max && y >= self.y_min && y < self.y_max
    }
}

/// Regular tile grid anchored at the extent's minimum corner.
///
/// Tile counts come from floor division, so the trailing partial row and
/// column are dropped and tiles always cover a rectangle fully inside the
/// extent.
#[derive(Debug, Clone)]
pub struct TileGrid {
    origin_x: f64,
    origin_y: f64,
    tile_world_width: f64,
    tile_world_height: f64,
    x_tiles: usize,
    y_tiles: usize,
}

impl TileGrid {
    /// Derive the grid for an extent, tile pixel size, and ground sample
    /// distance.
    ///
    /// An extent that never saw a point, or one narrower than a single tile,
    /// yields a grid with zero tiles rather than an error.
    pub fn compute(extent: &PointCloudBounds, pixel_size: (u32, u32), gsd: f64) -> Result<Self> {
        let (pixel_width, pixel_height) = pixel_size;
        if pixel_width == 0 || pixel_height == 0 {
            return Err(Error::Config(format!(
                "tile pixel size must be positive, got {pixel_width}x{pixel_height}"
            )));
        }
        if !gsd.is_finite() || gsd <= 0.0 {
            return Err(Error::Config(format!(
                "ground sample distance must be a positive number, got {gsd}"
            )));
        }

        let tile_world_width = f64::from(pixel_width) * gsd;
        let tile_world_height = f64::from(pixel_height) * gsd;

        let (x_tiles, y_tiles) = if extent.is_valid() {
            let (width, height, _) = extent.dimensions();
            (
                (width / tile_world_width).floor() as usize,
                (height / tile_world_height).floor() as usize,
            )
        } else {
            (0, 0)
        };

        Ok(Self {
            origin_x: extent.min_x,
            origin_y: extent.min_y,
            tile_world_width,
            tile_world_height,
            x_tiles,
            y_tiles,
        })
    }

    /// Number of tile columns.
    pub fn x_tiles(&self) -> usize {
        self.x_tiles
    }

    /// Number of tile rows.
    pub fn y_tiles(&self) -> usize {
        self.y_tiles
    }

    /// Total number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.x_tiles * self.y_tiles
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World-space bounds of a tile, computed from index offsets alone.
    ///
    /// Upper edges reuse the next tile's lower-edge arithmetic, so adjacent
    /// tiles share a bitwise-identical boundary and the half-open membership
    /// test partitions points exactly.
    pub fn tile_bounds(&self, index: TileIndex) -> TileBounds {
        TileBounds {
            x_min: self.origin_x + index.col as f64 * self.tile_world_width,
            x_max: self.origin_x + (index.col + 1) as f64 * self.tile_world_width,
            y_min: self.origin_y + index.row as f64 * self.tile_world_height,
            y_max: self.origin_y + (index.row + 1) as f64 * self.tile_world_height,
        }
    }

    /// All tile indices in row-major order (row outer, column inner).
    pub fn indices(&self) -> impl Iterator<Item = TileIndex> {
        let x_tiles = self.x_tiles;
        (0..self.y_tiles).flat_map(move |row| (0..x_tiles).map(move |col| TileIndex { row, col }))
    }
}
