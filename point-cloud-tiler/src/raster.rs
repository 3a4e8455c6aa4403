/// Height rasterization of per-tile point selections.
use crate::cloud::PointCloud;
use crate::config::{AggregateMethod, TilerConfig};
use crate::grid::TileBounds;
use image::{GrayImage, Luma};

/// Bins tile points into a pixel grid and encodes aggregated heights as
/// 8-bit intensities.
///
/// The normalization range is global for the run, so intensities are
/// comparable across tiles. Cells that receive no points keep an aggregate of
/// zero and normalize to a fixed background intensity rather than a missing
/// marker.
#[derive(Debug, Clone)]
pub struct HeightRasterizer {
    width: u32,
    height: u32,
    gsd: f64,
    z_min: f64,
    z_max: f64,
    aggregate: AggregateMethod,
}

impl HeightRasterizer {
    pub fn from_config(config: &TilerConfig) -> Self {
        Self {
            width: config.tile_width,
            height: config.tile_height,
            gsd: config.gsd,
            z_min: config.z_min,
            z_max: config.z_max,
            aggregate: config.aggregate,
        }
    }

    /// Rasterize the selected points of one tile into a grayscale image.
    ///
    /// The indices must come from the tile's half-open selection; the cell
    /// mapping applies the same bounds, with an index clamp so accumulated
    /// float error at the seams can never push a point outside the grid.
    pub fn rasterize(&self, cloud: &PointCloud, indices: &[usize], tile: &TileBounds) -> GrayImage {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut cells = vec![0.0f64; width * height];
        let mut counts = vec![0u32; width * height];

        let points = cloud.points();
        for &idx in indices {
            let point = &points[idx];
            let cell = self.cell_of(point.x, point.y, tile);
            match self.aggregate {
                AggregateMethod::Sum | AggregateMethod::Mean => cells[cell] += point.z,
                AggregateMethod::Max => {
                    if counts[cell] == 0 || point.z > cells[cell] {
                        cells[cell] = point.z;
                    }
                }
            }
            counts[cell] += 1;
        }

        if self.aggregate == AggregateMethod::Mean {
            for (value, &count) in cells.iter_mut().zip(&counts) {
                if count > 0 {
                    *value /= f64::from(count);
                }
            }
        }

        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([self.intensity(cells[y as usize * width + x as usize])])
        })
    }

    /// Flat cell index for a point, with row zero on the tile's maximum-Y
    /// edge.
    fn cell_of(&self, x: f64, y: f64, tile: &TileBounds) -> usize {
        let width = self.width as usize;
        let height = self.height as usize;
        let col = (((x - tile.x_min) / self.gsd) as usize).min(width - 1);
        let row_up = (((y - tile.y_min) / self.gsd) as usize).min(height - 1);
        (height - 1 - row_up) * width + col
    }

    /// Map an aggregated height onto the 0-255 intensity scale.
    ///
    /// Scaling multiplies before dividing so exact halves such as 76.5 stay
    /// exact and round away from zero; out-of-range heights clamp to the
    /// scale ends instead of wrapping.
    fn intensity(&self, value: f64) -> u8 {
        let scaled = (value - self.z_min) * 255.0 / (self.z_max - self.z_min);
        scaled.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use las::Point;

    fn point(x: f64, y: f64, z: f64) -> Point {
        Point {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    fn tile() -> TileBounds {
        TileBounds {
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 10.0,
        }
    }

    fn rasterizer(z_min: f64, z_max: f64, aggregate: AggregateMethod) -> HeightRasterizer {
        HeightRasterizer {
            width: 10,
            height: 10,
            gsd: 1.0,
            z_min,
            z_max,
            aggregate,
        }
    }

    fn rasterize(rasterizer: &HeightRasterizer, points: Vec<Point>) -> GrayImage {
        let cloud = PointCloud::from_points(points);
        let indices: Vec<usize> = (0..cloud.len()).collect();
        rasterizer.rasterize(&cloud, &indices, &tile())
    }

    #[test]
    fn test_single_point_intensity() {
        let raster = rasterize(
            &rasterizer(0.0, 40.0, AggregateMethod::Sum),
            vec![point(5.0, 5.0, 20.0)],
        );

        // Column 5, five cells up from the bottom, flipped to image row 4.
        assert_eq!(raster.get_pixel(5, 4), &Luma([128u8]));
        assert_eq!(raster.get_pixel(0, 0), &Luma([0u8]));
        assert_eq!(raster.dimensions(), (10, 10));
    }

    #[test]
    fn test_sum_aggregation_accumulates_shared_cells() {
        let raster = rasterize(
            &rasterizer(0.0, 100.0, AggregateMethod::Sum),
            vec![point(2.5, 7.5, 10.0), point(2.9, 7.1, 20.0)],
        );

        assert_eq!(raster.get_pixel(2, 2), &Luma([77u8]));
    }

    #[test]
    fn test_mean_aggregation_averages_shared_cells() {
        let raster = rasterize(
            &rasterizer(0.0, 100.0, AggregateMethod::Mean),
            vec![point(2.5, 7.5, 10.0), point(2.9, 7.1, 20.0)],
        );

        assert_eq!(raster.get_pixel(2, 2), &Luma([38u8]));
    }

    #[test]
    fn test_max_aggregation_keeps_highest() {
        let raster = rasterize(
            &rasterizer(0.0, 100.0, AggregateMethod::Max),
            vec![point(2.5, 7.5, 10.0), point(2.9, 7.1, 20.0)],
        );

        assert_eq!(raster.get_pixel(2, 2), &Luma([51u8]));
    }

    #[test]
    fn test_max_keeps_heights_below_zero() {
        // The first point must replace the zero seed, not lose to it.
        let raster = rasterize(
            &rasterizer(-10.0, 10.0, AggregateMethod::Max),
            vec![point(5.0, 5.0, -3.0)],
        );

        assert_eq!(raster.get_pixel(5, 4), &Luma([89u8]));
    }

    #[test]
    fn test_out_of_range_heights_clamp() {
        let raster = rasterize(
            &rasterizer(0.0, 100.0, AggregateMethod::Sum),
            vec![point(1.0, 1.0, 1000.0), point(8.0, 8.0, -50.0)],
        );

        assert_eq!(raster.get_pixel(1, 8), &Luma([255u8]));
        assert_eq!(raster.get_pixel(8, 1), &Luma([0u8]));
    }

    #[test]
    fn test_empty_cells_normalize_to_background() {
        let raster = rasterize(&rasterizer(-10.0, 10.0, AggregateMethod::Sum), Vec::new());

        for pixel in raster.pixels() {
            assert_eq!(pixel, &Luma([128u8]));
        }
    }

    #[test]
    fn test_row_zero_is_max_y_edge() {
        let raster = rasterize(
            &rasterizer(0.0, 100.0, AggregateMethod::Sum),
            vec![point(3.0, 9.5, 50.0), point(6.0, 0.5, 50.0)],
        );

        assert_eq!(raster.get_pixel(3, 0), &Luma([128u8]));
        assert_eq!(raster.get_pixel(6, 9), &Luma([128u8]));
    }

    #[test]
    fn test_seam_coordinates_clamp_into_last_cell() {
        // A coordinate exactly on the upper seam divides to the cell count
        // itself; the clamp folds it into the last cell instead of indexing
        // past the grid.
        let raster = rasterize(
            &rasterizer(0.0, 100.0, AggregateMethod::Sum),
            vec![point(10.0, 10.0, 50.0)],
        );

        assert_eq!(raster.get_pixel(9, 0), &Luma([128u8]));
    }
}
