/// Source point cloud loading and per-tile point selection.
use crate::bounds::PointCloudBounds;
use crate::error::{Error, Result};
use crate::grid::TileBounds;
use indicatif::{ProgressBar, ProgressStyle};
use las::Reader;
use log::info;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A fully loaded point cloud shared immutably across tile tasks.
///
/// Points keep their source attributes so tile subsets can be written back
/// out under the source schema. The cloned header carries that schema,
/// including scale, offset, and compression.
pub struct PointCloud {
    points: Vec<las::Point>,
    header: las::Header,
    source_id: String,
    source_extension: String,
    bounds: PointCloudBounds,
}

impl PointCloud {
    /// Load every point of a LAS/LAZ file into memory and accumulate the
    /// cloud extent.
    ///
    /// Open and decode failures are fatal; there is no partial cloud.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = Self::create_reader(path)?;
        let header = reader.header().clone();
        let total_points = header.number_of_points() as usize;

        info!(
            "Source {}: LAS {}.{} with {} points",
            path.display(),
            header.version().major,
            header.version().minor,
            total_points
        );

        // Load points with progress tracking.
        let pb = ProgressBar::new(total_points as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}")
                .unwrap()
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Loading points");

        let mut points = Vec::with_capacity(total_points);
        for (idx, point_result) in reader.points().enumerate() {
            let point = point_result.map_err(|source| Error::SourceRead {
                path: path.to_path_buf(),
                source,
            })?;
            points.push(point);

            if idx % 50_000 == 0 {
                pb.set_position(idx as u64);
            }
        }
        pb.finish_with_message("Points loaded");

        // Accumulate the extent in parallel chunks.
        let bounds = points
            .par_chunks(25_000)
            .map(|chunk| {
                let mut local_bounds = PointCloudBounds::new();
                for point in chunk {
                    local_bounds.update(point.x, point.y, point.z);
                }
                local_bounds
            })
            .reduce_with(PointCloudBounds::merge)
            .unwrap_or_else(PointCloudBounds::new);

        let source_id = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let source_extension = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("laz") => "laz".to_string(),
            _ => "las".to_string(),
        };

        Ok(Self {
            points,
            header,
            source_id,
            source_extension,
            bounds,
        })
    }

    /// Indices of the points inside a tile's half-open bounds.
    ///
    /// Selection is by index so callers can reach back to the full source
    /// attributes of each selected point.
    pub fn select_within(&self, tile: &TileBounds) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, point)| tile.contains(point.x, point.y))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn points(&self) -> &[las::Point] {
        &self.points
    }

    /// Source header, reused verbatim for tile subset output.
    pub fn header(&self) -> &las::Header {
        &self.header
    }

    /// Source file stem used to name tile artifacts.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Extension for tile subsets, keeping compressed sources compressed.
    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    pub fn bounds(&self) -> &PointCloudBounds {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Create LAS file reader for point cloud access.
    /// Handles both .las and .laz compressed formats.
    fn create_reader(path: &Path) -> Result<Reader> {
        let file = File::open(path).map_err(|source| Error::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let buf_reader = BufReader::new(file);
        Reader::new(buf_reader).map_err(|source| Error::SourceRead {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_points(points: Vec<las::Point>) -> Self {
        let mut bounds = PointCloudBounds::new();
        for point in &points {
            bounds.update(point.x, point.y, point.z);
        }
        Self {
            points,
            header: las::Header::default(),
            source_id: "cloud".to_string(),
            source_extension: "las".to_string(),
            bounds,
        }
    }
}
