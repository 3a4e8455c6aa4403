/// Point cloud coordinate bounds tracking.
use serde::{Deserialize, Serialize};

/// Axis-aligned extent of a point cloud, accumulated point by point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl PointCloudBounds {
    /// Create new bounds initialised to infinity values.
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    /// Update bounds with a new point.
    pub fn update(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    /// Merge another set of bounds into this one.
    pub fn merge(mut self, other: Self) -> Self {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
        self.min_z = self.min_z.min(other.min_z);
        self.max_z = self.max_z.max(other.max_z);
        self
    }

    /// World space dimensions (width, height, depth).
    pub fn dimensions(&self) -> (f64, f64, f64) {
        (
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        )
    }

    /// True once at least one point has been folded in.
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y && self.min_z <= self.max_z
    }
}

impl Default for PointCloudBounds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_tracks_extremes() {
        let mut bounds = PointCloudBounds::new();
        bounds.update(1.0, 2.0, 3.0);
        bounds.update(-4.0, 5.0, 0.5);

        assert!((bounds.min_x + 4.0).abs() < 1e-12);
        assert!((bounds.max_x - 1.0).abs() < 1e-12);
        assert!((bounds.min_y - 2.0).abs() < 1e-12);
        assert!((bounds.max_y - 5.0).abs() < 1e-12);
        assert!((bounds.min_z - 0.5).abs() < 1e-12);
        assert!((bounds.max_z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_combines_partials() {
        let mut left = PointCloudBounds::new();
        left.update(0.0, 0.0, 0.0);
        let mut right = PointCloudBounds::new();
        right.update(10.0, -10.0, 5.0);

        let merged = left.merge(right);
        assert!((merged.min_x - 0.0).abs() < 1e-12);
        assert!((merged.max_x - 10.0).abs() < 1e-12);
        assert!((merged.min_y + 10.0).abs() < 1e-12);
        assert!((merged.max_y - 0.0).abs() < 1e-12);
        assert!((merged.max_z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_fresh_bounds_are_invalid() {
        assert!(!PointCloudBounds::new().is_valid());

        let mut bounds = PointCloudBounds::new();
        bounds.update(1.0, 1.0, 1.0);
        assert!(bounds.is_valid());
    }

    #[test]
    fn test_dimensions() {
        let mut bounds = PointCloudBounds::new();
        bounds.update(0.0, 0.0, -2.0);
        bounds.update(4.0, 3.0, 2.0);

        let (width, height, depth) = bounds.dimensions();
        assert!((width - 4.0).abs() < 1e-12);
        assert!((height - 3.0).abs() < 1e-12);
        assert!((depth - 4.0).abs() < 1e-12);
    }
}
