//! Axis-aligned regions of interest in source-image coordinates.

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// Fraction of a region's size added on each side before the smart skin blur.
pub const REGION_EXPANSION: f64 = 0.1;

/// Integer rectangle inside the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tight bounding rectangle of a point set. `None` for an empty set.
    pub fn bounding(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let min_x = min_x.max(0) as u32;
        let min_y = min_y.max(0) as u32;
        Some(Self::new(
            min_x,
            min_y,
            (max_x.max(0) as u32 - min_x) + 1,
            (max_y.max(0) as u32 - min_y) + 1,
        ))
    }

    /// Central `50% x 50%` rectangle of an `image_width` x `image_height` buffer.
    pub fn center_of(image_width: u32, image_height: u32) -> Self {
        Self::new(
            image_width / 4,
            image_height / 4,
            (image_width / 2).max(1).min(image_width),
            (image_height / 2).max(1).min(image_height),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `None` for a zero-height region.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }

    /// Clip to the buffer bounds. Returns `None` when nothing remains.
    pub fn clamped(self, image_width: u32, image_height: u32) -> Option<Self> {
        if self.x >= image_width || self.y >= image_height {
            return None;
        }
        let clipped = Self::new(
            self.x,
            self.y,
            self.width.min(image_width - self.x),
            self.height.min(image_height - self.y),
        );
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Grow by `fraction` of the size on every side, clipped to the buffer.
    pub fn expanded(self, fraction: f64, image_width: u32, image_height: u32) -> Option<Self> {
        let margin_x = (self.width as f64 * fraction).round() as u32;
        let margin_y = (self.height as f64 * fraction).round() as u32;
        let x0 = self.x.saturating_sub(margin_x);
        let y0 = self.y.saturating_sub(margin_y);
        let x1 = self
            .x
            .saturating_add(self.width)
            .saturating_add(margin_x)
            .min(image_width);
        let y1 = self
            .y
            .saturating_add(self.height)
            .saturating_add(margin_y)
            .min(image_height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_is_inclusive_of_extreme_points() {
        let points = [Point::new(4, 7), Point::new(10, 3), Point::new(6, 12)];
        assert_eq!(Region::bounding(&points), Some(Region::new(4, 3, 7, 10)));
        assert_eq!(Region::bounding(&[]), None);
    }

    #[test]
    fn center_region_covers_middle_quarter() {
        assert_eq!(Region::center_of(200, 100), Region::new(50, 25, 100, 50));
        let tiny = Region::center_of(1, 1);
        assert_eq!(tiny, Region::new(0, 0, 1, 1));
    }

    #[test]
    fn expansion_adds_ten_percent_and_clamps() {
        let region = Region::new(50, 50, 100, 40);
        assert_eq!(
            region.expanded(REGION_EXPANSION, 400, 400),
            Some(Region::new(40, 46, 120, 48))
        );
        let edge = Region::new(2, 0, 100, 100);
        assert_eq!(
            edge.expanded(REGION_EXPANSION, 105, 105),
            Some(Region::new(0, 0, 105, 105))
        );
    }

    #[test]
    fn clamping_drops_regions_outside_the_buffer() {
        assert_eq!(Region::new(90, 90, 50, 50).clamped(100, 100), Some(Region::new(90, 90, 10, 10)));
        assert_eq!(Region::new(100, 0, 5, 5).clamped(100, 100), None);
        assert_eq!(Region::new(0, 0, 8, 4).aspect_ratio(), Some(2.0));
        assert_eq!(Region::new(0, 0, 8, 0).aspect_ratio(), None);
    }
}
