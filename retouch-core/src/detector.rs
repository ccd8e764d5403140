//! Heuristic face/skin region detection.
//!
//! Two classical strategies are tried in a fixed order and the first one that
//! produces regions wins:
//!
//! 1. skin-color thresholding in HSV, cleaned with a morphological open/close;
//! 2. edge contours of the histogram-equalised grayscale image.
//!
//! A strategy that fails is logged and treated as having found nothing. When
//! neither strategy finds anything, a synthetic region covering the middle of
//! the frame is returned so callers always have a target.

use anyhow::{Result, ensure};
use image::{GrayImage, Luma, RgbImage};
use imageproc::{
    contours::{BorderType, find_contours},
    edges::canny,
    morphology::{Mask, grayscale_close, grayscale_open},
    point::Point,
};
use log::{debug, warn};
use retouch_utils::{
    ContourFilter, DetectionSettings,
    color::{equalize_gray, rgb_to_hsv8, to_gray},
    timing_guard,
};

use crate::region::Region;

/// One entry of the ordered detection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    /// HSV skin-tone band plus contour filtering.
    SkinColor,
    /// Canny edges of the equalised luminance plus contour filtering.
    Shape,
}

impl DetectionStrategy {
    /// Strategies in the order they are attempted.
    pub const ORDER: [DetectionStrategy; 2] = [Self::SkinColor, Self::Shape];

    pub fn name(self) -> &'static str {
        match self {
            Self::SkinColor => "skin-color",
            Self::Shape => "shape",
        }
    }
}

/// Classical region detector configured by [`DetectionSettings`].
#[derive(Debug, Clone, Default)]
pub struct RegionDetector {
    settings: DetectionSettings,
}

impl RegionDetector {
    pub fn new(settings: DetectionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Locate candidate regions in `image`.
    ///
    /// Never returns an empty list for a non-empty image. Regions are reported
    /// in contour-search order.
    pub fn detect(&self, image: &RgbImage) -> Vec<Region> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let _guard = timing_guard("retouch_core::detector::detect", log::Level::Debug);

        for strategy in DetectionStrategy::ORDER {
            match self.run(strategy, image) {
                Ok(regions) if !regions.is_empty() => {
                    debug!(
                        "{} strategy found {} region(s)",
                        strategy.name(),
                        regions.len()
                    );
                    return regions;
                }
                Ok(_) => debug!("{} strategy found no regions", strategy.name()),
                Err(err) => warn!("{} detection failed: {err:#}", strategy.name()),
            }
        }

        let fallback = Region::center_of(width, height);
        debug!("no regions detected; using center fallback {fallback:?}");
        vec![fallback]
    }

    /// Run a single strategy without the fallback.
    pub fn run(&self, strategy: DetectionStrategy, image: &RgbImage) -> Result<Vec<Region>> {
        ensure!(
            image.width() > 0 && image.height() > 0,
            "cannot detect regions in an empty image"
        );
        match strategy {
            DetectionStrategy::SkinColor => self.detect_by_skin_color(image),
            DetectionStrategy::Shape => self.detect_by_shape(image),
        }
    }

    fn detect_by_skin_color(&self, image: &RgbImage) -> Result<Vec<Region>> {
        let _guard = timing_guard("retouch_core::detector::skin_color", log::Level::Trace);
        let mask = skin_mask(image, &self.settings);
        let kernel = elliptical_kernel();
        let cleaned = grayscale_close(&grayscale_open(&mask, &kernel), &kernel);
        Ok(external_regions(&cleaned, &self.settings.skin_contours))
    }

    fn detect_by_shape(&self, image: &RgbImage) -> Result<Vec<Region>> {
        let _guard = timing_guard("retouch_core::detector::shape", log::Level::Trace);
        let settings = &self.settings;
        ensure!(
            settings.canny_low <= settings.canny_high,
            "edge thresholds are inverted ({} > {})",
            settings.canny_low,
            settings.canny_high
        );
        let equalized = equalize_gray(&to_gray(image));
        let edges = canny(&equalized, settings.canny_low, settings.canny_high);
        Ok(external_regions(&edges, &settings.shape_contours))
    }
}

/// Binary mask (0 or 255) of pixels inside the configured HSV skin band.
pub fn skin_mask(image: &RgbImage, settings: &DetectionSettings) -> GrayImage {
    let in_band = |value: u8, band: [u8; 2]| band[0] <= value && value <= band[1];
    let (w, h) = image.dimensions();
    let mut mask = GrayImage::new(w, h);
    for (dst, px) in mask.pixels_mut().zip(image.pixels()) {
        let [hue, sat, val] = rgb_to_hsv8(px[0], px[1], px[2]);
        let skin = in_band(hue, settings.skin_hue)
            && in_band(sat, settings.skin_saturation)
            && in_band(val, settings.skin_value);
        *dst = Luma([if skin { 255 } else { 0 }]);
    }
    mask
}

/// 5x5 elliptical structuring element.
fn elliptical_kernel() -> Mask {
    const ROWS: [[u8; 5]; 5] = [
        [0, 0, 1, 0, 0],
        [1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1],
        [0, 0, 1, 0, 0],
    ];
    let image = GrayImage::from_fn(5, 5, |x, y| Luma([ROWS[y as usize][x as usize] * 255]));
    Mask::from_image(&image, 2, 2)
}

/// Bounding rectangles of the outermost contours in `binary` that pass `filter`.
pub fn external_regions(binary: &GrayImage, filter: &ContourFilter) -> Vec<Region> {
    let (width, height) = binary.dimensions();
    let total_pixels = width as f64 * height as f64;
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|contour| contour.parent.is_none() && contour.border_type == BorderType::Outer)
        .filter_map(|contour| {
            let region = Region::bounding(&contour.points)?.clamped(width, height)?;
            let area = polygon_area(&contour.points);
            filter
                .accepts(area, region.width, region.height, total_pixels)
                .then_some(region)
        })
        .collect()
}

/// Enclosed area of a closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const SKIN: Rgb<u8> = Rgb([220, 170, 140]);
    const BACKDROP: Rgb<u8> = Rgb([30, 60, 200]);

    fn portrait_like() -> RgbImage {
        RgbImage::from_fn(200, 200, |x, y| {
            if (60..140).contains(&x) && (60..140).contains(&y) {
                SKIN
            } else {
                BACKDROP
            }
        })
    }

    #[test]
    fn shoelace_area_of_square() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn skin_mask_selects_skin_tones_only() {
        let mask = skin_mask(&portrait_like(), &DetectionSettings::default());
        assert_eq!(mask.get_pixel(100, 100)[0], 255);
        assert_eq!(mask.get_pixel(10, 10)[0], 0);
    }

    #[test]
    fn skin_strategy_finds_the_patch() {
        let detector = RegionDetector::default();
        let regions = detector
            .run(DetectionStrategy::SkinColor, &portrait_like())
            .expect("skin strategy");
        assert_eq!(regions.len(), 1);
        let region = regions[0];
        assert!((58..=62).contains(&region.x), "{region:?}");
        assert!((58..=62).contains(&region.y), "{region:?}");
        assert!((76..=82).contains(&region.width), "{region:?}");
        assert!((76..=82).contains(&region.height), "{region:?}");
        assert_eq!(detector.detect(&portrait_like()), regions);
    }

    #[test]
    fn oversized_and_elongated_blobs_are_rejected() {
        let filter = ContourFilter::default();
        let mut mask = GrayImage::new(200, 200);
        for y in 10..30 {
            for x in 10..190 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        assert!(external_regions(&mask, &filter).is_empty());

        let full = GrayImage::from_pixel(200, 200, Luma([255]));
        assert!(external_regions(&full, &filter).is_empty());
    }

    #[test]
    fn flat_image_falls_back_to_center() {
        let flat = RgbImage::from_pixel(120, 80, Rgb([128, 128, 128]));
        let regions = RegionDetector::default().detect(&flat);
        assert_eq!(regions, vec![Region::new(30, 20, 60, 40)]);
    }

    #[test]
    fn failing_strategy_is_treated_as_empty() {
        let settings = DetectionSettings {
            canny_low: 200.0,
            canny_high: 10.0,
            ..DetectionSettings::default()
        };
        let detector = RegionDetector::new(settings);
        let flat = RgbImage::from_pixel(40, 40, Rgb([10, 10, 10]));
        assert!(detector.run(DetectionStrategy::Shape, &flat).is_err());
        assert_eq!(detector.detect(&flat), vec![Region::center_of(40, 40)]);
    }

    fn gray_block() -> RgbImage {
        RgbImage::from_fn(160, 120, |x, y| {
            if (50..110).contains(&x) && (30..90).contains(&y) {
                Rgb([200, 200, 200])
            } else {
                Rgb([40, 40, 40])
            }
        })
    }

    #[test]
    fn shape_strategy_outlines_a_contrasting_block() {
        let detector = RegionDetector::default();
        let regions = detector
            .run(DetectionStrategy::Shape, &gray_block())
            .expect("shape strategy");
        assert_eq!(regions.len(), 1, "{regions:?}");
        let region = regions[0];
        assert!((46..=52).contains(&region.x), "{region:?}");
        assert!((26..=32).contains(&region.y), "{region:?}");
        assert!((58..=66).contains(&region.width), "{region:?}");
        assert!((58..=66).contains(&region.height), "{region:?}");
    }

    #[test]
    fn shape_result_wins_when_no_skin_is_found() {
        let detector = RegionDetector::default();
        let image = gray_block();
        assert!(
            detector
                .run(DetectionStrategy::SkinColor, &image)
                .expect("skin strategy")
                .is_empty()
        );
        let shape = detector
            .run(DetectionStrategy::Shape, &image)
            .expect("shape strategy");
        let regions = detector.detect(&image);
        assert_eq!(regions, shape);
        assert_ne!(regions, vec![Region::center_of(160, 120)]);
        for region in regions {
            assert!(region.x + region.width <= 160);
            assert!(region.y + region.height <= 120);
        }
    }

    #[test]
    fn empty_image_yields_nothing() {
        let detector = RegionDetector::default();
        assert!(detector.detect(&RgbImage::new(0, 0)).is_empty());
        assert!(detector.run(DetectionStrategy::SkinColor, &RgbImage::new(0, 0)).is_err());
    }
}
