//! Image quality analysis.
//!
//! Three scalars are derived from the BT.601 luminance of an image: the mean
//! (brightness), the standard deviation (contrast) and the standard deviation
//! of the 4-neighbour Laplacian response (sharpness). The Laplacian measure is
//! the classical focus metric: crisp edges spread its response widely, while a
//! blurred or flat frame keeps it close to zero. An image reads as
//! [`QualityLabel::Good`] only when it has both enough tonal spread
//! (contrast above 30) and enough edge energy (sharpness above 100).

use image::{GrayImage, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{color::to_gray, filter::reflect101, telemetry::timing_guard};

/// Contrast (luminance standard deviation) a good image must exceed.
pub const MIN_GOOD_CONTRAST: f64 = 30.0;
/// Sharpness (Laplacian standard deviation) a good image must exceed.
pub const MIN_GOOD_SHARPNESS: f64 = 100.0;

/// Coarse verdict derived from contrast and sharpness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    Good,
    NeedsImprovement,
}

impl QualityLabel {
    /// Label for the provided contrast and sharpness scores.
    pub fn from_scores(contrast: f64, sharpness: f64) -> Self {
        if contrast > MIN_GOOD_CONTRAST && sharpness > MIN_GOOD_SHARPNESS {
            QualityLabel::Good
        } else {
            QualityLabel::NeedsImprovement
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            QualityLabel::Good => "Good",
            QualityLabel::NeedsImprovement => "Needs improvement",
        }
    }
}

/// Snapshot of the quality scalars for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Mean luminance (0..=255).
    pub brightness: f64,
    /// Standard deviation of luminance.
    pub contrast: f64,
    /// Standard deviation of the Laplacian of luminance.
    pub sharpness: f64,
    pub label: QualityLabel,
}

impl QualityReport {
    fn degenerate() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            sharpness: 0.0,
            label: QualityLabel::NeedsImprovement,
        }
    }
}

/// Mean and population standard deviation of a value stream.
///
/// Returns zeros for an empty stream.
pub fn mean_std_dev(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let (count, sum) = values.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
    (mean, variance.max(0.0).sqrt())
}

/// Laplacian response `[0 1 0; 1 -4 1; 0 1 0]` of a grayscale image with
/// reflect-101 borders.
pub fn laplacian(gray: &GrayImage) -> Array2<f64> {
    let (w, h) = gray.dimensions();
    let (width, height) = (w as usize, h as usize);

    let mut arr = Array2::<f64>::zeros((height, width));
    for (y, mut row) in arr.rows_mut().into_iter().enumerate() {
        for (x, val) in row.iter_mut().enumerate() {
            *val = gray.get_pixel(x as u32, y as u32)[0] as f64;
        }
    }

    let mut lap = Array2::<f64>::zeros((height, width));
    for y in 0..height {
        let up = reflect101(y as i64 - 1, height);
        let down = reflect101(y as i64 + 1, height);
        for x in 0..width {
            let left = reflect101(x as i64 - 1, width);
            let right = reflect101(x as i64 + 1, width);
            lap[[y, x]] = arr[[up, x]] + arr[[down, x]] + arr[[y, left]] + arr[[y, right]]
                - 4.0 * arr[[y, x]];
        }
    }
    lap
}

/// Compute the quality report for an image.
pub fn analyze(image: &RgbImage) -> QualityReport {
    let _guard = timing_guard("retouch_utils::quality::analyze", log::Level::Debug);
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return QualityReport::degenerate();
    }

    let gray = to_gray(image);
    let (brightness, contrast) = mean_std_dev(gray.as_raw().iter().map(|v| *v as f64));
    let lap = laplacian(&gray);
    let (_, sharpness) = mean_std_dev(lap.iter().copied());

    QualityReport {
        brightness,
        contrast,
        sharpness,
        label: QualityLabel::from_scores(contrast, sharpness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            image::Rgb([v, v, v])
        })
    }

    #[test]
    fn label_thresholds_are_exclusive() {
        assert_eq!(
            QualityLabel::from_scores(30.0, 500.0),
            QualityLabel::NeedsImprovement
        );
        assert_eq!(
            QualityLabel::from_scores(31.0, 100.0),
            QualityLabel::NeedsImprovement
        );
        assert_eq!(QualityLabel::from_scores(31.0, 101.0), QualityLabel::Good);
    }

    #[test]
    fn flat_gray_is_degenerate_but_not_an_error() {
        let img = RgbImage::from_pixel(100, 100, image::Rgb([128, 128, 128]));
        let report = analyze(&img);
        assert_eq!(report.brightness, 128.0);
        assert_eq!(report.contrast, 0.0);
        assert_eq!(report.sharpness, 0.0);
        assert_eq!(report.label, QualityLabel::NeedsImprovement);
    }

    #[test]
    fn checkerboard_is_sharp() {
        let report = analyze(&checkerboard(64));
        assert!(report.sharpness > 100.0, "sharpness={}", report.sharpness);
        assert!(report.contrast > 100.0, "contrast={}", report.contrast);
        assert_eq!(report.label, QualityLabel::Good);
    }

    #[test]
    fn empty_image_reports_zeros() {
        let report = analyze(&RgbImage::new(0, 0));
        assert_eq!(report.brightness, 0.0);
        assert_eq!(report.sharpness, 0.0);
        assert_eq!(report.label, QualityLabel::NeedsImprovement);
    }

    #[test]
    fn single_pixel_image_has_zero_laplacian() {
        let img = RgbImage::from_pixel(1, 1, image::Rgb([10, 200, 30]));
        let report = analyze(&img);
        assert_eq!(report.sharpness, 0.0);
    }

    #[test]
    fn mean_std_dev_of_known_values() {
        let (mean, std) = mean_std_dev([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter());
        assert_eq!(mean, 5.0);
        assert_eq!(std, 2.0);
    }
}
