//! Maps a quality report to proposed slider adjustments.

use retouch_utils::{
    Adjustments, QualityReport,
    quality::{MIN_GOOD_CONTRAST, MIN_GOOD_SHARPNESS},
};

/// Brightness below this is treated as under-exposed.
pub const DARK_THRESHOLD: f64 = 80.0;
/// Brightness above this is treated as over-exposed.
pub const BRIGHT_THRESHOLD: f64 = 180.0;
/// Skin softening proposed when regions were detected.
pub const FACE_SKIN: i32 = 25;
/// Smoothing proposed when regions were detected.
pub const FACE_SMOOTH: i32 = 15;

/// Propose adjustments for an image with `report` and `region_count` detected regions.
///
/// Scalars are rounded to whole units first. Fields that need no change are
/// left as `None`.
pub fn propose(report: &QualityReport, region_count: usize) -> Adjustments {
    let brightness = report.brightness.round();
    let contrast = report.contrast.round();
    let sharpness = report.sharpness.round();
    let mut proposal = Adjustments::default();

    if brightness < DARK_THRESHOLD {
        proposal.brightness = Some((100.0 - brightness).min(50.0) as i32);
    } else if brightness > BRIGHT_THRESHOLD {
        proposal.brightness = Some((150.0 - brightness).max(-30.0) as i32);
    }

    if contrast < MIN_GOOD_CONTRAST {
        proposal.contrast = Some((60.0 - contrast).min(40.0) as i32);
    }

    if sharpness < MIN_GOOD_SHARPNESS {
        proposal.clarity = Some((150.0 - sharpness).min(50.0) as i32);
    }

    if region_count > 0 {
        proposal.skin = Some(FACE_SKIN);
        proposal.smooth = Some(FACE_SMOOTH);
    }

    proposal
}
