//! The ordered enhancement chain.
//!
//! `render` never touches the caller's buffer: it normalises into an owned
//! working copy, threads that copy through each stage by value, and converts
//! the final stage back into the display layout.

use image::{RgbImage, RgbaImage};
use log::{debug, trace};
use retouch_utils::{
    ParameterSet,
    enhance::{
        REGION_BLUR_KERNEL, blur_rect, brightness_contrast, clarity, smooth, soften_skin,
        white_balance,
    },
    image_utils::{to_display, to_working},
    timing_guard,
};

use crate::region::{REGION_EXPANSION, Region};

/// Render `source` with `params`.
///
/// The smart skin pre-blur runs only when `ai_enabled` is set and `regions`
/// is non-empty. Returns `None` for an empty source.
pub fn render(
    source: &RgbaImage,
    params: &ParameterSet,
    regions: &[Region],
    ai_enabled: bool,
) -> Option<RgbaImage> {
    if source.width() == 0 || source.height() == 0 {
        debug!("render skipped: empty source buffer");
        return None;
    }
    let _guard = timing_guard("retouch_core::pipeline::render", log::Level::Debug);
    let params = params.sanitized();

    let mut working = to_working(source);
    if ai_enabled && !regions.is_empty() {
        working = smart_skin(working, regions);
    }
    let working = white_balance(working, params.white_balance);
    let working = smooth(working, params.smooth);
    let working = soften_skin(working, params.skin);
    let working = brightness_contrast(working, params.brightness, params.contrast);
    let working = clarity(working, params.clarity);

    Some(to_display(&working, Some(source)))
}

/// Blur each region, grown by [`REGION_EXPANSION`] on every side, in place.
pub fn smart_skin(mut image: RgbImage, regions: &[Region]) -> RgbImage {
    let _guard = timing_guard("retouch_core::pipeline::smart_skin", log::Level::Trace);
    let (width, height) = image.dimensions();
    for region in regions {
        let Some(target) = region.expanded(REGION_EXPANSION, width, height) else {
            trace!("skipping region {region:?} outside {width}x{height}");
            continue;
        };
        blur_rect(
            &mut image,
            target.x,
            target.y,
            target.width,
            target.height,
            REGION_BLUR_KERNEL,
        );
    }
    image
}
