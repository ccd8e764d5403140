//! Per-pixel color-space conversions on 8-bit channels.
//!
//! Conversions follow the classical 8-bit conventions used by image codecs:
//! hue is stored halved (0..180) so it fits a byte, saturation and value span
//! 0..255, and luma/chroma use the BT.601 weights with chroma offset by 128.

use image::{GrayImage, Luma, RgbImage};

/// Convert RGB channels (0-255) to HSV (hue in degrees 0-360, saturation/value 0-1).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue = if delta.abs() < f32::EPSILON {
        0.0
    } else if (max - rf).abs() < f32::EPSILON {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if (max - gf).abs() < f32::EPSILON {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };

    let hue = if hue < 0.0 { hue + 360.0 } else { hue };
    let saturation = if max.abs() < f32::EPSILON {
        0.0
    } else {
        delta / max
    };
    (hue, saturation, max)
}

/// HSV packed into bytes: `[hue / 2, saturation * 255, value * 255]`.
pub fn rgb_to_hsv8(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (h, s, v) = rgb_to_hsv(r, g, b);
    let hue = ((h / 2.0).round() as u32 % 180) as u8;
    [hue, to_byte(s * 255.0), to_byte(v * 255.0)]
}

/// BT.601 luma of an RGB triple.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    to_byte(luma_f32(r, g, b))
}

fn luma_f32(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Luma/chroma triple `[Y, Cr, Cb]` with chroma centered on 128.
pub fn rgb_to_ycrcb(r: u8, g: u8, b: u8) -> [u8; 3] {
    let y = luma_f32(r, g, b);
    let cr = (r as f32 - y) * 0.713 + 128.0;
    let cb = (b as f32 - y) * 0.564 + 128.0;
    [to_byte(y), to_byte(cr), to_byte(cb)]
}

/// Single-channel BT.601 luminance image.
pub fn to_gray(image: &RgbImage) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (dst, src) in gray.pixels_mut().zip(image.pixels()) {
        *dst = Luma([luma(src[0], src[1], src[2])]);
    }
    gray
}

/// Histogram equalisation of a grayscale image.
///
/// Each level maps to `round((cdf(v) - cdf_min) * 255 / (N - cdf_min))`, so the
/// darkest occupied level lands on 0 and the brightest on 255. Single-level
/// images are returned unchanged.
pub fn equalize_gray(gray: &GrayImage) -> GrayImage {
    let mut hist = [0u32; 256];
    for px in gray.pixels() {
        hist[px[0] as usize] += 1;
    }
    let lut = equalization_lut(&hist, gray.width() * gray.height());
    let mut out = gray.clone();
    for value in out.iter_mut() {
        *value = lut[*value as usize];
    }
    out
}

fn equalization_lut(hist: &[u32; 256], total: u32) -> [u8; 256] {
    let identity = std::array::from_fn(|i| i as u8);
    let mut cdf = [0u32; 256];
    let mut cumulative = 0u32;
    let mut cdf_min = None;
    for (idx, count) in hist.iter().enumerate() {
        cumulative += *count;
        cdf[idx] = cumulative;
        if cdf_min.is_none() && *count > 0 {
            cdf_min = Some(cumulative);
        }
    }
    let Some(cdf_min) = cdf_min else {
        return identity;
    };
    if cdf_min == total {
        return identity;
    }

    let denom = (total - cdf_min) as f32;
    let mut lut = [0u8; 256];
    for (entry, &cdf_val) in lut.iter_mut().zip(cdf.iter()) {
        *entry = to_byte(cdf_val.saturating_sub(cdf_min) as f32 / denom * 255.0);
    }
    lut
}

/// Round and saturate a float into the 0..=255 byte range.
#[inline]
pub fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
