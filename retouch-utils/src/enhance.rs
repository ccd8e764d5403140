//! Individual enhancement stages of the retouch pipeline.
//!
//! Each stage consumes its input buffer and returns a new owned buffer, so the
//! previous stage's pixels are released as soon as the next stage finishes.
//! Stages whose strength is zero hand their input back untouched. All
//! arithmetic saturates to 0..=255 per stage.

use image::{GrayImage, Luma, RgbImage};

use crate::{
    color::{rgb_to_ycrcb, to_byte},
    filter::{bilateral_filter, gaussian_blur},
    telemetry::timing_guard,
};

/// Kernel size of the fixed blur applied inside detected face regions.
pub const REGION_BLUR_KERNEL: u32 = 15;
/// Kernel size used to feather the skin chroma mask.
pub const SKIN_MASK_BLUR_KERNEL: u32 = 9;
/// Inclusive Cr band treated as skin.
pub const SKIN_CR_RANGE: (u8, u8) = (133, 173);
/// Inclusive Cb band treated as skin.
pub const SKIN_CB_RANGE: (u8, u8) = (77, 127);

/// Per-channel means of an image, in channel order.
pub fn channel_means(image: &RgbImage) -> [f64; 3] {
    let count = image.width() as f64 * image.height() as f64;
    if count == 0.0 {
        return [0.0; 3];
    }
    let mut sums = [0f64; 3];
    for px in image.pixels() {
        for (sum, value) in sums.iter_mut().zip(px.0) {
            *sum += value as f64;
        }
    }
    sums.map(|s| s / count)
}

/// Blur the `width` x `height` rectangle at `(x, y)` in place with a fixed
/// Gaussian kernel. The rectangle is clipped to the image.
pub fn blur_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, ksize: u32) {
    let (iw, ih) = image.dimensions();
    if x >= iw || y >= ih {
        return;
    }
    let width = width.min(iw - x);
    let height = height.min(ih - y);
    if width == 0 || height == 0 {
        return;
    }
    let patch = image::imageops::crop_imm(&*image, x, y, width, height).to_image();
    let blurred = gaussian_blur(&patch, ksize);
    image::imageops::replace(image, &blurred, x as i64, y as i64);
}

/// Gray-world white balance.
///
/// With `k = strength / 50`, every channel is scaled by
/// `1 + k * (avg - mean_c) / 128`, where `avg` is the mean of the three channel
/// means. Positive strength pulls the channel means together; negative
/// strength pushes them apart.
pub fn white_balance(image: RgbImage, strength: i32) -> RgbImage {
    if strength == 0 {
        return image;
    }
    let _guard = timing_guard("retouch_utils::enhance::white_balance", log::Level::Trace);
    let means = channel_means(&image);
    let avg = means.iter().sum::<f64>() / 3.0;
    let k = strength as f64 / 50.0;
    let scales = means.map(|mean| (1.0 + k * (avg - mean) / 128.0) as f32);

    let mut out = image;
    for px in out.pixels_mut() {
        for (value, scale) in px.0.iter_mut().zip(scales) {
            *value = to_byte(*value as f32 * scale);
        }
    }
    out
}

/// Bilateral smoothing parameters `(diameter, sigma_color, sigma_space)` for a
/// slider strength.
pub fn smoothing_parameters(strength: i32) -> (u32, f32, f32) {
    let s = strength as f32;
    let diameter = (3.0 + s).round().clamp(3.0, 25.0) as u32;
    (diameter, 25.0 + 4.0 * s, 12.0 + 2.0 * s)
}

/// Edge-preserving smoothing. Identity for `strength <= 0`.
pub fn smooth(image: RgbImage, strength: i32) -> RgbImage {
    if strength <= 0 {
        return image;
    }
    let _guard = timing_guard("retouch_utils::enhance::smooth", log::Level::Trace);
    let (diameter, sigma_color, sigma_space) = smoothing_parameters(strength);
    bilateral_filter(&image, diameter, sigma_color, sigma_space)
}

/// Binary mask (0 or 255) of pixels whose chroma falls in the skin band.
pub fn skin_chroma_mask(image: &RgbImage) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut mask = GrayImage::new(w, h);
    for (dst, px) in mask.pixels_mut().zip(image.pixels()) {
        let [_, cr, cb] = rgb_to_ycrcb(px[0], px[1], px[2]);
        let skin = (SKIN_CR_RANGE.0..=SKIN_CR_RANGE.1).contains(&cr)
            && (SKIN_CB_RANGE.0..=SKIN_CB_RANGE.1).contains(&cb);
        *dst = Luma([if skin { 255 } else { 0 }]);
    }
    mask
}

/// Blur kernel size used for skin softening at `strength`.
pub fn skin_blur_kernel(strength: i32) -> u32 {
    3 + 2 * (strength as f32 / 10.0).round().max(0.0) as u32
}

/// Copy `overlay` over `base` wherever `mask` is non-zero.
pub fn composite_masked(base: RgbImage, overlay: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = base;
    for ((dst, src), m) in out.pixels_mut().zip(overlay.pixels()).zip(mask.pixels()) {
        if m[0] != 0 {
            *dst = *src;
        }
    }
    out
}

/// Skin softening guided by a feathered chroma mask. Identity for `strength <= 0`.
pub fn soften_skin(image: RgbImage, strength: i32) -> RgbImage {
    if strength <= 0 {
        return image;
    }
    let _guard = timing_guard("retouch_utils::enhance::soften_skin", log::Level::Trace);
    let mask = gaussian_blur(&skin_chroma_mask(&image), SKIN_MASK_BLUR_KERNEL);
    let blurred = gaussian_blur(&image, skin_blur_kernel(strength));
    composite_masked(image, &blurred, &mask)
}

/// Linear remap `alpha * v + beta` with `alpha = 1 + contrast / 100` and
/// `beta = brightness`.
pub fn brightness_contrast(image: RgbImage, brightness: i32, contrast: i32) -> RgbImage {
    if brightness == 0 && contrast == 0 {
        return image;
    }
    let _guard = timing_guard("retouch_utils::enhance::brightness_contrast", log::Level::Trace);
    let alpha = 1.0 + contrast as f32 / 100.0;
    let beta = brightness as f32;
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = to_byte(alpha * i as f32 + beta);
    }

    let mut out = image;
    for value in out.iter_mut() {
        *value = lut[*value as usize];
    }
    out
}

/// Unsharp-mask parameters `(kernel size, amount)` for a slider strength.
pub fn clarity_parameters(strength: i32) -> (u32, f32) {
    let s = strength as f32;
    let ksize = 1 + 2 * (s / 40.0).round().max(0.0) as u32;
    (ksize, s / 100.0)
}

/// Unsharp masking: `v * (1 + amount) - blur(v) * amount`. Identity for
/// `strength <= 0`.
pub fn clarity(image: RgbImage, strength: i32) -> RgbImage {
    if strength <= 0 {
        return image;
    }
    let _guard = timing_guard("retouch_utils::enhance::clarity", log::Level::Trace);
    let (ksize, amount) = clarity_parameters(strength);
    let blurred = gaussian_blur(&image, ksize);
    let mut out = image;
    for (value, soft) in out.iter_mut().zip(blurred.iter()) {
        *value = to_byte(*value as f32 * (1.0 + amount) - *soft as f32 * amount);
    }
    out
}
