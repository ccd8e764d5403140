use anyhow::{Context, Result};
use image::{DynamicImage, RgbImage, RgbaImage, buffer::ConvertBuffer, imageops::FilterType};

/// Decode an encoded image (JPEG, PNG, BMP, WebP) from memory.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    anyhow::ensure!(!bytes.is_empty(), "image data is empty");
    let image = image::load_from_memory(bytes).context("failed to decode image data")?;
    anyhow::ensure!(
        image.width() > 0 && image.height() > 0,
        "decoded image has no pixels"
    );
    Ok(image)
}

/// Dimensions that fit `(width, height)` inside a `max_side` square while
/// preserving aspect ratio. Never upscales.
pub fn fit_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let max_side = max_side.max(1) as f64;
    let scale = (max_side / width as f64).min(max_side / height as f64).min(1.0);
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// Downscale an image so neither side exceeds `max_side`.
///
/// # Arguments
///
/// * `image` - The image to fit.
/// * `max_side` - Largest allowed width or height in pixels.
pub fn fit_to_max_side(image: DynamicImage, max_side: u32) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    let (fw, fh) = fit_dimensions(w, h, max_side);
    if (fw, fh) == (w, h) {
        return image;
    }
    image.resize_exact(fw, fh, FilterType::Triangle)
}

/// Convert a display buffer into the three-channel working layout (alpha dropped).
pub fn to_working(image: &RgbaImage) -> RgbImage {
    image.convert()
}

/// Convert the working layout back to display RGBA, taking alpha from
/// `alpha_source` where it has the same dimensions and using opaque alpha
/// otherwise.
pub fn to_display(image: &RgbImage, alpha_source: Option<&RgbaImage>) -> RgbaImage {
    let mut display: RgbaImage = image.convert();
    if let Some(source) = alpha_source
        && source.dimensions() == image.dimensions()
    {
        for (dst, src) in display.pixels_mut().zip(source.pixels()) {
            dst[3] = src[3];
        }
    }
    display
}
