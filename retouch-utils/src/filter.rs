//! Fixed-kernel spatial filters on 8-bit images.
//!
//! Both filters address out-of-range samples with reflect-101 borders
//! (`dcb|abcd|cba`) and round their results back to bytes. Rows are processed
//! in parallel with rayon; results do not depend on the thread count.

use image::{ImageBuffer, Pixel};
use rayon::prelude::*;

/// Largest kernel accepted by [`gaussian_kernel`].
pub const MAX_KERNEL_SIZE: u32 = 63;

/// Normalised 1-D Gaussian weights for an odd kernel size.
///
/// Sizes up to 7 use the classical binomial tables; larger sizes derive sigma
/// from the size as `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`. Even sizes are
/// bumped to the next odd size.
pub fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let ksize = (ksize.clamp(1, MAX_KERNEL_SIZE)) | 1;
    match ksize {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
            ];
        }
        _ => {}
    }

    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (ksize / 2) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut weights: Vec<f32> = (-radius..=radius)
        .map(|d| (-((d * d) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    if sum > 0.0 {
        for weight in weights.iter_mut() {
            *weight /= sum;
        }
    }
    weights
}

/// Reflect-101 index mapping for a coordinate that may fall outside `0..len`.
#[inline]
pub fn reflect101(index: i64, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let len = len as i64;
    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * len - 2 - i;
        }
    }
    i as usize
}

/// Separable Gaussian blur with an explicit kernel size.
pub fn gaussian_blur<P>(image: &ImageBuffer<P, Vec<u8>>, ksize: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    let kernel = gaussian_kernel(ksize);
    if kernel.len() == 1 {
        return image.clone();
    }

    let (w, h) = image.dimensions();
    let (width, height) = (w as usize, h as usize);
    let channels = P::CHANNEL_COUNT as usize;
    let stride = width * channels;
    let radius = (kernel.len() / 2) as i64;
    let src = image.as_raw();

    let mut out = ImageBuffer::<P, Vec<u8>>::new(w, h);
    if width == 0 || height == 0 {
        return out;
    }

    let mut horizontal = vec![0f32; stride * height];
    horizontal
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * stride..(y + 1) * stride];
            for x in 0..width {
                for c in 0..channels {
                    let mut acc = 0.0;
                    for (k, weight) in kernel.iter().enumerate() {
                        let sx = reflect101(x as i64 + k as i64 - radius, width);
                        acc += weight * src_row[sx * channels + c] as f32;
                    }
                    row[x * channels + c] = acc;
                }
            }
        });

    let dst: &mut [u8] = &mut out;
    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for (i, value) in row.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect101(y as i64 + k as i64 - radius, height);
                acc += weight * horizontal[sy * stride + i];
            }
            *value = acc.round().clamp(0.0, 255.0) as u8;
        }
    });

    out
}

/// Edge-preserving bilateral filter over a circular window of `diameter`.
///
/// Spatial weights fall off with `sigma_space`; range weights use the L1
/// distance between the center and neighbour colors and fall off with
/// `sigma_color`.
pub fn bilateral_filter<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    let (w, h) = image.dimensions();
    let (width, height) = (w as usize, h as usize);
    let channels = P::CHANNEL_COUNT as usize;
    let stride = width * channels;
    let radius = (diameter / 2) as i64;
    if width == 0 || height == 0 || radius == 0 {
        return image.clone();
    }

    let sigma_color = sigma_color.max(0.01);
    let sigma_space = sigma_space.max(0.01);
    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    let color_lut: Vec<f32> = (0..=(255 * channels))
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq.sqrt() > radius as f32 {
                continue;
            }
            offsets.push((dx, dy, (dist_sq * space_coeff).exp()));
        }
    }

    let src = image.as_raw();
    let mut out = ImageBuffer::<P, Vec<u8>>::new(w, h);
    let dst: &mut [u8] = &mut out;
    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        let mut acc = vec![0f32; channels];
        for x in 0..width {
            let center = &src[y * stride + x * channels..y * stride + (x + 1) * channels];
            acc.iter_mut().for_each(|a| *a = 0.0);
            let mut weight_sum = 0.0;
            for &(dx, dy, space_weight) in &offsets {
                let sx = reflect101(x as i64 + dx, width);
                let sy = reflect101(y as i64 + dy, height);
                let base = sy * stride + sx * channels;
                let neighbour = &src[base..base + channels];
                let distance: usize = center
                    .iter()
                    .zip(neighbour)
                    .map(|(a, b)| a.abs_diff(*b) as usize)
                    .sum();
                let weight = space_weight * color_lut[distance];
                for (a, v) in acc.iter_mut().zip(neighbour) {
                    *a += weight * *v as f32;
                }
                weight_sum += weight;
            }
            for (c, a) in acc.iter().enumerate() {
                row[x * channels + c] = (a / weight_sum).round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    #[test]
    fn kernels_are_normalised() {
        for ksize in [1, 3, 5, 7, 9, 15] {
            let kernel = gaussian_kernel(ksize);
            assert_eq!(kernel.len() as u32, ksize);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "ksize {ksize} sums to {sum}");
        }
    }

    #[test]
    fn even_kernel_sizes_round_up() {
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn reflect101_mirrors_without_repeating_edge() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(3, 1), 0);
    }

    #[test]
    fn blur_of_flat_image_is_flat() {
        let img = RgbImage::from_pixel(12, 9, image::Rgb([40, 90, 200]));
        let out = gaussian_blur(&img, 15);
        assert_eq!(out, img);
    }

    #[test]
    fn blur_spreads_an_impulse() {
        let mut img = GrayImage::new(9, 9);
        img.put_pixel(4, 4, Luma([255]));
        let out = gaussian_blur(&img, 3);
        assert!(out.get_pixel(4, 4)[0] < 255);
        assert!(out.get_pixel(3, 4)[0] > 0);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn bilateral_preserves_strong_edges() {
        let mut img = GrayImage::new(16, 8);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = Luma([if x < 8 { 20 } else { 230 }]);
        }
        let out = bilateral_filter(&img, 5, 10.0, 5.0);
        assert_eq!(out.get_pixel(7, 4)[0], 20);
        assert_eq!(out.get_pixel(8, 4)[0], 230);
    }

    #[test]
    fn bilateral_smooths_small_noise() {
        let mut img = RgbImage::from_pixel(9, 9, image::Rgb([100, 100, 100]));
        img.put_pixel(4, 4, image::Rgb([112, 112, 112]));
        let out = bilateral_filter(&img, 5, 50.0, 10.0);
        let center = out.get_pixel(4, 4)[0];
        assert!(center < 112 && center >= 100, "center={center}");
    }
}
