//! Image preprocessing module
//!
//! Turns a colour palm photograph into a binary ridge mask:
//! - Upsampling of small inputs
//! - Histogram equalization and illumination correction of luma
//! - Skin-tone masking
//! - Adaptive thresholding of dark ridges
//! - Morphological cleanup

use crate::color::{in_range, luma, rgb_to_hsv, rgb_to_ycrcb, ycrcb_to_rgb};
use crate::config::{
    sigma_for_kernel, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_OFFSET, GRAY_BLUR_KERNEL,
    ILLUMINATION_KERNEL, MIN_LONG_SIDE, MORPH_RADIUS, SKIN_BLUR_KERNEL, SKIN_HSV_LOWER,
    SKIN_HSV_UPPER,
};
use crate::error::{PalmError, Result};
use crate::extract::intersect;
use image::imageops::FilterType;
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology;
use std::borrow::Cow;
use tracing::debug;

/// Preprocess a palm photograph into a binary ridge mask
///
/// The mask has the size of the (possibly upsampled) image and contains
/// only `0` and `255`. An empty mask is a valid result.
pub fn preprocess(image: &RgbImage) -> Result<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PalmError::EmptyImage);
    }

    let image = upscale(image);
    let corrected = correct_illumination(&image);

    let skin = skin_mask(&corrected);
    let ridges = ridge_mask(&corrected);

    let combined = intersect(&ridges, &skin);

    let opened = morphology::open(&combined, Norm::LInf, MORPH_RADIUS);
    let closed = morphology::close(&opened, Norm::LInf, MORPH_RADIUS);

    debug!(
        width = closed.width(),
        height = closed.height(),
        foreground = count_foreground(&closed),
        "preprocessed ridge mask"
    );

    Ok(closed)
}

/// Upsample so the longer side reaches `MIN_LONG_SIDE`
pub fn upscale(image: &RgbImage) -> Cow<'_, RgbImage> {
    let (w, h) = image.dimensions();
    let long = w.max(h);
    if long >= MIN_LONG_SIDE {
        return Cow::Borrowed(image);
    }

    let scale = MIN_LONG_SIDE as f64 / long as f64;
    let new_w = ((w as f64 * scale) as u32).max(1);
    let new_h = ((h as f64 * scale) as u32).max(1);
    debug!(from = ?(w, h), to = ?(new_w, new_h), "upsampling small image");

    Cow::Owned(image::imageops::resize(
        image,
        new_w,
        new_h,
        FilterType::CatmullRom,
    ))
}

/// Equalize and flatten the luma channel, keeping chroma
pub fn correct_illumination(image: &RgbImage) -> RgbImage {
    let ycrcb: Vec<[u8; 3]> = image.pixels().map(rgb_to_ycrcb).collect();
    let luma_plane = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([ycrcb[(y * image.width() + x) as usize][0]])
    });

    let flattened = normalize_illumination(&equalize(&luma_plane));

    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [_, cr, cb] = ycrcb[(y * image.width() + x) as usize];
        ycrcb_to_rgb([flattened.get_pixel(x, y)[0], cr, cb])
    })
}

/// Histogram equalization that leaves single-valued images unchanged
pub fn equalize(plane: &GrayImage) -> GrayImage {
    let mut seen = [false; 256];
    for p in plane.pixels() {
        seen[p[0] as usize] = true;
    }
    if seen.iter().filter(|s| **s).count() <= 1 {
        return plane.clone();
    }
    imageproc::contrast::equalize_histogram(plane)
}

/// Divide by a heavily blurred copy to cancel large-scale shading
pub fn normalize_illumination(plane: &GrayImage) -> GrayImage {
    let background = gaussian_blur_f32(plane, sigma_for_kernel(ILLUMINATION_KERNEL));
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        let bg = background.get_pixel(x, y)[0] as f32;
        if bg == 0.0 {
            return Luma([0]);
        }
        let v = plane.get_pixel(x, y)[0] as f32 * 255.0 / bg;
        Luma([v.round().min(255.0) as u8])
    })
}

/// Softened skin-tone mask; any non-zero pixel counts as skin
pub fn skin_mask(image: &RgbImage) -> GrayImage {
    let hard = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let hsv = rgb_to_hsv(image.get_pixel(x, y));
        let on = in_range(hsv, SKIN_HSV_LOWER, SKIN_HSV_UPPER);
        Luma([if on { 255 } else { 0 }])
    });
    gaussian_blur_f32(&hard, sigma_for_kernel(SKIN_BLUR_KERNEL))
}

/// Pixels noticeably darker than their neighbourhood
pub fn ridge_mask(image: &RgbImage) -> GrayImage {
    let gray = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luma(image.get_pixel(x, y))])
    });
    let gray = gaussian_blur_f32(&gray, sigma_for_kernel(GRAY_BLUR_KERNEL));
    adaptive_threshold_inv(&gray, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_OFFSET)
}

/// Inverted Gaussian-weighted adaptive threshold
///
/// A pixel becomes foreground when it is at least `offset` below the
/// Gaussian-weighted mean of its `block_size` neighbourhood.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, offset: i16) -> GrayImage {
    let local_mean = gaussian_blur_f32(gray, sigma_for_kernel(block_size));
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0] as i16;
        let mean = local_mean.get_pixel(x, y)[0] as i16;
        Luma([if v - mean <= -offset { 255 } else { 0 }])
    })
}

pub(crate) fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_preprocess_black_image_is_empty() {
        let img = RgbImage::from_pixel(120, 80, Rgb([0, 0, 0]));
        let mask = preprocess(&img).unwrap();

        assert_eq!(mask.dimensions(), (900, 600));
        assert_eq!(count_foreground(&mask), 0);
    }

    #[test]
    fn test_preprocess_mask_is_binary() {
        let img = RgbImage::from_fn(300, 200, |x, y| {
            if (x / 7 + y / 5) % 3 == 0 {
                Rgb([120, 80, 60])
            } else {
                Rgb([224, 172, 140])
            }
        });
        let mask = preprocess(&img).unwrap();

        assert_eq!(mask.dimensions(), (900, 600));
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_preprocess_rejects_empty_image() {
        let img = RgbImage::new(0, 10);
        assert!(matches!(preprocess(&img), Err(PalmError::EmptyImage)));
    }

    #[test]
    fn test_upscale_keeps_large_images() {
        let img = RgbImage::new(1000, 40);
        assert!(matches!(upscale(&img), Cow::Borrowed(_)));

        let small = RgbImage::new(450, 300);
        assert_eq!(upscale(&small).dimensions(), (900, 600));
    }

    #[test]
    fn test_equalize_constant_plane_unchanged() {
        let plane = GrayImage::from_pixel(10, 10, Luma([42]));
        assert_eq!(equalize(&plane), plane);
    }

    #[test]
    fn test_normalize_illumination_flattens_uniform_plane() {
        let plane = GrayImage::from_pixel(50, 50, Luma([100]));
        let flat = normalize_illumination(&plane);
        assert!(flat.pixels().all(|p| p[0] == 255));

        let black = GrayImage::new(20, 20);
        assert!(normalize_illumination(&black).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_stroke() {
        let gray = GrayImage::from_fn(60, 60, |x, _| {
            if (29..=30).contains(&x) {
                Luma([60])
            } else {
                Luma([200])
            }
        });
        let mask = adaptive_threshold_inv(&gray, 25, 7);

        assert_eq!(mask.get_pixel(29, 30)[0], 255);
        assert_eq!(mask.get_pixel(5, 30)[0], 0);
    }

    #[test]
    fn test_skin_mask_covers_skin_only() {
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 {
                Rgb([224, 172, 140])
            } else {
                Rgb([20, 40, 230])
            }
        });
        let skin = skin_mask(&img);
        assert!(skin.get_pixel(5, 10)[0] > 0);
        assert_eq!(skin.get_pixel(35, 10)[0], 0);
    }
}
