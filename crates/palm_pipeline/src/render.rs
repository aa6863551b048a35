//! Rendering of results onto the photograph

use crate::config::{
    sigma_for_kernel, OVERLAY_BASE_WEIGHT, OVERLAY_BLUR_KERNEL, OVERLAY_MASK_WEIGHT,
};
use crate::types::{LineRole, NamedLines};
use image::imageops::FilterType;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::filter::gaussian_blur_f32;
use std::borrow::Cow;

/// Display colour of each role
pub fn role_color(role: LineRole) -> Rgb<u8> {
    match role {
        LineRole::Life => Rgb([0x3b, 0xf6, 0x5a]),
        LineRole::Head => Rgb([0x3b, 0xd2, 0xf6]),
        LineRole::Heart => Rgb([0xff, 0x4f, 0x6d]),
        LineRole::Fate => Rgb([0xff, 0xcc, 0x33]),
    }
}

/// Black → red → yellow → white ramp
pub fn hot(v: u8) -> Rgb<u8> {
    let t = v as f32 / 255.0;
    let channel = |offset: f32| ((t * 3.0 - offset).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(0.0), channel(1.0), channel(2.0)])
}

/// Blend the visualization mask over the photograph
///
/// The mask is softened, coloured with [`hot`] and added to the base. The
/// result has the mask's size; the base is resized when they differ.
pub fn render_overlay(base: &RgbImage, mask: &GrayImage) -> RgbImage {
    let base = fit(base, mask.width(), mask.height());
    let soft = gaussian_blur_f32(mask, sigma_for_kernel(OVERLAY_BLUR_KERNEL));

    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let photo = base.get_pixel(x, y).0;
        let heat = hot(soft.get_pixel(x, y)[0]).0;
        Rgb(std::array::from_fn(|c| {
            (photo[c] as f32 * OVERLAY_BASE_WEIGHT + heat[c] as f32 * OVERLAY_MASK_WEIGHT)
                .round()
                .min(255.0) as u8
        }))
    })
}

/// Draw each polyline as connected segments in its role colour
///
/// Coordinates are those of the working image the lines were found in;
/// `base` is resized to `(width, height)` first when needed.
pub fn trace_lines(base: &RgbImage, lines: &NamedLines, width: u32, height: u32) -> RgbImage {
    let mut canvas = fit(base, width, height).into_owned();
    for (role, line) in lines {
        let color = role_color(*role);
        for pair in line.points.windows(2) {
            draw_line_segment_mut(
                &mut canvas,
                (pair[0].x as f32, pair[0].y as f32),
                (pair[1].x as f32, pair[1].y as f32),
                color,
            );
        }
    }
    canvas
}

fn fit(base: &RgbImage, width: u32, height: u32) -> Cow<'_, RgbImage> {
    if base.dimensions() == (width, height) {
        Cow::Borrowed(base)
    } else {
        Cow::Owned(image::imageops::resize(base, width, height, FilterType::Triangle))
    }
}
