//! Per-pixel colour space conversions
//!
//! 8-bit conventions: YCrCb with chroma centred on 128, HSV with hue
//! halved into 0..180 so it fits a byte.

use image::Rgb;

fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// BT.601 luma of an RGB pixel
pub fn luma(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    saturate(0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
}

/// RGB → `[Y, Cr, Cb]`
pub fn rgb_to_ycrcb(px: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = px.0.map(f32::from);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cr = (r - y) * 0.713 + 128.0;
    let cb = (b - y) * 0.564 + 128.0;
    [saturate(y), saturate(cr), saturate(cb)]
}

/// `[Y, Cr, Cb]` → RGB
pub fn ycrcb_to_rgb([y, cr, cb]: [u8; 3]) -> Rgb<u8> {
    let y = y as f32;
    let cr = cr as f32 - 128.0;
    let cb = cb as f32 - 128.0;
    Rgb([
        saturate(y + 1.403 * cr),
        saturate(y - 0.714 * cr - 0.344 * cb),
        saturate(y + 1.773 * cb),
    ])
}

/// RGB → `[H, S, V]` with H in 0..180
pub fn rgb_to_hsv(px: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = px.0.map(f32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [saturate(h / 2.0), saturate(s), saturate(v)]
}

/// Whether `hsv` lies inside the inclusive box `lower..=upper`
pub fn in_range(hsv: [u8; 3], lower: [u8; 3], upper: [u8; 3]) -> bool {
    (0..3).all(|i| lower[i] <= hsv[i] && hsv[i] <= upper[i])
}
