//! Core pipeline for palmlines
//!
//! This crate turns a photograph of a palm into four named lines (life,
//! head, heart, fate), measures their length and curvature, and writes a
//! short fortune from those measurements. Stages run strictly forward:
//! preprocessing, skeleton extraction, role assignment, measurement and
//! narration.

pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod extract;
pub mod measure;
pub mod narrative;
pub mod pipeline;
pub mod preprocess;
pub mod render;
pub mod skeleton;
pub mod types;

pub use classify::{LineClassifier, RankClassifier};
pub use error::{PalmError, PolylineParseError, Result};
pub use pipeline::PalmReader;
pub use types::*;

use image::RgbImage;
use std::path::Path;

/// Load a colour image from disk
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    let image = image::open(path)?.to_rgb8();
    ensure_pixels(image)
}

/// Decode a colour image from encoded bytes (PNG, JPEG, ...)
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    ensure_pixels(image)
}

fn ensure_pixels(image: RgbImage) -> Result<RgbImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PalmError::EmptyImage);
    }
    Ok(image)
}
