//! Error types for the palm pipeline

use thiserror::Error;

/// Failures that abort an analysis
///
/// Everything else in the pipeline degrades to empty or zero-valued
/// results instead of failing.
#[derive(Error, Debug)]
pub enum PalmError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,
}

/// Failure to parse the `x,y x,y ...` polyline wire format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineParseError {
    #[error("Point `{0}` is not of the form x,y")]
    MissingSeparator(String),

    #[error("Invalid coordinate in point `{0}`")]
    InvalidCoordinate(String),
}

pub type Result<T> = std::result::Result<T, PalmError>;
