//! Core types for the palm-line pipeline
//!
//! These are the values handed from one stage to the next: components
//! found in the skeleton, the polylines sampled from them, the roles they
//! are assigned, and the features measured on each.

use crate::error::PolylineParseError;
use image::GrayImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Inclusive bounding box of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Bounds {
    /// Degenerate box around a single pixel
    pub fn around(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Grow the box to cover `p`
    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// An 8-connected group of skeleton pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComponent {
    /// Pixel count, used as a length proxy
    pub area: usize,
    /// Bounding box of the pixels
    pub bounds: Bounds,
    /// Pixels in row-major scan order
    pub pixels: Vec<Point>,
}

impl LineComponent {
    /// Build a component from raster-ordered pixels
    ///
    /// Returns `None` for an empty pixel list.
    pub fn from_pixels(pixels: Vec<Point>) -> Option<Self> {
        let first = *pixels.first()?;
        let mut bounds = Bounds::around(first);
        for p in &pixels[1..] {
            bounds.include(*p);
        }
        Some(Self {
            area: pixels.len(),
            bounds,
            pixels,
        })
    }
}

/// Ordered point sequence sampled from one component
///
/// Points follow raster-scan order, not a walk along the ridge. The wire
/// form is whitespace-separated `x,y` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polyline {
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Keep every `stride`-th pixel of a component, starting with the first
    pub fn sampled(component: &LineComponent, stride: usize) -> Self {
        let points = component
            .pixels
            .iter()
            .step_by(stride.max(1))
            .copied()
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl fmt::Display for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        Ok(())
    }
}

impl FromStr for Polyline {
    type Err = PolylineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let points = s
            .split_whitespace()
            .map(|token| {
                let (x, y) = token
                    .split_once(',')
                    .ok_or_else(|| PolylineParseError::MissingSeparator(token.to_string()))?;
                let parse = |v: &str| {
                    v.parse::<u32>()
                        .map_err(|_| PolylineParseError::InvalidCoordinate(token.to_string()))
                };
                Ok(Point::new(parse(x)?, parse(y)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points })
    }
}

impl Serialize for Polyline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Polyline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Semantic role of a palm line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineRole {
    Life,
    Head,
    Heart,
    Fate,
}

impl LineRole {
    /// Roles in rank order: the largest component is the life line
    pub const ALL: [LineRole; 4] = [
        LineRole::Life,
        LineRole::Head,
        LineRole::Heart,
        LineRole::Fate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineRole::Life => "life",
            LineRole::Head => "head",
            LineRole::Heart => "heart",
            LineRole::Fate => "fate",
        }
    }
}

impl fmt::Display for LineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polylines keyed by the role they were assigned
pub type NamedLines = BTreeMap<LineRole, Polyline>;

/// Scalar geometry of one line
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineFeatures {
    /// Summed distance between consecutive points
    pub length: f64,
    /// Mean absolute curvature
    pub curvature: f64,
}

/// Output of the extraction stage
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Union of the pixels of every component that received a role
    pub visualization: GrayImage,
    /// Polyline per assigned role
    pub lines: NamedLines,
}

/// Final result of analysing one palm photograph
#[derive(Debug, Clone)]
pub struct FortuneResult {
    /// Space-joined narrative sentences
    pub narrative: String,
    /// Mask of the classified lines, sized like the working image
    pub visualization: GrayImage,
    /// Polyline per role
    pub lines: NamedLines,
    /// Measured features per role
    pub features: BTreeMap<LineRole, LineFeatures>,
}
