//! Line extraction
//!
//! Skeletonizes the ridge mask, keeps the part lying in the main hand
//! region, splits it into connected components and samples a polyline
//! from each surviving component.

use crate::classify::{rank_components, LineClassifier, RankClassifier};
use crate::config::{HAND_REGION_ITERATIONS, HAND_REGION_RADIUS, MIN_COMPONENT_AREA, POLYLINE_STRIDE};
use crate::skeleton::skeletonize;
use crate::types::{Extraction, LineComponent, NamedLines, Point, Polyline};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::{debug, warn};

/// Extract named lines with the default rank-based classifier
pub fn extract_lines(mask: &GrayImage) -> Extraction {
    extract(mask, &RankClassifier)
}

/// Extract named lines from a binary ridge mask
///
/// An empty result is not an error: `lines` is empty and the
/// visualization is all background.
pub fn extract(mask: &GrayImage, classifier: &dyn LineClassifier) -> Extraction {
    let skeleton = skeletonize(mask);
    let region = hand_region(&skeleton);
    let skeleton = intersect(&skeleton, &region);

    let ranked = rank_components(surviving_components(&skeleton));
    debug!(components = ranked.len(), "ranked skeleton components");

    let mut visualization = GrayImage::new(mask.width(), mask.height());
    let mut lines = NamedLines::new();

    for (role, index) in classifier.assign(&ranked) {
        let Some(component) = ranked.get(index) else {
            warn!(%role, index, "classifier chose a missing component");
            continue;
        };
        if lines.contains_key(&role) {
            warn!(%role, "classifier assigned a role twice, keeping the first");
            continue;
        }
        for p in &component.pixels {
            visualization.put_pixel(p.x, p.y, Luma([255]));
        }
        lines.insert(role, Polyline::sampled(component, POLYLINE_STRIDE));
    }

    debug!(lines = lines.len(), "extracted palm lines");
    Extraction {
        visualization,
        lines,
    }
}

/// Approximate the hand as the largest blob of the dilated skeleton
pub fn hand_region(skeleton: &GrayImage) -> GrayImage {
    let mut region = skeleton.clone();
    for _ in 0..HAND_REGION_ITERATIONS {
        region = morphology::dilate(&region, Norm::LInf, HAND_REGION_RADIUS);
    }
    largest_region(&region)
}

/// Keep only the largest 8-connected region of `mask`
///
/// Ties go to the region found first in raster order. A mask without
/// foreground is returned unchanged.
pub fn largest_region(mask: &GrayImage) -> GrayImage {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    let mut areas: Vec<usize> = Vec::new();
    for p in labels.pixels() {
        let label = p[0] as usize;
        if label == 0 {
            continue;
        }
        if label >= areas.len() {
            areas.resize(label + 1, 0);
        }
        areas[label] += 1;
    }

    let mut best: Option<(u32, usize)> = None;
    for (label, &area) in areas.iter().enumerate().skip(1) {
        if area > best.map_or(0, |(_, a)| a) {
            best = Some((label as u32, area));
        }
    }
    let Some((best, _)) = best else {
        return mask.clone();
    };

    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if labels.get_pixel(x, y)[0] == best { 255 } else { 0 }])
    })
}

/// Pixel-wise AND of two masks
pub fn intersect(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let on = a.get_pixel(x, y)[0] > 0 && b.get_pixel(x, y)[0] > 0;
        Luma([if on { 255 } else { 0 }])
    })
}

/// 8-connected components of a skeleton, in label order
pub fn label_components(skeleton: &GrayImage) -> Vec<LineComponent> {
    let labels = connected_components(skeleton, Connectivity::Eight, Luma([0u8]));

    let mut buckets: Vec<Vec<Point>> = Vec::new();
    for (x, y, p) in labels.enumerate_pixels() {
        let label = p[0] as usize;
        if label == 0 {
            continue;
        }
        if label > buckets.len() {
            buckets.resize_with(label, Vec::new);
        }
        buckets[label - 1].push(Point::new(x, y));
    }

    buckets
        .into_iter()
        .filter_map(LineComponent::from_pixels)
        .collect()
}

/// Components large enough to be palm lines rather than noise
pub fn surviving_components(skeleton: &GrayImage) -> Vec<LineComponent> {
    let components = label_components(skeleton);
    let total = components.len();
    let kept: Vec<LineComponent> = components
        .into_iter()
        .filter(|c| c.area >= MIN_COMPONENT_AREA)
        .collect();
    debug!(total, kept = kept.len(), "filtered short components");
    kept
}
