//! Geometric measurement of polylines
//!
//! Both measures treat the points as a curve parameterized by point index.
//! Because polylines are in raster order they approximate, rather than
//! trace, the underlying ridge.

use crate::config::{CURVATURE_EPSILON, CURVATURE_SIGMA, GAUSSIAN_TRUNCATE, MIN_CURVATURE_POINTS};
use crate::types::{LineFeatures, Point, Polyline};
use tracing::warn;

/// Sum of Euclidean distances between consecutive points
///
/// Returns `0.0` for fewer than two points.
pub fn length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x as f64 - pair[0].x as f64;
            let dy = pair[1].y as f64 - pair[0].y as f64;
            dx.hypot(dy)
        })
        .sum()
}

/// Mean absolute curvature after Gaussian smoothing of x and y
///
/// Returns `0.0` for fewer than `MIN_CURVATURE_POINTS` points.
pub fn curvature(points: &[Point], sigma: f64) -> f64 {
    if points.len() < MIN_CURVATURE_POINTS {
        return 0.0;
    }

    let xs: Vec<f64> = points.iter().map(|p| p.x as f64).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y as f64).collect();
    let x = gaussian_filter1d(&xs, sigma);
    let y = gaussian_filter1d(&ys, sigma);

    let dx = gradient(&x);
    let dy = gradient(&y);
    let ddx = gradient(&dx);
    let ddy = gradient(&dy);

    let total: f64 = (0..points.len())
        .map(|i| {
            let num = (dx[i] * ddy[i] - dy[i] * ddx[i]).abs();
            let den = (dx[i] * dx[i] + dy[i] * dy[i]).powf(1.5) + CURVATURE_EPSILON;
            (num / den).abs()
        })
        .sum();

    total / points.len() as f64
}

/// Gaussian smoothing with edge-replicated borders
///
/// The kernel spans `GAUSSIAN_TRUNCATE` standard deviations each side.
pub fn gaussian_filter1d(values: &[f64], sigma: f64) -> Vec<f64> {
    if values.is_empty() || sigma <= 0.0 {
        return values.to_vec();
    }

    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();
    let norm: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= norm);

    let last = values.len() as isize - 1;
    (0..values.len() as isize)
        .map(|i| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .map(|(w, k)| w * values[(i + k).clamp(0, last) as usize])
                .sum()
        })
        .collect()
}

/// Discrete derivative: central differences inside, one-sided at the ends
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| match i {
            0 => values[1] - values[0],
            i if i == n - 1 => values[n - 1] - values[n - 2],
            i => (values[i + 1] - values[i - 1]) / 2.0,
        })
        .collect()
}

impl LineFeatures {
    /// Measure length and curvature of a polyline
    pub fn measure(line: &Polyline) -> Self {
        Self {
            length: length(&line.points),
            curvature: curvature(&line.points, CURVATURE_SIGMA),
        }
    }
}

/// Measure a polyline given in its `x,y x,y ...` wire form
///
/// A malformed string measures as zero length and zero curvature.
pub fn measure_encoded(encoded: &str) -> LineFeatures {
    match encoded.parse::<Polyline>() {
        Ok(line) => LineFeatures::measure(&line),
        Err(err) => {
            warn!(error = %err, "unreadable polyline, measuring as zero");
            LineFeatures::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(u32, u32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_length_basic() {
        assert!((length(&pts(&[(0, 0), (3, 4), (3, 10)])) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_reversal_invariant() {
        let mut points = pts(&[(0, 0), (5, 2), (9, 9), (1, 30), (7, 31)]);
        let forward = length(&points);
        points.reverse();
        assert!((forward - length(&points)).abs() < 1e-12);
    }

    #[test]
    fn test_boundaries_return_zero() {
        assert_eq!(length(&[]), 0.0);
        assert_eq!(length(&pts(&[(4, 4)])), 0.0);

        let four = pts(&[(0, 0), (10, 3), (2, 8), (9, 9)]);
        assert_eq!(curvature(&four, 2.0), 0.0);
    }

    #[test]
    fn test_straight_line_has_no_curvature() {
        let diagonal: Vec<Point> = (0..40).map(|i| Point::new(3 * i, 2 * i + 5)).collect();
        assert!(curvature(&diagonal, 2.0) < 1e-6);

        let horizontal: Vec<Point> = (0..40).map(|i| Point::new(i * 4, 7)).collect();
        assert!(curvature(&horizontal, 2.0) < 1e-6);
    }

    #[test]
    fn test_arc_is_curved() {
        let arc: Vec<Point> = (0..40)
            .map(|i| {
                let t = std::f64::consts::PI * i as f64 / 39.0;
                Point::new(
                    (100.0 + 50.0 * t.cos()).round() as u32,
                    (100.0 + 50.0 * t.sin()).round() as u32,
                )
            })
            .collect();
        assert!(curvature(&arc, 2.0) > 0.01);
    }

    #[test]
    fn test_gaussian_filter_preserves_constant_and_ramps() {
        let constant = vec![3.0; 12];
        assert!(gaussian_filter1d(&constant, 2.0)
            .iter()
            .all(|v| (v - 3.0).abs() < 1e-12));

        let ramp: Vec<f64> = (0..40).map(f64::from).collect();
        let smoothed = gaussian_filter1d(&ramp, 2.0);
        assert!((smoothed[20] - 20.0).abs() < 1e-9);
        assert!(smoothed[0] > 0.0);
    }

    #[test]
    fn test_gradient_edges() {
        assert_eq!(gradient(&[1.0, 4.0, 9.0, 16.0]), vec![3.0, 4.0, 6.0, 7.0]);
    }

    #[test]
    fn test_measure_encoded_degrades_to_zero() {
        assert_eq!(measure_encoded("1,2 3,x"), LineFeatures::default());
        let features = measure_encoded("0,0 0,10 0,20");
        assert_eq!(features.length, 20.0);
        assert_eq!(features.curvature, 0.0);
    }

    #[test]
    fn test_measure_is_deterministic() {
        let line: Polyline = "0,0 4,1 9,3 15,7 20,14 24,22".parse().unwrap();
        assert_eq!(LineFeatures::measure(&line), LineFeatures::measure(&line));
    }
}
