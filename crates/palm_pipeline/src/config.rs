//! Compiled-in tuning constants
//!
//! Every threshold used by the pipeline lives here so it can be tuned
//! without touching algorithm code. Nothing is configurable at runtime.

/// Images whose longer side is below this are upsampled to it
pub const MIN_LONG_SIDE: u32 = 900;

/// Kernel size of the blur used as the illumination background estimate
pub const ILLUMINATION_KERNEL: u32 = 41;

/// Lower HSV bound of the skin-tone mask (H in 0..180, S and V in 0..256)
pub const SKIN_HSV_LOWER: [u8; 3] = [0, 10, 40];

/// Upper HSV bound of the skin-tone mask
pub const SKIN_HSV_UPPER: [u8; 3] = [35, 200, 255];

/// Kernel size used to soften the skin mask before intersecting
pub const SKIN_BLUR_KERNEL: u32 = 7;

/// Kernel size of the grayscale blur ahead of adaptive thresholding
pub const GRAY_BLUR_KERNEL: u32 = 5;

/// Neighbourhood size of the adaptive threshold
pub const ADAPTIVE_BLOCK_SIZE: u32 = 25;

/// Amount a pixel must sit below its local mean to count as a ridge
pub const ADAPTIVE_OFFSET: i16 = 7;

/// Radius of the square opening/closing element (radius 1 is 3×3)
pub const MORPH_RADIUS: u8 = 1;

/// Radius of the square dilation element approximating the hand (5×5)
pub const HAND_REGION_RADIUS: u8 = 2;

/// Number of dilation passes approximating the hand
pub const HAND_REGION_ITERATIONS: usize = 2;

/// Skeleton components with fewer pixels than this are noise
pub const MIN_COMPONENT_AREA: usize = 80;

/// Keep every n-th raster-order pixel when building a polyline
pub const POLYLINE_STRIDE: usize = 4;

/// At most this many components receive a role
pub const MAX_LINES: usize = 4;

/// Gaussian sigma (in point-index units) used before differentiating
pub const CURVATURE_SIGMA: f64 = 2.0;

/// Gaussian kernel half-width in multiples of sigma
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Polylines shorter than this have zero curvature
pub const MIN_CURVATURE_POINTS: usize = 5;

/// Floor added to the curvature denominator
pub const CURVATURE_EPSILON: f64 = 1e-8;

/// Life lines longer than this read as "long"
pub const LIFE_LENGTH_THRESHOLD: f64 = 400.0;

/// Heart lines with mean curvature above this read as "curved"
pub const HEART_CURVATURE_THRESHOLD: f64 = 0.01;

/// Head lines longer than this read as "long"
pub const HEAD_LENGTH_THRESHOLD: f64 = 350.0;

/// Kernel size used to soften the visualization mask for overlays
pub const OVERLAY_BLUR_KERNEL: u32 = 5;

/// Weight of the photograph in the overlay blend
pub const OVERLAY_BASE_WEIGHT: f32 = 0.85;

/// Weight of the coloured mask in the overlay blend
pub const OVERLAY_MASK_WEIGHT: f32 = 0.8;

/// Gaussian sigma matching a square kernel of `ksize` pixels
///
/// Uses the conventional `0.3 * ((k - 1) * 0.5 - 1) + 0.8` rule so kernel
/// sizes stay the tuning unit.
pub fn sigma_for_kernel(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
