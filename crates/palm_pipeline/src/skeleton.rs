//! Parallel thinning
//!
//! Reduces foreground regions to 1-pixel-wide centre lines while keeping
//! each region connected. Two sub-iterations peel the north-east and the
//! south-west borders in turn. A pixel is only removed when its neighbours
//! form a single 8-connected run, so 2-pixel diagonal ridges and small
//! blocks keep a trace instead of vanishing. Pixels outside the image count
//! as background.

use image::{GrayImage, Luma};

/// Thin every non-zero region of `mask` to width 1
///
/// Output pixels are `0` or `255`. Applying it to its own output returns
/// the same image.
pub fn skeletonize(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut grid: Vec<bool> = mask.pixels().map(|p| p[0] > 0).collect();

    let mut doomed = Vec::new();
    loop {
        let mut changed = false;
        for pass in [Pass::NorthEast, Pass::SouthWest] {
            doomed.clear();
            for y in 0..h {
                for x in 0..w {
                    if grid[y * w + x] && removable(&neighbours(&grid, w, h, x, y), pass) {
                        doomed.push(y * w + x);
                    }
                }
            }
            changed |= !doomed.is_empty();
            for &i in &doomed {
                grid[i] = false;
            }
        }
        if !changed {
            break;
        }
    }

    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        Luma([if grid[y as usize * w + x as usize] { 255 } else { 0 }])
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    NorthEast,
    SouthWest,
}

/// Neighbours counter-clockwise from east: E, NE, N, NW, W, SW, S, SE
fn neighbours(grid: &[bool], w: usize, h: usize, x: usize, y: usize) -> [bool; 8] {
    let at = |dx: isize, dy: isize| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
            false
        } else {
            grid[ny as usize * w + nx as usize]
        }
    };
    [
        at(1, 0),
        at(1, -1),
        at(0, -1),
        at(-1, -1),
        at(-1, 0),
        at(-1, 1),
        at(0, 1),
        at(1, 1),
    ]
}

fn removable(n: &[bool; 8], pass: Pass) -> bool {
    if crossing_number(n) != 1 {
        return false;
    }
    if !(2..=3).contains(&thickness(n)) {
        return false;
    }

    // Index 0 is east, 4 is west
    match pass {
        Pass::NorthEast => !((n[1] || n[2] || !n[7]) && n[0]),
        Pass::SouthWest => !((n[5] || n[6] || !n[3]) && n[4]),
    }
}

/// Number of 8-connected foreground runs around the centre pixel
fn crossing_number(n: &[bool; 8]) -> usize {
    [0, 2, 4, 6]
        .into_iter()
        .filter(|&i| !n[i] && (n[i + 1] || n[(i + 2) % 8]))
        .count()
}

/// Smaller of the two pairwise occupancy counts around the centre
///
/// Below 2 the pixel is a line end; above 3 it is interior.
fn thickness(n: &[bool; 8]) -> usize {
    let mut n1 = 0;
    let mut n2 = 0;
    for k in [1, 3, 5, 7] {
        n1 += usize::from(n[k - 1] || n[k]);
        n2 += usize::from(n[k] || n[(k + 1) % 8]);
    }
    n1.min(n2)
}
