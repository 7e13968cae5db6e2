// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Skew estimation and correction for binarized rasters
//!
//! The skew angle comes from the minimum-area rotated rectangle around all
//! non-zero pixels. The raster is then rotated about its centre with bicubic
//! sampling and replicated edges, so the output keeps the input dimensions.

use image::{GrayImage, Luma};
use imageproc::geometry::{convex_hull, min_area_rect};
use imageproc::point::Point;
use thiserror::Error;
use tracing::debug;

/// Rotations smaller than this (degrees) are skipped
const MIN_ROTATION_DEGREES: f64 = 1e-3;

/// Edge angles this close to an axis count as axis-aligned
const AXIS_SNAP_DEGREES: f64 = 1e-9;

/// Cubic convolution coefficient (matches the common `a = -0.75` kernel)
const CUBIC_A: f64 = -0.75;

#[derive(Debug, Error)]
pub enum DeskewError {
    #[error("Cannot estimate skew: raster has no non-zero pixels")]
    NoForeground,
}

/// Estimate the rectangle angle in degrees, within `(-90, 0]`
///
/// Returns `None` when the raster has no non-zero pixels.
pub fn min_area_rect_angle(image: &GrayImage) -> Option<f64> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let points = foreground_extremes(image);
    if points.is_empty() {
        return None;
    }

    let hull = convex_hull(&points[..]);
    let (from, to) = match hull.len() {
        0 | 1 => return Some(0.0),
        2 => (hull[0], hull[1]),
        _ => {
            // Corners are integral, so the longer edge gives the steadier angle
            let rect = min_area_rect(&hull);
            if squared_length(rect[0], rect[1]) >= squared_length(rect[1], rect[2]) {
                (rect[0], rect[1])
            } else {
                (rect[1], rect[2])
            }
        }
    };

    let dx = f64::from(to.x - from.x);
    let dy = f64::from(to.y - from.y);
    if dx == 0.0 && dy == 0.0 {
        return Some(0.0);
    }

    let edge = dy.atan2(dx).to_degrees().rem_euclid(90.0);
    if edge < AXIS_SNAP_DEGREES || edge > 90.0 - AXIS_SNAP_DEGREES {
        return Some(0.0);
    }
    Some(-edge)
}

fn squared_length(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = i64::from(b.x - a.x);
    let dy = i64::from(b.y - a.y);
    dx * dx + dy * dy
}

/// Map a rectangle angle to the rotation that levels the content
///
/// Angles below -45 are treated as the complementary edge.
pub fn correction_angle(rect_angle: f64) -> f64 {
    if rect_angle < -45.0 {
        -(90.0 + rect_angle)
    } else {
        -rect_angle
    }
}

/// Estimate and undo the skew of a binarized raster
pub fn deskew(image: &GrayImage) -> Result<GrayImage, DeskewError> {
    let rect_angle = min_area_rect_angle(image).ok_or(DeskewError::NoForeground)?;
    let angle = correction_angle(rect_angle);
    debug!("Deskew: rect angle {:.3}, rotating by {:.3} degrees", rect_angle, angle);

    if angle.abs() < MIN_ROTATION_DEGREES {
        return Ok(image.clone());
    }

    Ok(rotate_about_center(image, angle))
}

/// Rotate counter-clockwise by `degrees` about the raster centre
///
/// Bicubic interpolation; samples outside the raster replicate the nearest
/// edge pixel.
pub fn rotate_about_center(image: &GrayImage, degrees: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    let cx = (f64::from(width) - 1.0) / 2.0;
    let cy = (f64::from(height) - 1.0) / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    GrayImage::from_fn(width, height, |x, y| {
        let dx = f64::from(x) - cx;
        let dy = f64::from(y) - cy;
        let src_x = cx + dx * cos - dy * sin;
        let src_y = cy + dx * sin + dy * cos;
        Luma([sample_bicubic(image, src_x, src_y)])
    })
}

/// Collect the leftmost and rightmost non-zero pixel of every row
///
/// The convex hull of these points equals the hull of all non-zero pixels.
fn foreground_extremes(image: &GrayImage) -> Vec<Point<i32>> {
    let (width, _) = image.dimensions();
    let mut points = Vec::new();

    for (y, row) in image.as_raw().chunks(width as usize).enumerate() {
        let first = row.iter().position(|&v| v != 0);
        let last = row.iter().rposition(|&v| v != 0);
        if let (Some(first), Some(last)) = (first, last) {
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }

    points
}

fn cubic_weight(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1.0 {
        ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        ((CUBIC_A * t - 5.0 * CUBIC_A) * t + 8.0 * CUBIC_A) * t - 4.0 * CUBIC_A
    } else {
        0.0
    }
}

fn clamped(image: &GrayImage, x: i64, y: i64) -> f64 {
    let (width, height) = image.dimensions();
    let x = x.clamp(0, i64::from(width) - 1) as u32;
    let y = y.clamp(0, i64::from(height) - 1) as u32;
    f64::from(image.get_pixel(x, y)[0])
}

fn sample_bicubic(image: &GrayImage, x: f64, y: f64) -> u8 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = 0.0;
    for j in -1..=2 {
        let wy = cubic_weight(fy - j as f64);
        let mut row = 0.0;
        for i in -1..=2 {
            row += cubic_weight(fx - i as f64) * clamped(image, x0 + i, y0 + j);
        }
        acc += wy * row;
    }

    acc.round().clamp(0.0, 255.0) as u8
}
