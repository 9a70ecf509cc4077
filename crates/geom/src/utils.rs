//! Small distance and direction helpers shared by the normalizer and the verification engine.

use crate::math::{Point, Vector};

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    (b - a).length()
}

/// Sum of the segment lengths of a polyline. Zero for fewer than two points.
pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Index of the point closest to `query`, or `None` if `points` is empty.
///
/// Ties resolve to the lowest index.
pub fn closest_point_index(query: Point, points: &[Point]) -> Option<usize> {
    let mut closest = None;
    let mut min = f32::INFINITY;
    for (idx, p) in points.iter().enumerate() {
        let d = (*p - query).square_length();
        if d < min {
            min = d;
            closest = Some(idx);
        }
    }

    closest
}

/// Absolute angle between two direction vectors, in degrees within `[0, 180]`.
///
/// Zero-length vectors have no direction and yield zero.
pub fn angle_between(a: Vector, b: Vector) -> f32 {
    if a.square_length() == 0.0 || b.square_length() == 0.0 {
        return 0.0;
    }

    a.cross(b).abs().atan2(a.dot(b)).to_degrees()
}

/// Angle between the directions `source_from -> source_to` and
/// `candidate_from -> candidate_to`, normalized to `[0, 1]` (180 degrees maps to 1).
pub fn direction_diff(
    source_from: Point,
    source_to: Point,
    candidate_from: Point,
    candidate_to: Point,
) -> f32 {
    angle_between(source_to - source_from, candidate_to - candidate_from) / 180.0
}

/// Rounds to a fixed number of decimals.
#[inline]
pub fn round_to_decimals(value: f32, decimals: u32) -> f32 {
    let factor = 10f64.powi(decimals as i32);
    ((value as f64 * factor).round() / factor) as f32
}

#[cfg(test)]
use crate::math::point;

#[test]
fn direction_diff_of_same_vector_is_zero() {
    let a = point(3.0, 4.0);
    let b = point(10.0, -2.0);
    assert_eq!(direction_diff(a, b, a, b), 0.0);
    let scaled = direction_diff(a, b, point(0.0, 0.0), point(0.0, 0.0) + (b - a) * 3.0);
    assert!(scaled.abs() < 1e-5);
}

#[test]
fn direction_diff_opposite_and_orthogonal() {
    let o = point(0.0, 0.0);
    let x = point(1.0, 0.0);
    let y = point(0.0, 1.0);
    assert!((direction_diff(o, x, x, o) - 1.0).abs() < 1e-6);
    assert!((direction_diff(o, x, o, y) - 0.5).abs() < 1e-6);
    // Degenerate vectors have no direction.
    assert_eq!(direction_diff(o, o, o, y), 0.0);
}

#[test]
fn closest_point_exact_match() {
    let points = [point(0.0, 0.0), point(5.0, 0.0), point(10.0, 0.0), point(5.0, 0.0)];
    assert_eq!(closest_point_index(point(10.0, 0.0), &points), Some(2));
    assert_eq!(closest_point_index(point(5.0, 0.0), &points), Some(1));
    assert_eq!(closest_point_index(point(1.0, 1.0), &points), Some(0));
    assert_eq!(closest_point_index(point(1.0, 1.0), &[]), None);
}

#[test]
fn polyline_lengths() {
    assert_eq!(polyline_length(&[]), 0.0);
    assert_eq!(polyline_length(&[point(1.0, 1.0)]), 0.0);
    let l = polyline_length(&[point(0.0, 0.0), point(3.0, 4.0), point(3.0, 10.0)]);
    assert!((l - 11.0).abs() < 1e-6);
}

#[test]
fn rounding() {
    assert_eq!(round_to_decimals(1.234567, 2), 1.23);
    assert_eq!(round_to_decimals(-0.125, 0), 0.0);
    assert_eq!(round_to_decimals(10.0, 5), 10.0);
}
