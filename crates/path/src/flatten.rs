//! Adaptive flattening of cubic bézier curves by recursive midpoint subdivision.

use crate::geom::math::Point;
use crate::geom::CubicBezierSegment;

/// Subdivision stops at this depth even if the flatness criterion is not met.
const MAX_DEPTH: u32 = 16;

/// Calls `callback` with one vertex per flat enough piece of the curve.
///
/// The curve is split in halves at `t = 0.5` until the distance of both control points to
/// the chord satisfies `(d1 + d2)² < tolerance² × chord_length²`. Each flat piece emits its
/// own midpoint, in curve order. Neither the start nor the end of the curve is emitted.
pub fn flatten_cubic<F>(curve: &CubicBezierSegment<f32>, tolerance: f32, callback: &mut F)
where
    F: FnMut(Point),
{
    flatten_recursive(curve, tolerance * tolerance, 0, callback);
}

fn flatten_recursive<F>(
    curve: &CubicBezierSegment<f32>,
    tolerance_sq: f32,
    depth: u32,
    callback: &mut F,
) where
    F: FnMut(Point),
{
    let (first, second) = curve.split(0.5);

    if depth >= MAX_DEPTH || is_flat(curve, tolerance_sq) {
        callback(first.to);
        return;
    }

    flatten_recursive(&first, tolerance_sq, depth + 1, callback);
    flatten_recursive(&second, tolerance_sq, depth + 1, callback);
}

fn is_flat(curve: &CubicBezierSegment<f32>, tolerance_sq: f32) -> bool {
    let chord = curve.to - curve.from;
    if chord.square_length() == 0.0 {
        // A loop is never flat, a single point always is.
        return curve.ctrl1 == curve.from && curve.ctrl2 == curve.from;
    }

    let d1 = (curve.ctrl1 - curve.to).cross(chord).abs();
    let d2 = (curve.ctrl2 - curve.to).cross(chord).abs();

    (d1 + d2) * (d1 + d2) < tolerance_sq * chord.square_length()
}

#[cfg(test)]
use crate::geom::math::point;

#[cfg(test)]
fn flatten(curve: &CubicBezierSegment<f32>, tolerance: f32) -> Vec<Point> {
    let mut points = Vec::new();
    flatten_cubic(curve, tolerance, &mut |p| points.push(p));
    points
}

#[test]
fn flat_curve_emits_its_midpoint() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 0.0),
        ctrl2: point(2.0, 0.0),
        to: point(3.0, 0.0),
    };

    assert_eq!(flatten(&curve, 0.1), vec![point(1.5, 0.0)]);
}

#[test]
fn tighter_tolerance_emits_more_vertices() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(0.0, 100.0),
        ctrl2: point(100.0, 100.0),
        to: point(100.0, 0.0),
    };

    let coarse = flatten(&curve, 0.1);
    let fine = flatten(&curve, 0.001);
    assert!(coarse.len() > 1);
    assert!(fine.len() > coarse.len());

    for p in &fine {
        let t = curve.sample(0.5);
        assert!(p.y <= t.y + 1e-3);
    }
}

#[test]
fn closed_loop() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(10.0, 10.0),
        ctrl2: point(-10.0, 10.0),
        to: point(0.0, 0.0),
    };

    let points = flatten(&curve, 0.01);
    assert!(points.len() > 2);
    assert!(points.len() < 1 << MAX_DEPTH);
    assert!(points.iter().any(|p| p.x > 0.0));
    assert!(points.iter().any(|p| p.x < 0.0));
}

#[test]
fn degenerate_point() {
    let p = point(3.0, 4.0);
    let curve = CubicBezierSegment {
        from: p,
        ctrl1: p,
        ctrl2: p,
        to: p,
    };

    assert_eq!(flatten(&curve, 0.001), vec![p]);
}
