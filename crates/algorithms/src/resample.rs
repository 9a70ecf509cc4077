//! Fixed-distance resampling.
//!
//! The verification engine compares strokes vertex by vertex, which only makes sense if
//! the vertices of both strokes are spread at the same density. The resampler adjusts the
//! vertex count of a polygon to `round(length / distance)` and spaces the vertices evenly
//! along the polyline.
//!
//! ## Example
//!
//! ```
//! use kanji_trace_algorithms::resample::resample;
//! use kanji_trace_algorithms::geom::Polygon;
//! use kanji_trace_algorithms::math::point;
//!
//! let mut stroke = Polygon::from(vec![point(0.0, 0.0), point(100.0, 0.0)]);
//! resample(&mut stroke, 5.0);
//!
//! assert_eq!(stroke.len(), 20);
//! assert_eq!(stroke.first(), Some(point(0.0, 0.0)));
//! assert_eq!(stroke.last(), Some(point(100.0, 0.0)));
//! ```

use crate::math::*;
use crate::{Polygon, PolygonConverter};

/// Resamples each polygon independently, see [`resample`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedDistanceResampler {
    pub distance: f32,
}

impl FixedDistanceResampler {
    pub fn new(distance: f32) -> Self {
        FixedDistanceResampler { distance }
    }
}

impl PolygonConverter for FixedDistanceResampler {
    fn convert(&self, polygons: &mut [Polygon]) {
        for polygon in polygons {
            resample(polygon, self.distance);
        }
    }
}

/// Number of vertices a polygon of the given length has after resampling.
///
/// This is `round(length / distance)`, except that a polygon is never emptied: strokes
/// shorter than half the distance collapse to their first vertex.
pub fn target_vertex_count(length: f32, distance: f32) -> usize {
    ((length / distance).round() as usize).max(1)
}

/// Sets the vertex count of the polygon to [`target_vertex_count`] and spaces the vertices
/// evenly by arc length.
///
/// Extra vertices are removed one at a time from the middle of the polygon, missing ones are
/// added as copies of the last vertex, and the vertices are re-spaced after each step. The
/// first vertex never moves, and neither does the last one unless the polygon collapses to
/// a single vertex. Polygons with fewer than two vertices are left as is,
/// and so is everything when `distance` is not a positive number.
pub fn resample(polygon: &mut Polygon, distance: f32) {
    if polygon.len() <= 1 || !(distance > 0.0) {
        return;
    }

    let target = target_vertex_count(polygon.length(), distance);

    if polygon.len() == target {
        space_evenly(polygon);
        return;
    }

    let points = polygon.points_mut();

    while points.len() > target {
        let middle = points.len() / 2;
        points.remove(middle);
        space_evenly_points(points);
    }

    while points.len() < target {
        if let Some(last) = points.last().copied() {
            points.push(last);
        }
        space_evenly_points(points);
    }
}

/// Moves the interior vertices so that they are equally spaced along the polyline,
/// keeping the vertex count and both end points.
pub fn space_evenly(polygon: &mut Polygon) {
    space_evenly_points(polygon.points_mut());
}

fn space_evenly_points(points: &mut Vec<Point>) {
    let count = points.len();
    if count < 2 {
        return;
    }

    let segment_lengths: Vec<f32> = points.windows(2).map(|w| (w[1] - w[0]).length()).collect();
    let total_length: f32 = segment_lengths.iter().sum();
    let spacing = total_length / (count - 1) as f32;

    let first = points[0];
    let last = points[count - 1];

    let mut output = Vec::with_capacity(count);
    output.push(first);

    let mut accumulated = 0.0;
    let mut segment = 0;
    for i in 1..count - 1 {
        let target_distance = i as f32 * spacing;

        while segment < segment_lengths.len()
            && accumulated + segment_lengths[segment] < target_distance
        {
            accumulated += segment_lengths[segment];
            segment += 1;
        }

        if segment < segment_lengths.len() {
            let length = segment_lengths[segment];
            let t = if length == 0.0 {
                0.0
            } else {
                (target_distance - accumulated) / length
            };
            output.push(points[segment].lerp(points[segment + 1], t));
        } else {
            // Rounding pushed the target past the end.
            output.push(last);
        }
    }

    output.push(last);

    *points = output;
}

#[cfg(test)]
fn assert_evenly_spaced(polygon: &Polygon, tolerance: f32) {
    let lengths = polygon.segment_lengths();
    let expected = polygon.length() / lengths.len() as f32;
    for l in &lengths {
        assert!(
            (l - expected).abs() <= tolerance,
            "segment length {} expected {}",
            l,
            expected
        );
    }
}

#[test]
fn vertex_count_matches_length() {
    let distance = 5.0;
    let polygons = [
        vec![point(0.0, 0.0), point(100.0, 0.0)],
        vec![point(0.0, 0.0), point(30.0, 40.0), point(30.0, 140.0)],
        // Very dense input.
        (0..400).map(|i| point(i as f32 * 0.25, 0.0)).collect(),
        // Zig-zag.
        (0..20)
            .map(|i| point(i as f32 * 10.0, if i % 2 == 0 { 0.0 } else { 10.0 }))
            .collect(),
    ];

    for points in polygons.iter() {
        let mut polygon = Polygon::from(points.clone());
        let expected = (polygon.length() / distance).round() as i64;
        resample(&mut polygon, distance);

        let count = polygon.len() as i64;
        assert!(
            (count - expected).abs() <= 1,
            "{} vertices, expected {}",
            count,
            expected
        );
        assert_eq!(polygon.first(), Some(points[0]));
        assert_eq!(polygon.last(), points.last().copied());
    }
}

#[test]
fn straight_line_is_evenly_spaced() {
    let mut polygon = Polygon::from(vec![point(0.0, 0.0), point(3.0, 0.0), point(100.0, 0.0)]);
    resample(&mut polygon, 5.0);

    assert_eq!(polygon.len(), 20);
    assert_evenly_spaced(&polygon, 1e-3);
}

#[test]
fn resampling_is_idempotent() {
    let mut polygon: Polygon = (0..50)
        .map(|i| {
            let a = i as f32 * 0.05;
            point(200.0 + 80.0 * a.cos(), 200.0 + 80.0 * a.sin())
        })
        .collect();

    resample(&mut polygon, 5.0);
    let once = polygon.clone();
    resample(&mut polygon, 5.0);

    let diff = polygon.len() as i64 - once.len() as i64;
    assert!(diff.abs() <= 1);

    if polygon.len() == once.len() {
        for (a, b) in polygon.iter().zip(once.iter()) {
            assert!((*a - *b).length() < 0.5, "{:?} moved to {:?}", b, a);
        }
    }
}

#[test]
fn short_polygons() {
    let mut single = Polygon::from(vec![point(1.0, 1.0)]);
    resample(&mut single, 5.0);
    assert_eq!(single.points(), &[point(1.0, 1.0)]);

    // About twice the distance.
    let mut short = Polygon::from(vec![point(0.0, 0.0), point(1.0, 0.0), point(9.0, 0.0)]);
    resample(&mut short, 5.0);
    assert_eq!(short.points(), &[point(0.0, 0.0), point(9.0, 0.0)]);

    // Shorter than half the distance: round(length / distance) is zero, the polygon keeps
    // its first vertex only.
    let mut tiny = Polygon::from(vec![point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)]);
    resample(&mut tiny, 5.0);
    assert_eq!(tiny.points(), &[point(0.0, 0.0)]);

    // A tap is a polygon without length.
    let mut tap = Polygon::from(vec![point(3.0, 3.0); 6]);
    resample(&mut tap, 5.0);
    assert_eq!(tap.points(), &[point(3.0, 3.0)]);
}

#[test]
fn short_segments_count() {
    for &length in &[0.0, 1.0, 2.0, 2.4, 2.6, 4.0, 7.4, 7.6] {
        let mut polygon = Polygon::from(vec![point(0.0, 0.0), point(length, 0.0)]);
        resample(&mut polygon, 5.0);

        let expected = (length / 5.0).round() as i64;
        let count = polygon.len() as i64;
        assert!(
            (count - expected).abs() <= 1,
            "length {}: {} vertices, expected {}",
            length,
            count,
            expected
        );
        assert!(!polygon.is_empty());
        assert_eq!(polygon.first(), Some(point(0.0, 0.0)));
    }
}

#[test]
fn growing_with_duplicates() {
    let mut polygon = Polygon::from(vec![point(0.0, 0.0), point(0.0, 50.0)]);
    resample(&mut polygon, 5.0);

    assert_eq!(polygon.len(), 10);
    assert_evenly_spaced(&polygon, 1e-3);
}

#[test]
fn resampler_converts_each_polygon() {
    let mut polygons = vec![
        Polygon::from(vec![point(0.0, 0.0), point(50.0, 0.0)]),
        Polygon::from(vec![point(0.0, 0.0), point(0.0, 100.0)]),
    ];

    FixedDistanceResampler::new(10.0).convert(&mut polygons);

    assert_eq!(polygons[0].len(), 5);
    assert_eq!(polygons[1].len(), 10);
}

#[test]
fn invalid_distance() {
    let points = vec![point(0.0, 0.0), point(50.0, 0.0)];
    let mut polygon = Polygon::from(points.clone());
    resample(&mut polygon, 0.0);
    resample(&mut polygon, -1.0);
    resample(&mut polygon, f32::NAN);
    assert_eq!(polygon.points(), &points[..]);
}
