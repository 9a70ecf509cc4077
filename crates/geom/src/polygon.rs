//! Stroke polygons.

use crate::math::{Box2D, Point};
use crate::utils::{closest_point_index, distance, polyline_length};
use crate::Color;

use std::ops::Index;

/// The trace of one stroke: an ordered, open sequence of points.
///
/// The first point is where the stroke starts and the last point is where it ends.
///
/// ## Example
///
/// ```
/// use kanji_trace_geom::Polygon;
/// use kanji_trace_geom::math::point;
///
/// let stroke = Polygon::from(vec![
///     point(0.0, 0.0),
///     point(3.0, 4.0),
///     point(3.0, 10.0),
/// ]);
///
/// assert_eq!(stroke.len(), 3);
/// assert_eq!(stroke.length(), 11.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new() -> Self {
        Polygon { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Polygon {
            points: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Mutable access to the points, for in-place conversions.
    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    #[inline]
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Arc length of the polyline.
    pub fn length(&self) -> f32 {
        polyline_length(&self.points)
    }

    /// Length of each segment, `len() - 1` values.
    pub fn segment_lengths(&self) -> Vec<f32> {
        self.points
            .windows(2)
            .map(|w| distance(w[0], w[1]))
            .collect()
    }

    /// Index of the vertex closest to `point`.
    pub fn closest_vertex(&self, point: Point) -> Option<usize> {
        closest_point_index(point, &self.points)
    }

    /// Smallest axis-aligned box containing all vertices.
    pub fn bounding_box(&self) -> Option<Box2D> {
        bounding_box(std::iter::once(self))
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Polygon { points }
    }
}

impl Index<usize> for Polygon {
    type Output = Point;
    fn index(&self, idx: usize) -> &Point {
        &self.points[idx]
    }
}

impl<'l> IntoIterator for &'l Polygon {
    type Item = &'l Point;
    type IntoIter = std::slice::Iter<'l, Point>;
    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Polygon {
            points: iter.into_iter().collect(),
        }
    }
}

/// Computes one bounding box around the vertices of several polygons.
///
/// Returns `None` if there is no vertex at all.
pub fn bounding_box<'l, Iter>(polygons: Iter) -> Option<Box2D>
where
    Iter: IntoIterator<Item = &'l Polygon>,
{
    let mut points = polygons.into_iter().flat_map(|p| p.points.iter());
    let first = *points.next()?;
    let mut min = first;
    let mut max = first;
    for p in points {
        min = min.min(*p);
        max = max.max(*p);
    }

    Some(Box2D { min, max })
}

/// A polygon and the color used for each of its vertices.
///
/// The two sequences always have the same length.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ColoredPolygon {
    polygon: Polygon,
    colors: Vec<Color>,
}

impl ColoredPolygon {
    /// Panics if the number of colors differs from the number of vertices.
    pub fn new(polygon: Polygon, colors: Vec<Color>) -> Self {
        assert_eq!(
            polygon.len(),
            colors.len(),
            "a colored polygon needs exactly one color per vertex"
        );

        ColoredPolygon { polygon, colors }
    }

    /// Uses the same color for every vertex.
    pub fn uniform(polygon: Polygon, color: Color) -> Self {
        let colors = vec![color; polygon.len()];
        ColoredPolygon { polygon, colors }
    }

    #[inline]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color of the vertex closest to `point`.
    pub fn color_near(&self, point: Point) -> Option<Color> {
        self.polygon
            .closest_vertex(point)
            .map(|idx| self.colors[idx])
    }

    pub fn into_parts(self) -> (Polygon, Vec<Color>) {
        (self.polygon, self.colors)
    }
}

#[cfg(test)]
use crate::math::point;

#[test]
fn joint_bounding_box() {
    let a = Polygon::from(vec![point(1.0, 2.0), point(4.0, 3.0)]);
    let b = Polygon::from(vec![point(-1.0, 5.0)]);
    let empty = Polygon::new();

    let bb = bounding_box([&a, &b, &empty]).unwrap();
    assert_eq!(bb.min, point(-1.0, 2.0));
    assert_eq!(bb.max, point(4.0, 5.0));

    assert!(bounding_box([&empty]).is_none());
    assert!(empty.bounding_box().is_none());
}

#[test]
fn colored_polygon_lookup() {
    let polygon = Polygon::from(vec![point(0.0, 0.0), point(10.0, 0.0)]);
    let colored = ColoredPolygon::new(polygon, vec![Color::BLACK, Color::WHITE]);

    assert_eq!(colored.color_near(point(9.0, 1.0)), Some(Color::WHITE));
    assert_eq!(colored.color_near(point(0.0, 0.0)), Some(Color::BLACK));
}

#[test]
#[should_panic]
fn colored_polygon_length_mismatch() {
    let polygon = Polygon::from(vec![point(0.0, 0.0), point(10.0, 0.0)]);
    ColoredPolygon::new(polygon, vec![Color::BLACK]);
}
