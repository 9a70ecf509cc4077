//! Fit polygons into the drawing field.

use crate::geom::bounding_box;
use crate::math::*;
use crate::{Polygon, PolygonConverter};

/// Multiplies every coordinate by a constant factor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scaler {
    pub factor: f32,
}

impl Scaler {
    pub fn new(factor: f32) -> Self {
        Scaler { factor }
    }
}

impl PolygonConverter for Scaler {
    fn convert(&self, polygons: &mut [Polygon]) {
        for polygon in polygons {
            for vertex in polygon.points_mut() {
                *vertex = *vertex * self.factor;
            }
        }
    }
}

/// Computes the translation that centers `bounds` in a field of the given size.
pub fn centering_offset(bounds: &Box2D, field: Size) -> Vector {
    let empty_space = vector(
        field.width - bounds.width(),
        field.height - bounds.height(),
    );

    empty_space / 2.0 - bounds.min.to_vector()
}

/// Translates all polygons together so that their joint bounding box is centered in the field.
///
/// The relative placement of the polygons is preserved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Centerer {
    pub field: Size,
}

impl Centerer {
    pub fn new(field_width: f32, field_height: f32) -> Self {
        Centerer {
            field: Size::new(field_width, field_height),
        }
    }
}

impl PolygonConverter for Centerer {
    fn convert(&self, polygons: &mut [Polygon]) {
        let bounds = match bounding_box(polygons.iter()) {
            Some(bounds) => bounds,
            None => {
                return;
            }
        };

        let offset = centering_offset(&bounds, self.field);
        for polygon in polygons {
            for vertex in polygon.points_mut() {
                *vertex += offset;
            }
        }
    }
}

#[test]
fn scale() {
    let mut polygons = vec![
        Polygon::from(vec![point(1.0, 2.0), point(-3.0, 0.5)]),
        Polygon::new(),
    ];

    Scaler::new(4.0).convert(&mut polygons);

    assert_eq!(polygons[0].points(), &[point(4.0, 8.0), point(-12.0, 2.0)]);
    assert!(polygons[1].is_empty());
}

#[test]
fn center_jointly() {
    let mut polygons = vec![
        Polygon::from(vec![point(0.0, 0.0), point(100.0, 0.0)]),
        Polygon::from(vec![point(50.0, -20.0), point(50.0, 80.0)]),
    ];

    Centerer::new(500.0, 500.0).convert(&mut polygons);

    // The joint box is 100x100, centered it spans [200, 300] on both axes.
    assert_eq!(polygons[0].points(), &[point(200.0, 220.0), point(300.0, 220.0)]);
    assert_eq!(polygons[1].points(), &[point(250.0, 200.0), point(250.0, 300.0)]);

    let bounds = bounding_box(polygons.iter()).unwrap();
    assert_eq!(bounds.min, point(200.0, 200.0));
    assert_eq!(bounds.max, point(300.0, 300.0));
}

#[test]
fn center_nothing() {
    let mut polygons: Vec<Polygon> = vec![Polygon::new()];
    Centerer::new(500.0, 500.0).convert(&mut polygons);
    assert!(polygons[0].is_empty());

    Centerer::new(500.0, 500.0).convert(&mut []);
}
