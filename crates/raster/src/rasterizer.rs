//! A software triangle rasterizer producing coverage masks.
//!
//! Pixels are sampled at their center and there is no anti-aliasing: a pixel is either
//! covered or not. Meshes are accumulated into a [`CoverageMask`] first so that a shape made
//! of overlapping triangles is composited once per pixel.

use crate::geom::math::Point;

/// The set of pixels covered by the triangles rasterized so far.
#[derive(Clone, Debug)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    covered: Vec<bool>,
    // Inclusive-exclusive pixel bounds of the covered area.
    bounds: Option<(u32, u32, u32, u32)>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        CoverageMask {
            width,
            height,
            covered: vec![false; width as usize * height as usize],
            bounds: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.covered[self.offset(x, y)]
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Calls `callback` for every covered pixel, row by row.
    pub fn for_each_covered<F: FnMut(u32, u32)>(&self, mut callback: F) {
        let (min_x, min_y, max_x, max_y) = match self.bounds {
            Some(bounds) => bounds,
            None => {
                return;
            }
        };

        for y in min_y..max_y {
            for x in min_x..max_x {
                if self.covered[self.offset(x, y)] {
                    callback(x, y);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        if let Some((min_x, min_y, max_x, max_y)) = self.bounds.take() {
            for y in min_y..max_y {
                let row = self.offset(0, y);
                self.covered[row + min_x as usize..row + max_x as usize].fill(false);
            }
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn cover(&mut self, x: u32, y: u32) {
        let offset = self.offset(x, y);
        self.covered[offset] = true;
        self.bounds = Some(match self.bounds {
            Some((min_x, min_y, max_x, max_y)) => (
                min_x.min(x),
                min_y.min(y),
                max_x.max(x + 1),
                max_y.max(y + 1),
            ),
            None => (x, y, x + 1, y + 1),
        });
    }
}

/// Rasterizes indexed triangles into the mask.
///
/// The triangles are defined by sequences of 3 indices in the input buffers.
/// For example, the first triangle is:
/// { vertices[indices[0]], vertices[indices[1]], vertices[indices[2]] }
/// Triangles of either winding are accepted, degenerate ones cover nothing.
pub fn rasterize_triangles(vertices: &[Point], indices: &[u32], mask: &mut CoverageMask) {
    // Edge functions evaluated at pixel centers, stepped incrementally along rows as in
    // https://fgiesen.wordpress.com/2013/02/08/triangle-rasterization-in-practice/
    for triangle in indices.chunks_exact(3) {
        let v0 = vertices[triangle[0] as usize];
        let v1 = vertices[triangle[1] as usize];
        let v2 = vertices[triangle[2] as usize];

        let area = (v1 - v0).cross(v2 - v0);
        if area == 0.0 || !area.is_finite() {
            continue;
        }
        let sign = area.signum();

        let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0);
        let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0);
        let max_x = v0.x.max(v1.x).max(v2.x).ceil().min(mask.width as f32);
        let max_y = v0.y.max(v1.y).max(v2.y).ceil().min(mask.height as f32);
        if min_x >= max_x || min_y >= max_y {
            continue;
        }

        let origin = Point::new(min_x + 0.5, min_y + 0.5);
        let e12 = Edge::new(v1, v2, origin, sign);
        let e20 = Edge::new(v2, v0, origin, sign);
        let e01 = Edge::new(v0, v1, origin, sign);

        let mut w0_row = e12.row;
        let mut w1_row = e20.row;
        let mut w2_row = e01.row;

        for y in min_y as u32..max_y as u32 {
            let mut w0 = w0_row;
            let mut w1 = w1_row;
            let mut w2 = w2_row;

            for x in min_x as u32..max_x as u32 {
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    mask.cover(x, y);
                }

                w0 += e12.step_x;
                w1 += e20.step_x;
                w2 += e01.step_x;
            }

            w0_row += e12.step_y;
            w1_row += e20.step_y;
            w2_row += e01.step_y;
        }
    }
}

struct Edge {
    step_x: f32,
    step_y: f32,
    row: f32,
}

impl Edge {
    fn new(v0: Point, v1: Point, origin: Point, sign: f32) -> Self {
        let a = v0.y - v1.y;
        let b = v1.x - v0.x;
        let c = v0.x * v1.y - v0.y * v1.x;

        Edge {
            step_x: a * sign,
            step_y: b * sign,
            row: (a * origin.x + b * origin.y + c) * sign,
        }
    }
}

#[cfg(test)]
use crate::geom::math::point;

#[test]
fn rasterize_square() {
    // Two triangles forming a square of origin (2, 2) and size (4, 4), with opposite windings.
    let vertices = [
        point(2.0, 2.0),
        point(6.0, 2.0),
        point(6.0, 6.0),
        point(2.0, 6.0),
    ];
    let indices = [0, 1, 2, 0, 3, 2];

    let mut mask = CoverageMask::new(8, 8);
    rasterize_triangles(&vertices, &indices, &mut mask);

    let mut count = 0;
    mask.for_each_covered(|x, y| {
        assert!((2..6).contains(&x) && (2..6).contains(&y));
        count += 1;
    });
    assert_eq!(count, 16);

    mask.clear();
    assert!(mask.is_empty());
    assert!(!mask.is_covered(3, 3));
}

#[test]
fn clip_to_the_mask() {
    let vertices = [point(-10.0, -10.0), point(20.0, -10.0), point(-10.0, 20.0)];
    let mut mask = CoverageMask::new(4, 4);
    rasterize_triangles(&vertices, &[0, 1, 2], &mut mask);

    // The hypotenuse goes through (5, 5), well outside of the mask.
    let mut count = 0;
    mask.for_each_covered(|_, _| count += 1);
    assert_eq!(count, 16);
}

#[test]
fn degenerate_triangle() {
    let vertices = [point(1.0, 1.0), point(3.0, 3.0), point(5.0, 5.0)];
    let mut mask = CoverageMask::new(8, 8);
    rasterize_triangles(&vertices, &[0, 1, 2], &mut mask);
    assert!(mask.is_empty());
}
