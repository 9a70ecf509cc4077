#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]

//! Geometric primitives for handwriting tracing on top of euclid.
//!
//! This crate is reexported in [kanji_trace](https://docs.rs/kanji_trace/).
//!
//! # Overview.
//!
//! A character is drawn as a sequence of strokes. Each stroke, whether it comes from a
//! reference outline or from the user's pointer, is represented as a [`Polygon`]: an ordered
//! sequence of points going from the start of the stroke to its end. The order of the points
//! is meaningful (it encodes the drawing direction) and none of the routines in the
//! kanji_trace crates reorder or reverse it.
//!
//! Renderers pair the points of a polygon with the color they used at each vertex, producing
//! a [`ColoredPolygon`]. The verification engine relies on this to encode "position along the
//! stroke" as a hue (see [`Color::hsb`] and [`Color::hue`]).

// Reexport dependencies.
pub use lyon_geom;
pub use lyon_geom::euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod color;
mod polygon;
pub mod utils;

#[doc(inline)]
pub use crate::color::Color;
#[doc(inline)]
pub use crate::polygon::{bounding_box, ColoredPolygon, Polygon};

pub use lyon_geom::{CubicBezierSegment, LineSegment};

pub mod math {
    //! f32 versions of the euclid types used everywhere in the kanji_trace crates.

    /// Alias for `euclid::default::Point2D<f32>`.
    pub type Point = lyon_geom::Point<f32>;

    /// Alias for `euclid::default::Vector2D<f32>`.
    pub type Vector = lyon_geom::Vector<f32>;

    /// Alias for `euclid::default::Box2D<f32>`.
    pub type Box2D = lyon_geom::euclid::default::Box2D<f32>;

    /// Alias for `euclid::default::Size2D<f32>`.
    pub type Size = lyon_geom::Size<f32>;

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }
}
