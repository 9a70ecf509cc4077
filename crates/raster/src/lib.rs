#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Raster surfaces and stroke renderers.
//!
//! This crate is reexported in [kanji_trace](https://docs.rs/kanji_trace/).
//!
//! The [`Surface`] trait captures the handful of 2D primitives the tracing engine needs:
//! clearing, filled circles, stroked polylines and curves, pixel readback and blitting.
//! [`Canvas`] implements it in software on top of an `image::RgbaImage`, tessellating shapes
//! with `lyon_tessellation` and rasterizing the triangles without anti-aliasing.
//!
//! The [renderers](renderers) draw stroke polygons on any surface.
//!
//! # Examples
//!
//! ```
//! use kanji_trace_raster::{Canvas, Surface};
//! use kanji_trace_raster::renderers::{PolygonRenderer, SmoothRenderer};
//! use kanji_trace_raster::geom::{Color, Polygon};
//! use kanji_trace_raster::geom::math::point;
//!
//! let mut canvas = Canvas::new(100, 100);
//! canvas.clear(Some(Color::WHITE));
//!
//! let stroke = Polygon::from(vec![point(10.0, 10.0), point(50.0, 50.0), point(90.0, 10.0)]);
//! let mut renderer = SmoothRenderer::new(8.0, Color::BLACK);
//! let colored = renderer.draw_polygon(&mut canvas, &stroke).unwrap();
//!
//! assert_eq!(colored.len(), 3);
//! assert_eq!(canvas.pixel(10, 10), Some([0, 0, 0, 255]));
//! ```

pub use kanji_trace_geom as geom;
pub use lyon_tessellation;
pub use lyon_tessellation::path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod canvas;
pub mod rasterizer;
pub mod renderers;
mod surface;

#[doc(inline)]
pub use crate::canvas::Canvas;
#[doc(inline)]
pub use crate::surface::{with_preserved_style, CompositeMode, Surface, SurfaceStyle};

pub use lyon_tessellation::LineCap;
