#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Stroke polygon transformations.
//!
//! This crate is reexported in [kanji_trace](https://docs.rs/kanji_trace/).
//!
//! Reference strokes are compiled in the design units of their outline and do not have any
//! particular vertex density. Before they can be compared with strokes drawn by the user they
//! go through the [`Normalizer`]: scaled to field pixels, centered in the field and resampled
//! so that consecutive vertices sit at a fixed distance from each other.
//!
//! Each stage is a [`PolygonConverter`] and can be used on its own. The verification engine
//! for example only runs the [`FixedDistanceResampler`](resample::FixedDistanceResampler).

pub use kanji_trace_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod fit;
mod normalize;
pub mod resample;

pub use crate::geom::math;
#[doc(inline)]
pub use crate::normalize::{Normalizer, NormalizerOptions, PolygonSet};

use crate::geom::Polygon;

/// A transformation applied in place to a group of polygons.
///
/// Some transformations depend on all the polygons of the group at once (centering
/// uses their joint bounding box), so converters always receive the whole group.
pub trait PolygonConverter {
    fn convert(&self, polygons: &mut [Polygon]);
}
