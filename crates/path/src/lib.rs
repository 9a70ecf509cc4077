#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]

//! Compiles stroke outline path data into polygons.
//!
//! This crate is reexported in [kanji_trace](https://docs.rs/kanji_trace/).
//!
//! Stroke outlines come as SVG-like path data strings, one or more per stroke. The
//! [`PathCompiler`] turns a string into one [`Polygon`](geom::Polygon) per subpath,
//! flattening cubic curves adaptively. [`compile_strokes`] compiles all the strokes of a
//! character at once: a stroke that fails to parse is dropped and reported, the others
//! still compile.
//!
//! # Examples
//!
//! ```
//! use kanji_trace_path::{compile_strokes, CompilerOptions};
//!
//! let strokes = ["M 10 10 L 90 10", "M 50 0 C 50 30 60 60 50 100", "M 0 0 Q 1 1 2 2"];
//! let compiled = compile_strokes(&CompilerOptions::DEFAULT, &strokes);
//!
//! assert_eq!(compiled.polygons.len(), 2);
//! assert_eq!(compiled.errors.len(), 1);
//! assert_eq!(compiled.errors[0].stroke, 2);
//! ```

pub use kanji_trace_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod flatten;
mod parser;

pub use crate::flatten::flatten_cubic;
#[doc(inline)]
pub use crate::parser::{ParseError, PathCompiler, Source};

use crate::geom::Polygon;

/// Parameters of the path compiler.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct CompilerOptions {
    /// Flatness criterion of the curve subdivision, relative to the length of the chord.
    ///
    /// Default value: `CompilerOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,

    /// Number of decimals emitted coordinates are rounded to, if any.
    ///
    /// Default value: `Some(5)`.
    pub decimals: Option<u32>,
}

impl CompilerOptions {
    pub const DEFAULT_TOLERANCE: f32 = 0.001;

    pub const DEFAULT: Self = CompilerOptions {
        tolerance: Self::DEFAULT_TOLERANCE,
        decimals: Some(5),
    };

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_decimals(mut self, decimals: Option<u32>) -> Self {
        self.decimals = decimals;
        self
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A stroke that could not be compiled.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeError {
    /// Index of the stroke in the input.
    pub stroke: usize,
    pub error: ParseError,
}

/// The polygons of the strokes that compiled, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledStrokes {
    pub polygons: Vec<Polygon>,
    pub errors: Vec<StrokeError>,
}

/// Compiles each stroke independently.
///
/// A stroke producing several subpaths contributes several polygons.
pub fn compile_strokes<S: AsRef<str>>(options: &CompilerOptions, strokes: &[S]) -> CompiledStrokes {
    let mut compiler = PathCompiler::new();
    let mut output = CompiledStrokes::default();

    for (idx, stroke) in strokes.iter().enumerate() {
        match compiler.compile(options, stroke.as_ref()) {
            Ok(polygons) => {
                output.polygons.extend(polygons);
            }
            Err(error) => {
                log::warn!("Dropping stroke {}: {}", idx, error);
                output.errors.push(StrokeError { stroke: idx, error });
            }
        }
    }

    output
}

#[cfg(test)]
use crate::geom::math::point;

#[test]
fn compile_several_strokes() {
    let strokes = vec![
        String::from("M 0 0 L 10 0"),
        String::from("M 0 0 L 0 10 M 5 5 L 6 6"),
        String::from("M 0 0 T 2 2"),
        String::from("M 1 1 h 1"),
    ];

    let compiled = compile_strokes(&CompilerOptions::default(), &strokes);
    assert_eq!(compiled.polygons.len(), 4);
    assert_eq!(
        compiled.polygons[3].points(),
        &[point(1.0, 1.0), point(2.0, 1.0)]
    );
    assert_eq!(compiled.errors.len(), 1);
    assert_eq!(compiled.errors[0].stroke, 2);
    assert!(matches!(
        compiled.errors[0].error,
        ParseError::UnsupportedCommand { command: 'T', .. }
    ));
}

#[test]
fn all_strokes_failing() {
    let compiled = compile_strokes(&CompilerOptions::DEFAULT, &["M 0 0 A 1 1 0 0 1 2 2", "Z"]);
    assert!(compiled.polygons.is_empty());
    assert_eq!(compiled.errors.len(), 2);
}
