#![deny(bare_trait_objects)]

//! Stroke geometry and verification for handwriting practice.
//!
//! This crate reexports the kanji_trace sub-crates:
//!
//! - [geom](kanji_trace_geom): points, stroke polygons and colors.
//! - [path](kanji_trace_path): compiles stroke outline path data into polygons.
//! - [algorithms](kanji_trace_algorithms): scaling, centering and fixed-distance resampling.
//! - [raster](kanji_trace_raster): raster surfaces and stroke renderers.
//! - [session](kanji_trace_session): vector sources, verification engine and stroke
//!   progression controller.
//!
//! # Overview
//!
//! A character's reference strokes are fetched from a [vector source](session::VectorSource),
//! compiled into polygons and normalized once per character. A
//! [`StrokeController`](session::StrokeController) then walks the user through the strokes one
//! at a time. Each stroke the user draws is submitted to the controller, which asks the
//! [`VerificationEngine`](session::VerificationEngine) to rasterize the reference and the
//! candidate and to score them on image coverage, length and direction.
//!
//! # Example
//!
//! ```
//! use kanji_trace::session::*;
//! use kanji_trace::algorithms::Normalizer;
//! use kanji_trace::path::CompilerOptions;
//!
//! let source = MemorySource::new().with_character('一', &["M 10 50 L 90 50"]);
//! let loader = CharacterLoader::new(source, CompilerOptions::DEFAULT, Normalizer::default());
//!
//! let mut controller = StrokeController::new(TraceOptions::DEFAULT);
//! controller.change_target('一');
//! futures::executor::block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();
//!
//! let reference = controller.current_stroke().unwrap().clone();
//! assert_eq!(controller.submit_stroke(reference), Ok(VerifyResult::Correct));
//! assert_eq!(controller.state(), TraceState::Complete { success: true });
//! ```

pub extern crate kanji_trace_algorithms;
pub extern crate kanji_trace_geom;
pub extern crate kanji_trace_path;
pub extern crate kanji_trace_raster;
pub extern crate kanji_trace_session;

pub use kanji_trace_algorithms as algorithms;
pub use kanji_trace_geom as geom;
pub use kanji_trace_path as path;
pub use kanji_trace_raster as raster;
pub use kanji_trace_session as session;

pub use geom::math;
