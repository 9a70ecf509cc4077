#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Stroke verification and tracing progression.
//!
//! This crate is reexported in [kanji_trace](https://docs.rs/kanji_trace/).
//!
//! # Overview
//!
//! - A [`VectorSource`] provides the path data of a character, one string per stroke.
//!   [`DirectorySource`] reads SVG outlines from a directory and [`MemorySource`] keeps them
//!   in memory.
//! - The [`CharacterLoader`] fetches, compiles and normalizes the strokes of a character.
//! - The [`StrokeController`] walks the user through the strokes and notifies its
//!   [`TraceListener`]s of what to show.
//! - Each stroke the user draws is submitted to the controller, which scores it with its
//!   [`VerificationEngine`].
//! - A [`PointerTracker`] turns raw pointer events into strokes, tagged with the
//!   [`TraceSession`] they were drawn in.
//!
//! Loading is asynchronous and executor-agnostic. Everything else is synchronous and meant
//! to run on the thread handling user input.
//!
//! # Examples
//!
//! Hosts that fetch the path data themselves split the load in two:
//!
//! ```
//! use kanji_trace_session::*;
//! use kanji_trace_session::algorithms::Normalizer;
//! use kanji_trace_session::path::CompilerOptions;
//!
//! let loader = CharacterLoader::new(
//!     MemorySource::new(),
//!     CompilerOptions::DEFAULT,
//!     Normalizer::default(),
//! );
//! let mut controller = StrokeController::new(TraceOptions::DEFAULT);
//!
//! controller.change_target('二');
//! let first = controller.begin_loading(TraceMode::NextHint).unwrap();
//! let second = controller.begin_loading(TraceMode::NextHint).unwrap();
//!
//! let strokes = ["M 30 30 L 70 30", "M 15 70 L 85 70"];
//! let character = loader.compile(second.character(), &strokes);
//!
//! // Only the most recent load is committed.
//! assert!(matches!(
//!     controller.finish_loading(first, Ok(character.clone())),
//!     Err(LoadError::Superseded)
//! ));
//! assert!(controller.finish_loading(second, Ok(character)).is_ok());
//! assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 0 });
//! ```

pub use kanji_trace_algorithms as algorithms;
pub use kanji_trace_geom as geom;
pub use kanji_trace_path as path;
pub use kanji_trace_raster as raster;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod controller;
mod error;
pub mod input;
mod loader;
mod options;
mod source;
pub mod verify;

#[doc(inline)]
pub use crate::controller::{
    hint_arrow, ListenerHandle, LoadTicket, StrokeController, TraceListener, TraceMode,
    TraceSession, TraceState,
};
#[doc(inline)]
pub use crate::error::{LoadError, ResourceFetchError, TraceError};
#[doc(inline)]
pub use crate::input::{InputAction, PointerButton, PointerEvent, PointerTracker};
#[doc(inline)]
pub use crate::loader::{CharacterLoader, CompiledCharacter};
#[doc(inline)]
pub use crate::options::{TraceOptions, VerificationOptions};
#[doc(inline)]
pub use crate::source::{
    extract_path_data, resource_file_name, DirectorySource, DirectorySourceOptions,
    MemorySource, VectorSource,
};
#[doc(inline)]
pub use crate::verify::{Invalidator, Similarities, VerificationEngine, VerifyResult};
