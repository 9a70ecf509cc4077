use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The path data of a character could not be obtained from its source.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResourceFetchError {
    #[error("No stroke data for {character:?} at {location}.")]
    NotFound { character: char, location: String },
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No path data in the outline of {character:?}.")]
    NoPathData { character: char },
}

/// Failure of a character load started with
/// [`begin_loading`](crate::StrokeController::begin_loading).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] ResourceFetchError),
    /// No character was selected with [`change_target`](crate::StrokeController::change_target).
    #[error("No target character.")]
    NoTarget,
    /// Another load was started, or the target changed, after this one began.
    #[error("The load was superseded by a more recent request.")]
    Superseded,
}

#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TraceError {
    #[error("No stroke is awaited.")]
    NotAwaitingStroke,
    /// The stroke was drawn for a character that is not traced anymore.
    #[error("The stroke belongs to a previous trace session.")]
    StaleSession,
}
