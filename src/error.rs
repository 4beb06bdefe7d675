//! Error types shared by every turtle and screen operation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TurtleError>;

/// Errors surfaced synchronously to the caller.
///
/// Commands issued after a turtle has been stopped are not errors: their
/// actions are discarded because nothing is consuming them anymore.
#[derive(Debug, Error)]
pub enum TurtleError {
    /// A stretch factor of exactly zero would collapse the turtle shape.
    #[error("stretch factors must be non-zero")]
    ZeroStretch,

    /// The color codec did not recognize the given string.
    #[error("unrecognized color {0:?}")]
    InvalidColor(String),

    /// The resource path has an extension no media kind claims.
    #[error("unsupported media extension {ext:?} for {path}")]
    UnsupportedExtension { path: PathBuf, ext: String },

    /// The resource could not be read from disk.
    #[error("resource {path} is unavailable")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `play` was asked to play something that is not a sound.
    #[error("{0} is not an audio resource")]
    NotAudio(String),

    /// A background worker thread could not be started.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] io::Error),

    /// A configuration document failed to parse.
    #[error("invalid configuration")]
    Config(#[from] serde_json::Error),

    /// A command script contained a malformed statement.
    #[error("script error on line {line}: {message}")]
    Script { line: usize, message: String },
}
