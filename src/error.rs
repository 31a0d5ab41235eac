//! Error types for scanfill.
//!
//! The rasterization pipeline has exactly one fallible condition: the cell
//! stash saturating its 32-bit index space during a single fill. Everything
//! else is either a silent drop (geometry outside the viewport) or a
//! programmer error surfaced as a panic.

use thiserror::Error;

/// Result type alias for scanfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the rasterization pipeline.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The cell stash ran out of 32-bit indices during a fill.
    ///
    /// Accumulated coverage state is incomplete and cannot be repaired;
    /// the renderer that produced this error should be discarded.
    #[error("too many cells accumulated in a single fill")]
    TooManyCells,
}
