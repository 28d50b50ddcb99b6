//! Imaging error types.

use std::path::PathBuf;

use insdraw_protocol::Canvas;

/// Errors produced by the imaging crate.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("cannot identify image file '{}': {reason}", .path.display())]
    ImageLoad { path: PathBuf, reason: String },

    #[error("canvas has no drawable area: {0}")]
    EmptyCanvas(Canvas),
}
