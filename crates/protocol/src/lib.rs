//! Shared types for the InsDraw pipeline and delivery engine.
//!
//! Geometry flows left to right through the pipeline:
//! [`Contour`] (traced boundary) → [`Polyline`] (sampled path) →
//! [`Primitive`] (touch command). Primitives render to the text
//! understood by Android's `input` command.

pub mod command;
pub mod constants;
pub mod types;

// Re-export primary types for convenience.
pub use command::{ParseCommandError, join_batch, shell_line};
pub use types::{Canvas, Contour, Point, Polyline, Primitive};
