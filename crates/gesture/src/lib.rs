//! Vector side of the InsDraw pipeline.
//!
//! Contours are thinned out by [`sample`] into sparse polylines, which
//! [`compile`] turns into ordered tap/swipe primitives. [`GesturePlan`]
//! runs both over every contour of a drawing.

pub mod compiler;
pub mod plan;
pub mod sampler;

pub use compiler::compile;
pub use plan::{GestureOptions, GesturePlan};
pub use sampler::sample;
