//! Raster side of the InsDraw pipeline.
//!
//! 1. **Normalize**: letterbox the source into the device canvas and
//!    reduce it to a binary [`LineMask`] (edges or threshold, optionally
//!    thinned).
//! 2. **Trace**: extract boundary [`Contour`](insdraw_protocol::Contour)s
//!    from the mask, longest first.
//!
//! [`preview`] renders masks and primitive lists back to images for
//! inspection.

mod capabilities;
pub mod contour;
mod error;
pub mod normalize;
pub mod preview;
#[cfg(feature = "thinning")]
mod thinning;

pub use capabilities::Capabilities;
pub use contour::extract_contours;
pub use error::ImagingError;
pub use normalize::{LineMask, MaskOptions, Normalizer, build_mask, load_image};
pub use preview::{render_plan, render_preview};
