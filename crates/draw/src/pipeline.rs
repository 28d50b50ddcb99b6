//! Synchronous image → primitives pipeline.
//!
//! Everything here is CPU-bound with no suspension points; the
//! orchestrator runs it on a blocking worker.

use std::path::Path;

use insdraw_gesture::GesturePlan;
use insdraw_imaging::{Capabilities, LineMask, Normalizer, extract_contours};
use insdraw_protocol::Canvas;
use tracing::info;

use crate::error::DrawError;
use crate::settings::DrawSettings;

/// Loads `path` and reduces it to a line mask sized to `canvas`.
pub fn line_mask(path: &Path, canvas: Canvas, settings: &DrawSettings) -> Result<LineMask, DrawError> {
    let normalizer = Normalizer::new(settings.mask_options(), Capabilities::detect());
    Ok(normalizer.load(path, canvas)?)
}

/// Traces, samples and compiles a mask into a plan.
///
/// # Errors
///
/// [`DrawError::NoDrawableContent`] if no contour survives the area filter
/// or the contours compile to zero primitives.
pub fn plan_mask(mask: &LineMask, settings: &DrawSettings) -> Result<GesturePlan, DrawError> {
    let contours = extract_contours(mask, settings.min_area);
    if contours.is_empty() {
        return Err(DrawError::NoDrawableContent);
    }

    let plan = GesturePlan::build(&contours, &settings.gesture_options());
    if plan.is_empty() {
        return Err(DrawError::NoDrawableContent);
    }

    info!(
        contours = plan.contours,
        primitives = plan.len(),
        taps = plan.taps,
        swipes = plan.swipes,
        "drawing planned"
    );
    Ok(plan)
}

/// Full pipeline from image file to plan.
pub fn plan_image(path: &Path, canvas: Canvas, settings: &DrawSettings) -> Result<GesturePlan, DrawError> {
    let mask = line_mask(path, canvas, settings)?;
    plan_mask(&mask, settings)
}
