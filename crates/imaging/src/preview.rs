//! Raster previews of masks and primitive lists.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use insdraw_protocol::{Canvas, Primitive};

use crate::normalize::LineMask;

/// Dark slate background shared by all previews.
pub const BACKGROUND: Rgb<u8> = Rgb([24, 24, 28]);

pub const STROKE: Rgb<u8> = Rgb([255, 255, 255]);

/// Renders the mask's strokes in white over the preview background.
pub fn render_preview(mask: &LineMask) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.is_foreground(x, y) { STROKE } else { BACKGROUND }
    })
}

/// Renders what the device would draw for `primitives`: swipes as line
/// segments, taps as dots.
pub fn render_plan(canvas: Canvas, primitives: &[Primitive]) -> RgbImage {
    let mut img = RgbImage::from_pixel(canvas.width, canvas.height, BACKGROUND);
    for p in primitives {
        match *p {
            Primitive::Tap { x, y } => draw_filled_circle_mut(&mut img, (x, y), 1, STROKE),
            Primitive::Swipe { x1, y1, x2, y2, .. } => draw_line_segment_mut(
                &mut img,
                (x1 as f32, y1 as f32),
                (x2 as f32, y2 as f32),
                STROKE,
            ),
        }
    }
    img
}
