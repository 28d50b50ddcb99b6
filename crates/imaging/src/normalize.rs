//! Image normalisation: letterbox into the device canvas, then reduce to a
//! binary line mask.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageReader, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use insdraw_protocol::Canvas;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::capabilities::Capabilities;
use crate::error::ImagingError;

/// Mask value of a drawable stroke pixel.
pub const FOREGROUND: u8 = 255;

/// Mask value of an empty pixel.
pub const BACKGROUND: u8 = 0;

/// Tuning for [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskOptions {
    /// Smoothing radius. 0 disables smoothing; even values are rounded up
    /// to the next odd kernel size.
    pub blur: u32,
    /// Detect edges (Canny) instead of thresholding dark pixels.
    pub use_canny: bool,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Bridge one-pixel gaps in the edge map with a 3x3 closing.
    pub morph_close: bool,
    /// Thin strokes to ~1px when the capability is available.
    pub thin: bool,
    /// Gray level above which a pixel counts as paper in threshold mode.
    pub threshold: u8,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            blur: 3,
            use_canny: true,
            canny_low: 60.0,
            canny_high: 120.0,
            morph_close: true,
            thin: true,
            threshold: 240,
        }
    }
}

impl MaskOptions {
    /// Odd Gaussian kernel size, or `None` when smoothing is disabled.
    pub fn kernel_size(&self) -> Option<u32> {
        (self.blur > 0).then_some(self.blur | 1)
    }
}

/// Binary mask with the exact dimensions of the target canvas.
///
/// Every pixel is either [`FOREGROUND`] or [`BACKGROUND`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineMask {
    image: GrayImage,
}

impl LineMask {
    /// Wraps a grayscale image, mapping every non-zero pixel to
    /// [`FOREGROUND`].
    pub fn from_gray(mut image: GrayImage) -> Self {
        for p in image.pixels_mut() {
            p.0[0] = if p.0[0] > 0 { FOREGROUND } else { BACKGROUND };
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width(), self.height())
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[0] == FOREGROUND)
    }

    /// Number of stroke pixels.
    pub fn foreground_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }

    /// Returns `true` if every pixel is exactly 0 or 255.
    pub fn is_binary(&self) -> bool {
        self.image
            .pixels()
            .all(|p| p.0[0] == FOREGROUND || p.0[0] == BACKGROUND)
    }
}

/// Turns source images into line masks.
#[derive(Debug, Clone)]
pub struct Normalizer {
    options: MaskOptions,
    capabilities: Capabilities,
}

impl Normalizer {
    pub fn new(options: MaskOptions, capabilities: Capabilities) -> Self {
        Self {
            options,
            capabilities,
        }
    }

    pub fn options(&self) -> &MaskOptions {
        &self.options
    }

    /// Decodes `path` and normalises it into `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::ImageLoad`] if no decoder accepts the file,
    /// and [`ImagingError::EmptyCanvas`] under the same precondition as
    /// [`normalize`](Self::normalize).
    pub fn load(&self, path: &Path, canvas: Canvas) -> Result<LineMask, ImagingError> {
        let image = load_image(path)?;
        self.normalize(&image, canvas)
    }

    /// Normalises an already decoded image into `canvas`.
    ///
    /// `canvas` must have a drawable area. Device screen sizes and parsed
    /// `--size` values are never empty, so [`ImagingError::EmptyCanvas`]
    /// only reports a caller bug; once the canvas is accepted no stage
    /// fails.
    pub fn normalize(&self, image: &DynamicImage, canvas: Canvas) -> Result<LineMask, ImagingError> {
        if canvas.is_empty() {
            return Err(ImagingError::EmptyCanvas(canvas));
        }

        let boxed = letterbox(image, canvas);
        let mut gray = imageops::grayscale(&boxed);

        if let Some(k) = self.options.kernel_size() {
            gray = imageproc::filter::gaussian_blur_f32(&gray, kernel_sigma(k));
        }

        let mask = if self.options.use_canny {
            let edges = imageproc::edges::canny(
                &gray,
                self.options.canny_low,
                self.options.canny_high,
            );
            if self.options.morph_close {
                // L1 radius 1 is the 3x3 cross, OpenCV's 3x3 ellipse.
                imageproc::morphology::close(&edges, Norm::L1, 1)
            } else {
                edges
            }
        } else {
            threshold_inverse(&gray, self.options.threshold)
        };

        let mask = self.thin(mask);
        let mask = LineMask::from_gray(mask);

        debug!(
            canvas = %canvas,
            canny = self.options.use_canny,
            foreground = mask.foreground_pixels(),
            "line mask built"
        );
        Ok(mask)
    }

    fn thin(&self, mask: GrayImage) -> GrayImage {
        if !self.options.thin {
            return mask;
        }
        #[cfg(feature = "thinning")]
        if self.capabilities.thinning() {
            return crate::thinning::zhang_suen(&mask);
        }
        trace!(
            thinning = self.capabilities.thinning(),
            "thinning unavailable, keeping unthinned mask"
        );
        mask
    }
}

/// Builds a line mask from an image file using the detected capabilities.
pub fn build_mask(path: &Path, canvas: Canvas, options: &MaskOptions) -> Result<LineMask, ImagingError> {
    Normalizer::new(options.clone(), Capabilities::detect()).load(path, canvas)
}

/// Decodes an image, sniffing the format from its content.
pub fn load_image(path: &Path) -> Result<DynamicImage, ImagingError> {
    let load_err = |reason: String| ImagingError::ImageLoad {
        path: path.to_path_buf(),
        reason,
    };

    ImageReader::open(path)
        .map_err(|e| load_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_err(e.to_string()))?
        .decode()
        .map_err(|e| load_err(e.to_string()))
}

/// Scales `image` to fit `canvas` preserving aspect ratio and centres it on
/// a black background.
fn letterbox(image: &DynamicImage, canvas: Canvas) -> RgbImage {
    let mut out = RgbImage::new(canvas.width, canvas.height);
    let (iw, ih) = (image.width(), image.height());
    if iw == 0 || ih == 0 {
        return out;
    }

    let scale = f64::min(
        f64::from(canvas.width) / f64::from(iw),
        f64::from(canvas.height) / f64::from(ih),
    );
    let nw = ((f64::from(iw) * scale) as u32).clamp(1, canvas.width);
    let nh = ((f64::from(ih) * scale) as u32).clamp(1, canvas.height);

    let resized = imageops::resize(&image.to_rgb8(), nw, nh, FilterType::Triangle);
    let ox = (canvas.width - nw) / 2;
    let oy = (canvas.height - nh) / 2;
    imageops::overlay(&mut out, &resized, i64::from(ox), i64::from(oy));

    trace!(src_w = iw, src_h = ih, nw, nh, ox, oy, "letterboxed");
    out
}

/// Sigma OpenCV derives for a Gaussian kernel of size `k`.
fn kernel_sigma(k: u32) -> f32 {
    0.3 * ((k as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Dark pixels become foreground, light pixels background.
fn threshold_inverse(gray: &GrayImage, level: u8) -> GrayImage {
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        *p = if p.0[0] > level {
            Luma([BACKGROUND])
        } else {
            Luma([FOREGROUND])
        };
    }
    out
}
