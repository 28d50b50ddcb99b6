//! User-tunable draw settings.

use std::time::Duration;

use insdraw_delivery::DeliveryConfig;
use insdraw_gesture::GestureOptions;
use insdraw_imaging::MaskOptions;
use insdraw_protocol::constants::{
    DEFAULT_BATCH_TIMEOUT, DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_STRIDE, DEFAULT_SEGMENT_MS,
    DEFAULT_SEND_DELAY, DEFAULT_TAP_THRESHOLD, DRAW_MIN_AREA,
};
use serde::{Deserialize, Serialize};

/// Settings for a draw run, as stored in the `[draw]` table of the config
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSettings {
    /// Smoothing radius (0 disables).
    #[serde(default = "default_blur")]
    pub blur: u32,

    /// Edge detection instead of dark-pixel threshold.
    #[serde(default = "default_true")]
    pub use_canny: bool,

    #[serde(default = "default_canny_low")]
    pub canny_low: f32,

    #[serde(default = "default_canny_high")]
    pub canny_high: f32,

    #[serde(default = "default_true")]
    pub morph_close: bool,

    /// Thin strokes when the build supports it.
    #[serde(default = "default_true")]
    pub thin: bool,

    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// Keep every n-th contour point.
    #[serde(default = "default_sample_stride")]
    pub sample_stride: usize,

    /// Duration of one swipe segment in milliseconds.
    #[serde(default = "default_segment_ms")]
    pub segment_ms: u32,

    #[serde(default = "default_tap_threshold")]
    pub tap_threshold: i64,

    /// Contours enclosing less area (px²) are ignored.
    #[serde(default = "default_min_area")]
    pub min_area: f64,

    /// Pause between streamed commands in milliseconds.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,

    /// Commands per chunked invocation.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_batch_timeout_secs")]
    pub batch_timeout_secs: u64,

    /// Already-streamed commands to resend after a fallback.
    #[serde(default)]
    pub fallback_replay: usize,
}

fn default_blur() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_canny_low() -> f32 {
    MaskOptions::default().canny_low
}

fn default_canny_high() -> f32 {
    MaskOptions::default().canny_high
}

fn default_threshold() -> u8 {
    MaskOptions::default().threshold
}

fn default_sample_stride() -> usize {
    DEFAULT_SAMPLE_STRIDE
}

fn default_segment_ms() -> u32 {
    DEFAULT_SEGMENT_MS
}

fn default_tap_threshold() -> i64 {
    DEFAULT_TAP_THRESHOLD
}

fn default_min_area() -> f64 {
    DRAW_MIN_AREA
}

fn default_send_delay_ms() -> u64 {
    DEFAULT_SEND_DELAY.as_millis() as u64
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_batch_timeout_secs() -> u64 {
    DEFAULT_BATCH_TIMEOUT.as_secs()
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            blur: default_blur(),
            use_canny: true,
            canny_low: default_canny_low(),
            canny_high: default_canny_high(),
            morph_close: true,
            thin: true,
            threshold: default_threshold(),
            sample_stride: default_sample_stride(),
            segment_ms: default_segment_ms(),
            tap_threshold: default_tap_threshold(),
            min_area: default_min_area(),
            send_delay_ms: default_send_delay_ms(),
            chunk_size: default_chunk_size(),
            batch_timeout_secs: default_batch_timeout_secs(),
            fallback_replay: 0,
        }
    }
}

impl DrawSettings {
    pub fn mask_options(&self) -> MaskOptions {
        MaskOptions {
            blur: self.blur,
            use_canny: self.use_canny,
            canny_low: self.canny_low,
            canny_high: self.canny_high,
            morph_close: self.morph_close,
            thin: self.thin,
            threshold: self.threshold,
        }
    }

    pub fn gesture_options(&self) -> GestureOptions {
        GestureOptions {
            stride: self.sample_stride,
            segment_ms: self.segment_ms,
            tap_threshold: self.tap_threshold,
        }
    }

    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            send_delay: Duration::from_millis(self.send_delay_ms),
            chunk_size: self.chunk_size,
            batch_timeout: Duration::from_secs(self.batch_timeout_secs),
            fallback_replay: self.fallback_replay,
        }
    }
}
