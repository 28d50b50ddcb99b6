use std::time::Duration;

use insdraw_protocol::constants::{DEFAULT_SAMPLE_STRIDE, DEFAULT_SEGMENT_MS, DEFAULT_TAP_THRESHOLD};
use insdraw_protocol::{Contour, Primitive};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::compile;
use crate::sampler::sample;

/// Sampling and compilation settings for one drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureOptions {
    pub stride: usize,
    pub segment_ms: u32,
    pub tap_threshold: i64,
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            stride: DEFAULT_SAMPLE_STRIDE,
            segment_ms: DEFAULT_SEGMENT_MS,
            tap_threshold: DEFAULT_TAP_THRESHOLD,
        }
    }
}

/// Ordered primitives for a whole drawing plus a few statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GesturePlan {
    pub primitives: Vec<Primitive>,
    /// Contours the plan was built from.
    pub contours: usize,
    /// Contours that produced at least one primitive.
    pub strokes: usize,
    pub taps: usize,
    pub swipes: usize,
}

impl GesturePlan {
    /// Samples and compiles every contour, concatenating the primitives in
    /// contour order.
    pub fn build(contours: &[Contour], options: &GestureOptions) -> Self {
        let mut plan = GesturePlan {
            contours: contours.len(),
            ..Default::default()
        };

        for contour in contours {
            let line = sample(contour, options.stride);
            let prims = compile(&line, options.segment_ms, options.tap_threshold);
            if !prims.is_empty() {
                plan.strokes += 1;
            }
            plan.primitives.extend(prims);
        }

        plan.taps = plan.primitives.iter().filter(|p| p.is_tap()).count();
        plan.swipes = plan.primitives.len() - plan.taps;

        debug!(
            contours = plan.contours,
            strokes = plan.strokes,
            taps = plan.taps,
            swipes = plan.swipes,
            "gesture plan built"
        );
        plan
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Rough wall-clock time to replay the plan in streaming mode.
    pub fn estimated_duration(&self, send_delay: Duration) -> Duration {
        let gestures: u64 = self.primitives.iter().map(|p| u64::from(p.duration_ms())).sum();
        Duration::from_millis(gestures) + send_delay * self.primitives.len() as u32
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }
}
