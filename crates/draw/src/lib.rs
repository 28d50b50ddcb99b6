//! One draw run, end to end.
//!
//! This crate ties the pipeline together: it reads the target device's
//! screen size through a [`DeviceQuery`], turns an image into a
//! [`GesturePlan`](insdraw_gesture::GesturePlan) on a blocking worker,
//! and hands the primitives to the
//! [`DeliveryEngine`](insdraw_delivery::DeliveryEngine). Progress and log
//! lines are published as [`DrawEvent`]s.
//!
//! # Pipeline
//!
//! 1. **Snapshot**: screen size (required) and model (informational)
//! 2. **Mask**: letterbox and reduce the image to a line mask
//! 3. **Plan**: trace contours, sample, compile primitives
//! 4. **Deliver**: stream, or fall back to chunked invocations

pub mod device;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod settings;
pub mod types;
pub mod watch;

// Re-export primary types for convenience.
pub use device::{DeviceQuery, DeviceSnapshot};
pub use error::DrawError;
pub use orchestrator::DrawOrchestrator;
pub use pipeline::{line_mask, plan_image, plan_mask};
pub use settings::DrawSettings;
pub use types::{DrawEvent, DrawOutcome, DrawResult};
pub use watch::DeviceWatcher;
