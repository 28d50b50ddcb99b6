//! Batch delivery of touch primitives to a device.
//!
//! [`DeliveryEngine::deliver`] first streams primitives line by line into a
//! persistent shell session. If the session cannot be opened, or a write
//! fails mid-stream, the remaining primitives are sent in chunks through
//! one-shot `sh -c` invocations instead. Progress is reported through a
//! callback and cancellation is polled between primitives (streaming) or
//! between chunks (fallback).
//!
//! The transport is abstracted behind [`ShellTransport`] so the engine can
//! be exercised without a device; [`AdbShellTransport`] is the production
//! implementation.

mod adb_transport;
mod engine;
mod error;
mod progress;
mod transport;
mod types;

pub use adb_transport::{AdbShellTransport, DEFAULT_WRITE_TIMEOUT};
pub use engine::{DeliveryEngine, DeliveryState};
pub use error::DeliveryError;
pub use progress::ProgressTracker;
pub use transport::{ShellSession, ShellTransport};
pub use types::{
    BatchResult, DeliveryConfig, DeliveryOutcome, DeliveryReport, SessionExit, TransportMode,
};
