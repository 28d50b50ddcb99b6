//! Device auto-detection.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::device::DeviceQuery;

/// Poll interval when waiting for a device.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Polls the device list until something shows up.
///
/// Polling stops as soon as a device is found to keep load on the bridge
/// server low.
pub struct DeviceWatcher {
    query: Arc<dyn DeviceQuery>,
    interval: Duration,
}

impl DeviceWatcher {
    pub fn new(query: Arc<dyn DeviceQuery>) -> Self {
        Self {
            query,
            interval: DEFAULT_WATCH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Waits until at least one device is ready and returns the listing.
    ///
    /// `on_poll` sees every listing, including empty ones. Returns `None`
    /// if `cancel` fires first.
    pub async fn wait_for_device<F>(&self, cancel: &CancellationToken, mut on_poll: F) -> Option<Vec<String>>
    where
        F: FnMut(&[String]),
    {
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            let devices = self.query.devices().await;
            on_poll(&devices);
            if !devices.is_empty() {
                debug!(count = devices.len(), "device detected");
                return Some(devices);
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
