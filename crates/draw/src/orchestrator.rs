//! Draw-run orchestrator.
//!
//! Coordinates one run against one device: snapshot, pipeline, delivery.
//! Publishes [`DrawEvent`]s and supports cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use insdraw_delivery::{DeliveryEngine, ShellTransport};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::device::{DeviceQuery, DeviceSnapshot};
use crate::error::DrawError;
use crate::pipeline;
use crate::settings::DrawSettings;
use crate::types::{DrawEvent, DrawResult};

/// Drives draw runs against a device.
pub struct DrawOrchestrator {
    query: Arc<dyn DeviceQuery>,
    transport: Arc<dyn ShellTransport>,
    settings: DrawSettings,
    events_tx: mpsc::Sender<DrawEvent>,
    events_rx: Option<mpsc::Receiver<DrawEvent>>,
    cancel: CancellationToken,
}

impl DrawOrchestrator {
    pub fn new(
        query: Arc<dyn DeviceQuery>,
        transport: Arc<dyn ShellTransport>,
        settings: DrawSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            query,
            transport,
            settings,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<DrawEvent>> {
        self.events_rx.take()
    }

    /// Returns a cancellation token for this orchestrator's runs.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &DrawSettings {
        &self.settings
    }

    /// Draws `image` on device `serial`.
    ///
    /// Errors before delivery (unreadable image, unavailable device,
    /// nothing to draw) abort the run without writing to the device and are
    /// reported as a failed [`DrawResult`].
    pub async fn run(&self, serial: &str, image: &Path) -> DrawResult {
        let result = match self.try_run(serial, image).await {
            Ok(result) => result,
            Err(e) => {
                error!(serial, error = %e, "draw run aborted");
                DrawResult::aborted(&e)
            }
        };

        if result.is_success() {
            info!(serial, primitives = result.primitives, "draw run completed");
        }
        self.emit(result.event());
        result
    }

    async fn try_run(&self, serial: &str, image: &Path) -> Result<DrawResult, DrawError> {
        let snapshot = DeviceSnapshot::read(self.query.as_ref(), serial).await;
        let canvas = snapshot.canvas.ok_or_else(|| DrawError::DeviceUnavailable {
            serial: serial.to_string(),
        })?;
        match &snapshot.model {
            Some(model) => self.log(format!("Device: {model} ({serial})")),
            None => tracing::debug!(serial, "device model unreadable"),
        }
        self.log(format!("Screen {canvas}"));

        let path: PathBuf = image.to_path_buf();
        let settings = self.settings.clone();
        let plan = tokio::task::spawn_blocking(move || pipeline::plan_image(&path, canvas, &settings))
            .await
            .map_err(|e| DrawError::Task(e.to_string()))??;

        self.log(format!("Contours: {}", plan.contours));
        self.log(format!(
            "Commands: {} ({} taps, {} swipes)",
            plan.len(),
            plan.taps,
            plan.swipes
        ));

        let engine = DeliveryEngine::new(self.transport.clone(), self.settings.delivery_config());
        let progress_tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        let report = engine
            .deliver(
                serial,
                &plan.primitives,
                move |percent| {
                    let _ = progress_tx.try_send(DrawEvent::Progress { percent });
                },
                move || cancel.is_cancelled(),
            )
            .await;

        self.log(format!("Delivery {} via {} mode", report.diagnostic(), report.mode));
        Ok(DrawResult::delivered(plan.len(), report))
    }

    fn log(&self, message: String) {
        info!("{message}");
        self.emit(DrawEvent::Log { message });
    }

    /// Notifications never block a run; they are dropped when the channel
    /// is full or nobody listens.
    fn emit(&self, event: DrawEvent) {
        let _ = self.events_tx.try_send(event);
    }
}
