//! Device query seam.

use std::future::Future;
use std::pin::Pin;

use insdraw_adb::AdbClient;
use insdraw_protocol::Canvas;

/// Read-only view of attached devices.
///
/// Implemented by [`AdbClient`]; tests substitute a mock. Absent values
/// mean the device is offline or the property is unreadable.
pub trait DeviceQuery: Send + Sync {
    /// Serials of ready devices.
    fn devices(&self) -> Pin<Box<dyn Future<Output = Vec<String>> + Send + '_>>;

    fn screen_size<'a>(
        &'a self,
        serial: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Canvas>> + Send + 'a>>;

    fn model<'a>(&'a self, serial: &'a str)
    -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

    /// Restarts the device bridge server; returns `true` on success.
    fn restart_server(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

impl DeviceQuery for AdbClient {
    fn devices(&self) -> Pin<Box<dyn Future<Output = Vec<String>> + Send + '_>> {
        Box::pin(AdbClient::devices(self))
    }

    fn screen_size<'a>(
        &'a self,
        serial: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Canvas>> + Send + 'a>> {
        Box::pin(AdbClient::screen_size(self, serial))
    }

    fn model<'a>(
        &'a self,
        serial: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(AdbClient::model(self, serial))
    }

    fn restart_server(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(AdbClient::restart_server(self))
    }
}

/// Device state read once at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub serial: String,
    pub canvas: Option<Canvas>,
    pub model: Option<String>,
}

impl DeviceSnapshot {
    /// Queries screen size and model of `serial`.
    pub async fn read(query: &dyn DeviceQuery, serial: &str) -> Self {
        let canvas = query.screen_size(serial).await;
        let model = query.model(serial).await;
        Self {
            serial: serial.to_string(),
            canvas,
            model,
        }
    }
}
