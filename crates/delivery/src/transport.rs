//! Transport seam between the engine and the device.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::DeliveryError;
use crate::types::{BatchResult, SessionExit};

/// A way to run shell commands on a device.
///
/// Implemented over adb by [`AdbShellTransport`](crate::AdbShellTransport);
/// tests substitute a mock.
pub trait ShellTransport: Send + Sync {
    /// Opens a persistent shell that executes each line written to it.
    fn open_session<'a>(
        &'a self,
        serial: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ShellSession>, DeliveryError>> + Send + 'a>>;

    /// Runs `script` in a single `sh -c` invocation, bounded by `timeout`.
    ///
    /// A timeout is reported through [`BatchResult::timed_out`]; `Err` means
    /// the invocation could not be started at all.
    fn run_batch<'a>(
        &'a self,
        serial: &'a str,
        script: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<BatchResult, DeliveryError>> + Send + 'a>>;
}

/// An open streaming shell.
pub trait ShellSession: Send {
    /// Writes one command line (without trailing newline) and flushes it.
    fn send_line<'a>(
        &'a mut self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;

    /// Closes the session's input and waits for the shell to exit.
    fn finish(
        self: Box<Self>,
    ) -> Pin<Box<dyn Future<Output = Result<SessionExit, DeliveryError>> + Send>>;

    /// Kills the shell without waiting for queued commands.
    fn abort(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}
