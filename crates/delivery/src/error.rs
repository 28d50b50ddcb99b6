use insdraw_adb::AdbError;

/// Transport-level failures.
///
/// None of these reach the caller of
/// [`DeliveryEngine::deliver`](crate::DeliveryEngine::deliver) directly:
/// open and write failures trigger the chunked fallback, and a failing
/// fallback is reported as a [`DeliveryOutcome`](crate::DeliveryOutcome).
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to open shell session: {0}")]
    Open(String),

    #[error("failed to write to shell session: {0}")]
    Write(#[source] std::io::Error),

    #[error("shell session failed: {0}")]
    Session(String),

    #[error(transparent)]
    Adb(#[from] AdbError),
}
