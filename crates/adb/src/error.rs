use std::path::PathBuf;

/// Errors from invoking the adb executable.
#[derive(Debug, thiserror::Error)]
pub enum AdbError {
    #[error("failed to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
