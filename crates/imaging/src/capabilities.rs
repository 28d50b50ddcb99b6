use std::sync::OnceLock;

/// Optional imaging capabilities, resolved once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    thinning: bool,
}

impl Capabilities {
    /// Detects the capabilities compiled into this build.
    ///
    /// The result is cached; later calls are free.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Capabilities> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let caps = Capabilities {
                thinning: cfg!(feature = "thinning"),
            };
            tracing::debug!(thinning = caps.thinning, "imaging capabilities detected");
            caps
        })
    }

    /// Capabilities with every optional stage disabled.
    pub const fn minimal() -> Self {
        Self { thinning: false }
    }

    /// Whether masks can be thinned to ~1px strokes.
    pub const fn thinning(&self) -> bool {
        self.thinning
    }
}
