use std::time::Duration;

/// Default squared-distance threshold under which a segment becomes a tap
/// (points within 2 px of each other).
pub const DEFAULT_TAP_THRESHOLD: i64 = 4;

/// Default duration of a single swipe segment.
pub const DEFAULT_SEGMENT_MS: u32 = 18;

/// Default stride used when sampling contour points.
pub const DEFAULT_SAMPLE_STRIDE: usize = 6;

/// Default minimum enclosed area for a contour to be kept.
pub const DEFAULT_MIN_AREA: f64 = 20.0;

/// Minimum contour area used by full draw runs.
///
/// Higher than [`DEFAULT_MIN_AREA`] to drop specks that would only
/// produce a burst of taps on the device.
pub const DRAW_MIN_AREA: f64 = 80.0;

/// Delay between two commands written to a streaming shell session.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(8);

/// Number of commands per chunked `sh -c` invocation.
pub const DEFAULT_CHUNK_SIZE: usize = 350;

/// Upper bound for one chunked invocation.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(180);

/// Return code reported when a transport invocation times out.
///
/// Same value as coreutils `timeout(1)` so "device unresponsive" can be told
/// apart from a command rejected by the device.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Return code reported for a cancelled delivery (SIGINT convention).
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Separator used to join commands of a chunked batch.
pub const BATCH_SEPARATOR: &str = " ; ";

/// Program on the device that injects touch events.
pub const INPUT_PROGRAM: &str = "input";
