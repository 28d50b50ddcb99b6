/// Turns "sent out of total" counts into percentage notifications.
///
/// Notifications are deduplicated and never decrease. Until
/// [`complete`](Self::complete) is called the value is capped at 99, so 100
/// is only ever reported for a fully successful run.
pub struct ProgressTracker<P> {
    total: usize,
    last: Option<u8>,
    sink: P,
}

impl<P: FnMut(u8)> ProgressTracker<P> {
    pub fn new(total: usize, sink: P) -> Self {
        Self {
            total,
            last: None,
            sink,
        }
    }

    /// Last value handed to the sink.
    pub fn last(&self) -> Option<u8> {
        self.last
    }

    /// Reports that `sent` primitives have been delivered.
    pub fn report(&mut self, sent: usize) {
        let pct = if self.total == 0 {
            0
        } else {
            (sent.min(self.total) as u64 * 100 / self.total as u64).min(99) as u8
        };
        self.emit(pct);
    }

    /// Reports 100%.
    pub fn complete(&mut self) {
        self.emit(100);
    }

    fn emit(&mut self, pct: u8) {
        if self.last.is_none_or(|last| pct > last) {
            self.last = Some(pct);
            (self.sink)(pct);
        }
    }
}
