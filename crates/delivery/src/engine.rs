use std::sync::Arc;

use insdraw_protocol::constants::TIMEOUT_EXIT_CODE;
use insdraw_protocol::{Primitive, join_batch, shell_line};
use tracing::{debug, info, trace, warn};

use crate::progress::ProgressTracker;
use crate::transport::{ShellSession, ShellTransport};
use crate::types::{DeliveryConfig, DeliveryOutcome, DeliveryReport, TransportMode};

/// Position of a delivery run.
///
/// `cursor` is the index of the next primitive to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Init,
    Streaming { cursor: usize },
    ChunkedFallback { cursor: usize },
    Cancelled,
    Done,
    Failed { code: i32, message: String },
}

impl DeliveryState {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Done | Self::Failed { .. })
    }

    fn same_phase(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Delivers primitive lists to one device at a time.
pub struct DeliveryEngine {
    transport: Arc<dyn ShellTransport>,
    config: DeliveryConfig,
}

impl DeliveryEngine {
    pub fn new(transport: Arc<dyn ShellTransport>, config: DeliveryConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Sends `primitives` to `serial` in order.
    ///
    /// `on_progress` receives non-decreasing percentages; 100 only on
    /// success. `is_cancelled` is polled before every streamed primitive and
    /// before every chunk; an in-flight chunk always runs to completion.
    pub async fn deliver<P, C>(
        &self,
        serial: &str,
        primitives: &[Primitive],
        on_progress: P,
        is_cancelled: C,
    ) -> DeliveryReport
    where
        P: FnMut(u8) + Send,
        C: Fn() -> bool + Send,
    {
        let mut run = Run {
            serial,
            primitives,
            config: &self.config,
            transport: self.transport.as_ref(),
            progress: ProgressTracker::new(primitives.len(), on_progress),
            is_cancelled,
            session: None,
            mode: TransportMode::Unused,
            sent: 0,
        };

        info!(serial, primitives = primitives.len(), "delivery started");

        let mut state = DeliveryState::Init;
        while !state.is_terminal() {
            let next = run.step(&state).await;
            if next.same_phase(&state) {
                trace!(?next, "delivery step");
            } else {
                debug!(from = ?state, to = ?next, "delivery transition");
            }
            state = next;
        }

        run.into_report(state)
    }
}

/// Mutable context of one `deliver` call.
struct Run<'a, P, C> {
    serial: &'a str,
    primitives: &'a [Primitive],
    config: &'a DeliveryConfig,
    transport: &'a dyn ShellTransport,
    progress: ProgressTracker<P>,
    is_cancelled: C,
    session: Option<Box<dyn ShellSession>>,
    mode: TransportMode,
    sent: usize,
}

impl<P, C> Run<'_, P, C>
where
    P: FnMut(u8) + Send,
    C: Fn() -> bool + Send,
{
    async fn step(&mut self, state: &DeliveryState) -> DeliveryState {
        match *state {
            DeliveryState::Init => self.open().await,
            DeliveryState::Streaming { cursor } => self.stream(cursor).await,
            DeliveryState::ChunkedFallback { cursor } => self.send_chunk(cursor).await,
            DeliveryState::Cancelled | DeliveryState::Done | DeliveryState::Failed { .. } => {
                state.clone()
            }
        }
    }

    async fn open(&mut self) -> DeliveryState {
        if self.primitives.is_empty() {
            return DeliveryState::Done;
        }
        match self.transport.open_session(self.serial).await {
            Ok(session) => {
                self.session = Some(session);
                self.mode = TransportMode::Streaming;
                info!(serial = self.serial, "streaming over persistent shell");
                DeliveryState::Streaming { cursor: 0 }
            }
            Err(e) => {
                warn!(serial = self.serial, error = %e, "shell session unavailable, using chunked mode");
                self.enter_fallback(0)
            }
        }
    }

    async fn stream(&mut self, cursor: usize) -> DeliveryState {
        if cursor == self.primitives.len() {
            return self.finish_session().await;
        }

        if (self.is_cancelled)() {
            self.abort_session().await;
            return DeliveryState::Cancelled;
        }

        let Some(session) = self.session.as_mut() else {
            return self.enter_fallback(cursor);
        };
        let line = shell_line(&self.primitives[cursor]);
        if let Err(e) = session.send_line(&line).await {
            warn!(cursor, error = %e, "stream write failed, switching to chunked mode");
            self.abort_session().await;
            let resume = cursor.saturating_sub(self.config.fallback_replay);
            return self.enter_fallback(resume);
        }

        self.sent = cursor + 1;
        self.progress.report(self.sent);
        tokio::time::sleep(self.config.send_delay).await;
        DeliveryState::Streaming { cursor: cursor + 1 }
    }

    async fn finish_session(&mut self) -> DeliveryState {
        let Some(session) = self.session.take() else {
            return DeliveryState::Done;
        };
        match tokio::time::timeout(self.config.batch_timeout, session.finish()).await {
            Ok(Ok(exit)) if exit.code == 0 => DeliveryState::Done,
            Ok(Ok(exit)) => {
                let stderr = exit.stderr.trim();
                DeliveryState::Failed {
                    code: exit.code,
                    message: if stderr.is_empty() {
                        format!("shell exited with status {}", exit.code)
                    } else {
                        stderr.to_string()
                    },
                }
            }
            Ok(Err(e)) => DeliveryState::Failed {
                code: -1,
                message: e.to_string(),
            },
            Err(_) => DeliveryState::Failed {
                code: TIMEOUT_EXIT_CODE,
                message: format!(
                    "shell did not exit within {}s",
                    self.config.batch_timeout.as_secs()
                ),
            },
        }
    }

    async fn abort_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.abort().await;
        }
    }

    fn enter_fallback(&mut self, cursor: usize) -> DeliveryState {
        self.mode = TransportMode::Chunked;
        DeliveryState::ChunkedFallback { cursor }
    }

    async fn send_chunk(&mut self, cursor: usize) -> DeliveryState {
        let total = self.primitives.len();
        if cursor >= total {
            return DeliveryState::Done;
        }
        if (self.is_cancelled)() {
            return DeliveryState::Cancelled;
        }

        let end = (cursor + self.config.chunk_size()).min(total);
        let script = join_batch(&self.primitives[cursor..end]);
        debug!(from = cursor, to = end, total, "sending chunk");

        let result = match self
            .transport
            .run_batch(self.serial, &script, self.config.batch_timeout)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                return DeliveryState::Failed {
                    code: -1,
                    message: e.to_string(),
                };
            }
        };

        if result.timed_out {
            return DeliveryState::Failed {
                code: TIMEOUT_EXIT_CODE,
                message: format!(
                    "batch timed out after {}s",
                    self.config.batch_timeout.as_secs()
                ),
            };
        }
        if result.code != 0 {
            let stderr = result.stderr.trim();
            return DeliveryState::Failed {
                code: result.code,
                message: if stderr.is_empty() {
                    "sh -c batch failed".to_string()
                } else {
                    stderr.to_string()
                },
            };
        }

        self.sent = self.sent.max(end);
        self.progress.report(end);
        DeliveryState::ChunkedFallback { cursor: end }
    }

    fn into_report(mut self, state: DeliveryState) -> DeliveryReport {
        let outcome = match state {
            DeliveryState::Done => {
                self.progress.complete();
                DeliveryOutcome::Completed
            }
            DeliveryState::Cancelled => DeliveryOutcome::Cancelled,
            DeliveryState::Failed { code, message } => DeliveryOutcome::Failed { code, message },
            // The loop only exits on a terminal state.
            DeliveryState::Init
            | DeliveryState::Streaming { .. }
            | DeliveryState::ChunkedFallback { .. } => DeliveryOutcome::Failed {
                code: -1,
                message: "delivery stopped before reaching a terminal state".into(),
            },
        };

        match &outcome {
            DeliveryOutcome::Completed => {
                info!(serial = self.serial, mode = %self.mode, sent = self.sent, "delivery completed");
            }
            DeliveryOutcome::Cancelled => {
                info!(serial = self.serial, mode = %self.mode, sent = self.sent, "delivery cancelled");
            }
            DeliveryOutcome::Failed { code, message } => {
                warn!(serial = self.serial, mode = %self.mode, code, message, "delivery failed");
            }
        }

        DeliveryReport {
            outcome,
            mode: self.mode,
            sent: self.sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    use insdraw_protocol::Point;

    use super::*;
    use crate::error::DeliveryError;
    use crate::types::{BatchResult, SessionExit};

    #[derive(Default)]
    struct Recorded {
        lines: Vec<String>,
        batches: Vec<String>,
        opened: bool,
        aborted: bool,
        finished: bool,
    }

    struct MockTransport {
        rec: Arc<Mutex<Recorded>>,
        open_fails: bool,
        fail_write_at: Option<usize>,
        exit: SessionExit,
        batch: BatchResult,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                rec: Arc::default(),
                open_fails: false,
                fail_write_at: None,
                exit: SessionExit {
                    code: 0,
                    stderr: String::new(),
                },
                batch: BatchResult::ok(),
            }
        }

        fn open_fails(mut self) -> Self {
            self.open_fails = true;
            self
        }
    }

    struct MockSession {
        rec: Arc<Mutex<Recorded>>,
        fail_write_at: Option<usize>,
        exit: SessionExit,
    }

    impl ShellTransport for MockTransport {
        fn open_session<'a>(
            &'a self,
            _serial: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ShellSession>, DeliveryError>> + Send + 'a>>
        {
            Box::pin(async move {
                if self.open_fails {
                    return Err(DeliveryError::Open("no device".into()));
                }
                self.rec.lock().unwrap().opened = true;
                Ok(Box::new(MockSession {
                    rec: self.rec.clone(),
                    fail_write_at: self.fail_write_at,
                    exit: self.exit.clone(),
                }) as Box<dyn ShellSession>)
            })
        }

        fn run_batch<'a>(
            &'a self,
            _serial: &'a str,
            script: &'a str,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<BatchResult, DeliveryError>> + Send + 'a>> {
            Box::pin(async move {
                self.rec.lock().unwrap().batches.push(script.to_string());
                Ok(self.batch.clone())
            })
        }
    }

    impl ShellSession for MockSession {
        fn send_line<'a>(
            &'a mut self,
            line: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
            Box::pin(async move {
                let mut rec = self.rec.lock().unwrap();
                if self.fail_write_at == Some(rec.lines.len()) {
                    return Err(DeliveryError::Write(std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "pipe closed",
                    )));
                }
                rec.lines.push(line.to_string());
                Ok(())
            })
        }

        fn finish(
            self: Box<Self>,
        ) -> Pin<Box<dyn Future<Output = Result<SessionExit, DeliveryError>> + Send>> {
            Box::pin(async move {
                self.rec.lock().unwrap().finished = true;
                Ok(self.exit.clone())
            })
        }

        fn abort(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
            Box::pin(async move {
                self.rec.lock().unwrap().aborted = true;
            })
        }
    }

    fn primitives(n: usize) -> Vec<Primitive> {
        (0..n as i32)
            .map(|i| {
                if i % 3 == 0 {
                    Primitive::tap(Point::new(i, i))
                } else {
                    Primitive::swipe(Point::new(i, 0), Point::new(i + 10, 5), 18)
                }
            })
            .collect()
    }

    fn engine(transport: MockTransport, config: DeliveryConfig) -> (DeliveryEngine, Arc<Mutex<Recorded>>) {
        let rec = transport.rec.clone();
        (DeliveryEngine::new(Arc::new(transport), config), rec)
    }

    fn fast() -> DeliveryConfig {
        DeliveryConfig {
            send_delay: Duration::ZERO,
            ..DeliveryConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_sends_every_line_in_order() {
        let prims = primitives(20);
        let (engine, rec) = engine(MockTransport::new(), DeliveryConfig::default());

        let mut progress = Vec::new();
        let report = engine
            .deliver("dev", &prims, |p| progress.push(p), || false)
            .await;

        assert_eq!(report.outcome, DeliveryOutcome::Completed);
        assert_eq!(report.mode, TransportMode::Streaming);
        assert_eq!(report.sent, 20);
        assert_eq!(report.return_code(), 0);

        let rec = rec.lock().unwrap();
        let expected: Vec<String> = prims.iter().map(shell_line).collect();
        assert_eq!(rec.lines, expected);
        assert!(rec.finished);
        assert!(!rec.aborted);
        assert!(rec.batches.is_empty());

        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(progress.last(), Some(&100));
        assert_eq!(progress.iter().filter(|&&p| p == 100).count(), 1);
    }

    #[tokio::test]
    async fn open_failure_falls_back_to_two_chunks() {
        let prims = primitives(700);
        let (engine, rec) = engine(MockTransport::new().open_fails(), fast());

        let mut progress = Vec::new();
        let report = engine
            .deliver("dev", &prims, |p| progress.push(p), || false)
            .await;

        assert!(report.is_success());
        assert_eq!(report.mode, TransportMode::Chunked);
        assert_eq!(report.sent, 700);

        let rec = rec.lock().unwrap();
        assert_eq!(rec.batches.len(), 2);
        assert_eq!(rec.batches[0], join_batch(&prims[..350]));
        assert_eq!(rec.batches[1], join_batch(&prims[350..]));
        assert_eq!(progress, vec![50, 99, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_five_stops_before_sixth() {
        let prims = primitives(20);
        let (engine, rec) = engine(MockTransport::new(), DeliveryConfig::default());

        let seen = rec.clone();
        let mut progress = Vec::new();
        let report = engine
            .deliver(
                "dev",
                &prims,
                |p| progress.push(p),
                move || seen.lock().unwrap().lines.len() >= 5,
            )
            .await;

        assert_eq!(report.outcome, DeliveryOutcome::Cancelled);
        assert_eq!(report.return_code(), 130);
        assert_eq!(report.sent, 5);

        let rec = rec.lock().unwrap();
        assert_eq!(rec.lines.len(), 5);
        assert!(rec.aborted);
        assert!(!rec.finished);
        assert_eq!(progress.last(), Some(&25));
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_resends_remainder_in_chunks() {
        let prims = primitives(20);
        let transport = MockTransport {
            fail_write_at: Some(7),
            ..MockTransport::new()
        };
        let config = DeliveryConfig {
            chunk_size: 5,
            ..DeliveryConfig::default()
        };
        let (engine, rec) = engine(transport, config);

        let report = engine.deliver("dev", &prims, |_| {}, || false).await;

        assert!(report.is_success());
        assert_eq!(report.mode, TransportMode::Chunked);
        assert_eq!(report.sent, 20);

        let rec = rec.lock().unwrap();
        assert_eq!(rec.lines.len(), 7);
        assert!(rec.aborted);
        assert_eq!(
            rec.batches,
            vec![
                join_batch(&prims[7..12]),
                join_batch(&prims[12..17]),
                join_batch(&prims[17..20]),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_replay_resends_written_primitives() {
        let prims = primitives(20);
        let transport = MockTransport {
            fail_write_at: Some(7),
            ..MockTransport::new()
        };
        let config = DeliveryConfig {
            fallback_replay: 2,
            ..DeliveryConfig::default()
        };
        let (engine, rec) = engine(transport, config);

        let report = engine.deliver("dev", &prims, |_| {}, || false).await;
        assert!(report.is_success());
        assert_eq!(rec.lock().unwrap().batches, vec![join_batch(&prims[5..])]);
    }

    #[tokio::test]
    async fn batch_timeout_reports_sentinel() {
        let prims = primitives(800);
        let transport = MockTransport {
            batch: BatchResult {
                code: 124,
                stderr: "timeout".into(),
                timed_out: true,
            },
            ..MockTransport::new().open_fails()
        };
        let (engine, rec) = engine(transport, fast());

        let mut progress = Vec::new();
        let report = engine
            .deliver("dev", &prims, |p| progress.push(p), || false)
            .await;

        assert_eq!(report.return_code(), TIMEOUT_EXIT_CODE);
        assert!(report.diagnostic().starts_with("timeout"));
        assert_eq!(rec.lock().unwrap().batches.len(), 1);
        assert!(progress.is_empty());
    }

    #[tokio::test]
    async fn failing_batch_aborts_with_its_code() {
        let prims = primitives(800);
        let transport = MockTransport {
            batch: BatchResult {
                code: 1,
                stderr: "  \n".into(),
                timed_out: false,
            },
            ..MockTransport::new().open_fails()
        };
        let (engine, rec) = engine(transport, fast());

        let report = engine.deliver("dev", &prims, |_| {}, || false).await;

        assert_eq!(
            report.outcome,
            DeliveryOutcome::Failed {
                code: 1,
                message: "sh -c batch failed".into()
            }
        );
        assert_eq!(report.sent, 0);
        assert_eq!(rec.lock().unwrap().batches.len(), 1);
    }

    #[tokio::test]
    async fn cancellation_is_checked_between_chunks() {
        let prims = primitives(1000);
        let (engine, rec) = engine(MockTransport::new().open_fails(), fast());

        let seen = rec.clone();
        let report = engine
            .deliver(
                "dev",
                &prims,
                |_| {},
                move || seen.lock().unwrap().batches.len() >= 1,
            )
            .await;

        assert_eq!(report.outcome, DeliveryOutcome::Cancelled);
        assert_eq!(report.sent, 350);
        assert_eq!(rec.lock().unwrap().batches.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn nonzero_session_exit_fails_with_stderr() {
        let prims = primitives(3);
        let transport = MockTransport {
            exit: SessionExit {
                code: 255,
                stderr: "error: device offline\n".into(),
            },
            ..MockTransport::new()
        };
        let (engine, _rec) = engine(transport, DeliveryConfig::default());

        let mut progress = Vec::new();
        let report = engine
            .deliver("dev", &prims, |p| progress.push(p), || false)
            .await;

        assert_eq!(
            report.outcome,
            DeliveryOutcome::Failed {
                code: 255,
                message: "error: device offline".into()
            }
        );
        assert!(!progress.contains(&100));
    }

    #[tokio::test]
    async fn empty_list_completes_without_transport() {
        let (engine, rec) = engine(MockTransport::new(), fast());

        let mut progress = Vec::new();
        let report = engine.deliver("dev", &[], |p| progress.push(p), || false).await;

        assert!(report.is_success());
        assert_eq!(report.mode, TransportMode::Unused);
        assert_eq!(progress, vec![100]);
        assert!(!rec.lock().unwrap().opened);
    }

    #[test]
    fn terminal_states() {
        assert!(DeliveryState::Done.is_terminal());
        assert!(DeliveryState::Cancelled.is_terminal());
        assert!(
            DeliveryState::Failed {
                code: 1,
                message: String::new()
            }
            .is_terminal()
        );
        assert!(!DeliveryState::Init.is_terminal());
        assert!(!DeliveryState::Streaming { cursor: 0 }.is_terminal());
    }
}
