use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use insdraw_adb::AdbClient;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::task::JoinHandle;

use crate::error::DeliveryError;
use crate::transport::{ShellSession, ShellTransport};
use crate::types::{BatchResult, SessionExit};

/// Upper bound for the device shell to accept one streamed line.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bytes of session stderr kept for the exit diagnostic (the tail).
const STDERR_TAIL: usize = 8 * 1024;

/// [`ShellTransport`] over `adb shell`.
#[derive(Debug, Clone)]
pub struct AdbShellTransport {
    client: AdbClient,
    write_timeout: Duration,
}

impl Default for AdbShellTransport {
    fn default() -> Self {
        Self::new(AdbClient::default())
    }
}

impl AdbShellTransport {
    pub fn new(client: AdbClient) -> Self {
        Self {
            client,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Sets how long a streamed line may wait for the device shell. A
    /// stalled write counts as a write failure.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn client(&self) -> &AdbClient {
        &self.client
    }
}

impl ShellTransport for AdbShellTransport {
    fn open_session<'a>(
        &'a self,
        serial: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ShellSession>, DeliveryError>> + Send + 'a>>
    {
        Box::pin(async move {
            let mut child = self.client.spawn_shell(serial)?;
            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| DeliveryError::Open("shell stdin not captured".into()))?;
            let stderr = child
                .stderr
                .take()
                .ok_or_else(|| DeliveryError::Open("shell stderr not captured".into()))?;
            // The shell blocks once its stderr pipe is full, so it is read
            // for the whole session, not just at exit.
            let stderr = tokio::spawn(read_tail(stderr, STDERR_TAIL));
            tracing::debug!(serial, pid = child.id(), "adb shell session opened");
            Ok(Box::new(AdbShellSession {
                child,
                stdin,
                stderr,
                write_timeout: self.write_timeout,
            }) as Box<dyn ShellSession>)
        })
    }

    fn run_batch<'a>(
        &'a self,
        serial: &'a str,
        script: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<BatchResult, DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            let out = self.client.shell_script(serial, script, timeout).await?;
            Ok(BatchResult {
                code: out.code,
                stderr: out.stderr,
                timed_out: out.timed_out,
            })
        })
    }
}

/// Reads `reader` to EOF, keeping at most the last `limit` bytes.
async fn read_tail<R>(mut reader: R, limit: usize) -> String
where
    R: AsyncRead + Unpin,
{
    let mut tail = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > limit {
                    tail.drain(..tail.len() - limit);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "shell stderr read failed");
                break;
            }
        }
    }
    String::from_utf8_lossy(&tail).into_owned()
}

struct AdbShellSession {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<String>,
    write_timeout: Duration,
}

impl ShellSession for AdbShellSession {
    fn send_line<'a>(
        &'a mut self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            let stdin = &mut self.stdin;
            let write = async move {
                stdin.write_all(line.as_bytes()).await?;
                stdin.write_all(b"\n").await?;
                stdin.flush().await?;
                Ok::<(), io::Error>(())
            };
            match tokio::time::timeout(self.write_timeout, write).await {
                Ok(res) => res.map_err(DeliveryError::Write),
                Err(_) => Err(DeliveryError::Write(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "device shell stopped reading input",
                ))),
            }
        })
    }

    fn finish(
        self: Box<Self>,
    ) -> Pin<Box<dyn Future<Output = Result<SessionExit, DeliveryError>> + Send>> {
        Box::pin(async move {
            let AdbShellSession {
                mut child,
                stdin,
                stderr,
                ..
            } = *self;
            // EOF on stdin makes the device shell exit after the queued lines.
            drop(stdin);
            let status = child
                .wait()
                .await
                .map_err(|e| DeliveryError::Session(e.to_string()))?;
            let stderr = stderr.await.unwrap_or_default();
            Ok(SessionExit {
                code: status.code().unwrap_or(-1),
                stderr,
            })
        })
    }

    fn abort(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let mut session = *self;
            if let Err(e) = session.child.kill().await {
                tracing::debug!(error = %e, "adb shell already gone");
            }
            session.stderr.abort();
        })
    }
}
