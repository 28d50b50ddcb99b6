use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use insdraw_protocol::Canvas;
use insdraw_protocol::constants::TIMEOUT_EXIT_CODE;
use tokio::process::{Child, Command};

use crate::error::AdbError;
use crate::parse;

/// Upper bound for a single query (`devices`, `wm size`, ...).
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured result of one adb invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbOutput {
    /// Process exit code; [`TIMEOUT_EXIT_CODE`] on timeout, -1 when killed
    /// by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl AdbOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    fn timeout() -> Self {
        Self {
            code: TIMEOUT_EXIT_CODE,
            stdout: String::new(),
            stderr: "timeout".into(),
            timed_out: true,
        }
    }
}

/// Handle on the adb executable.
#[derive(Debug, Clone)]
pub struct AdbClient {
    program: PathBuf,
    query_timeout: Duration,
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AdbClient {
    /// Uses `adb` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("adb")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    fn command(&self, serial: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = serial {
            cmd.args(["-s", serial]);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// Runs `adb [-s serial] <args>` to completion, killing it after
    /// `timeout`.
    ///
    /// A timeout is not an error: it yields an output with
    /// [`TIMEOUT_EXIT_CODE`] and `timed_out` set.
    pub async fn run(
        &self,
        serial: Option<&str>,
        args: &[&str],
        timeout: Duration,
    ) -> Result<AdbOutput, AdbError> {
        let child = self
            .command(serial)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AdbError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping the child on timeout kills it (`kill_on_drop`).
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!(?args, ?timeout, "adb invocation timed out");
                return Ok(AdbOutput::timeout());
            }
        };

        Ok(AdbOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        })
    }

    /// Runs a query, mapping spawn failures to `None`.
    async fn query(&self, serial: Option<&str>, args: &[&str]) -> Option<AdbOutput> {
        match self.run(serial, args, self.query_timeout).await {
            Ok(out) => Some(out),
            Err(e) => {
                tracing::debug!(error = %e, ?args, "adb query failed");
                None
            }
        }
    }

    /// Returns `true` if `adb version` runs successfully.
    pub async fn is_available(&self) -> bool {
        self.query(None, &["version"])
            .await
            .is_some_and(|out| out.success())
    }

    /// Serials of devices in the ready (`device`) state.
    pub async fn devices(&self) -> Vec<String> {
        match self.query(None, &["devices"]).await {
            Some(out) => parse::parse_devices(&out.stdout),
            None => Vec::new(),
        }
    }

    /// Physical display resolution of `serial`.
    pub async fn screen_size(&self, serial: &str) -> Option<Canvas> {
        let out = self.query(Some(serial), &["shell", "wm", "size"]).await?;
        parse::parse_screen_size(&out.stdout)
    }

    /// `ro.product.model` of `serial`.
    pub async fn model(&self, serial: &str) -> Option<String> {
        let out = self
            .query(Some(serial), &["shell", "getprop", "ro.product.model"])
            .await?;
        if !out.success() {
            return None;
        }
        parse::parse_model(&out.stdout)
    }

    /// Restarts the adb server (`kill-server` then `start-server`).
    pub async fn restart_server(&self) -> bool {
        let killed = self.query(None, &["kill-server"]).await;
        tracing::debug!(killed = killed.as_ref().is_some_and(AdbOutput::success), "adb kill-server");
        let started = self.query(None, &["start-server"]).await;
        let ok = started.is_some_and(|out| out.success());
        tracing::info!(ok, "adb server restarted");
        ok
    }

    /// Runs `script` through `sh -c` on the device in a single invocation.
    pub async fn shell_script(
        &self,
        serial: &str,
        script: &str,
        timeout: Duration,
    ) -> Result<AdbOutput, AdbError> {
        let quoted = shell_quote(script);
        self.run(Some(serial), &["shell", "sh", "-c", &quoted], timeout)
            .await
    }

    /// Starts an interactive `adb -s <serial> shell` reading commands from
    /// its stdin. Stdout is discarded, stderr kept for diagnostics.
    pub fn spawn_shell(&self, serial: &str) -> Result<Child, AdbError> {
        self.command(Some(serial))
            .arg("shell")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AdbError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// Quotes `s` as a single POSIX shell word.
///
/// `adb shell` joins its arguments with spaces before the device shell
/// parses them, so a multi-word script must be quoted to reach `sh -c`
/// intact.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_plain_script() {
        assert_eq!(
            shell_quote("input tap 1 2 ; input tap 3 4"),
            "'input tap 1 2 ; input tap 3 4'"
        );
    }

    #[test]
    fn quote_embedded_single_quote() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn defaults() {
        let client = AdbClient::new();
        assert_eq!(client.program(), Path::new("adb"));
        assert_eq!(client.query_timeout(), DEFAULT_QUERY_TIMEOUT);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let client = AdbClient::with_program("/nonexistent/insdraw-adb");
        let err = client
            .run(None, &["devices"], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AdbError::Spawn { .. }));
    }

    #[tokio::test]
    async fn missing_program_queries_are_absent() {
        let client = AdbClient::with_program("/nonexistent/insdraw-adb");
        assert!(!client.is_available().await);
        assert!(client.devices().await.is_empty());
        assert_eq!(client.screen_size("abc").await, None);
        assert_eq!(client.model("abc").await, None);
        assert!(!client.restart_server().await);
        assert!(client.spawn_shell("abc").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_code_and_output_are_captured() {
        let client = AdbClient::with_program("sh");
        let out = client
            .run(None, &["-c", "echo hi; echo oops >&2; exit 3"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout.trim(), "hi");
        assert_eq!(out.stderr.trim(), "oops");
        assert!(!out.timed_out);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_invocation_times_out() {
        let client = AdbClient::with_program("sleep");
        let out = client
            .run(None, &["5"], Duration::from_millis(100))
            .await
            .unwrap();
        assert!(out.timed_out);
        assert_eq!(out.code, TIMEOUT_EXIT_CODE);
    }
}
