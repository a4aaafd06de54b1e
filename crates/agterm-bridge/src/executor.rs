//! ScriptRunner trait and OsascriptExecutor (blocking subprocess wrapper).
//! The trait is the mock-injection seam for everything above the bridge.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::error::BridgeError;

/// Trait for executing automation scripts.
///
/// `args` are delivered to the script's `on run argv` handler as a list of
/// strings, so caller text never has to be spliced into script source.
///
/// Implementations block; async callers go through `spawn_blocking`.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: &str, args: &[&str]) -> Result<String, BridgeError>;
}

impl<T: ScriptRunner + ?Sized> ScriptRunner for &T {
    fn run(&self, script: &str, args: &[&str]) -> Result<String, BridgeError> {
        (**self).run(script, args)
    }
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Real executor: `osascript -e <script> <args…>`.
pub struct OsascriptExecutor {
    osascript_bin: String,
    timeout: Duration,
}

impl OsascriptExecutor {
    pub fn new(osascript_bin: impl Into<String>) -> Self {
        Self {
            osascript_bin: osascript_bin.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_async(&self, script: &str, args: &[&str]) -> Result<String, BridgeError> {
        let mut child = Command::new(&self.osascript_bin)
            .arg("-e")
            .arg(script)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Both pipes are read while waiting so a large buffer dump cannot
        // fill a pipe and stall the child.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => finish(status, &stdout, &stderr),
            Ok(Err(e)) => {
                reap(&mut child).await;
                Err(e.into())
            }
            Err(_) => {
                reap(&mut child).await;
                tracing::warn!(timeout = ?self.timeout, "osascript timed out, killed");
                Err(BridgeError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

impl Default for OsascriptExecutor {
    fn default() -> Self {
        Self::new("osascript")
    }
}

impl ScriptRunner for OsascriptExecutor {
    fn run(&self, script: &str, args: &[&str]) -> Result<String, BridgeError> {
        // Runs on a blocking thread, outside any async context, so a private
        // single-threaded runtime can drive the child to completion here.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run_async(script, args))
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the child and wait for it so no osascript process outlives the call.
async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::debug!("osascript kill failed: {e}");
    }
}

fn finish(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Result<String, BridgeError> {
    if !status.success() {
        return Err(BridgeError::CommandFailed(format!(
            "exit code {}: {}",
            status.code().unwrap_or(-1),
            String::from_utf8_lossy(stderr).trim()
        )));
    }
    let stdout = String::from_utf8_lossy(stdout);
    Ok(stdout.trim_end_matches(['\n', '\r']).to_string())
}
