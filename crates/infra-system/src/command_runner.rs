// Process-backed command runner
// reason: tokio::time::timeout and AsyncReadExt for bounded stdout capture
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use surveyor_core::application::signal_service::constants::DEFAULT_COMMAND_TIMEOUT;
use surveyor_core::port::{CommandRunner, CommandSpec, ProcessLauncher, RunningProcess};

const READ_CHUNK_SIZE: usize = 4096;

/// How a single run ended
#[derive(Debug)]
enum RunOutcome {
    Exited(Option<i32>),
    ReadFailed(std::io::Error),
    TimedOut,
}

/// Runs commands through a [`ProcessLauncher`] under a deadline
///
/// Launch failures, hangs and pipe errors are logged and resolve to the
/// output captured so far. A hung process is killed before `run` returns.
pub struct ProcessCommandRunner {
    launcher: Arc<dyn ProcessLauncher>,
    timeout: Duration,
}

impl ProcessCommandRunner {
    /// Create a runner with the default 10s deadline
    ///
    /// # Example
    /// ```ignore
    /// let runner = ProcessCommandRunner::new(Arc::new(TokioProcessLauncher::new()))
    ///     .with_timeout(Duration::from_secs(5));
    /// ```
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            launcher,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Override the deadline (zero means no grace period at all)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drain stdout to EOF, then reap the process
    ///
    /// Every chunk lands in `buffer` as soon as it is read, so the bytes
    /// survive if this future is dropped by the timeout.
    async fn drain(
        process: &mut dyn RunningProcess,
        buffer: &mut Vec<u8>,
    ) -> std::io::Result<Option<i32>> {
        if let Some(mut stdout) = process.take_stdout() {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            loop {
                let n = stdout.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
        }

        process.wait().await
    }

    async fn kill(command: &CommandSpec, process: &mut dyn RunningProcess) {
        let pid = process.id();
        match process.kill().await {
            Ok(()) => debug!(command = %command, pid = ?pid, "Process killed"),
            Err(e) => warn!(
                command = %command,
                pid = ?pid,
                error = %e,
                "Failed to kill process"
            ),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, command: &CommandSpec) -> String {
        let Some(mut process) = self.launcher.launch(command) else {
            warn!(command = %command, "Process could not be started");
            return String::new();
        };

        let started = Instant::now();
        let mut buffer = Vec::new();

        let outcome = match timeout(self.timeout, Self::drain(process.as_mut(), &mut buffer)).await {
            Ok(Ok(exit_code)) => RunOutcome::Exited(exit_code),
            Ok(Err(e)) => RunOutcome::ReadFailed(e),
            Err(_) => RunOutcome::TimedOut,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            RunOutcome::Exited(exit_code) => {
                debug!(
                    command = %command,
                    exit_code = ?exit_code,
                    elapsed_ms,
                    bytes = buffer.len(),
                    "Process completed"
                );
            }
            RunOutcome::ReadFailed(e) => {
                warn!(
                    command = %command,
                    error = %e,
                    bytes = buffer.len(),
                    "Failed to read process output"
                );
                Self::kill(command, process.as_mut()).await;
            }
            RunOutcome::TimedOut => {
                warn!(
                    command = %command,
                    pid = ?process.id(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    bytes = buffer.len(),
                    "Process exceeded its time budget and was killed"
                );
                Self::kill(command, process.as_mut()).await;
            }
        }

        info!(command = %command, elapsed_ms, "Command finished");
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
