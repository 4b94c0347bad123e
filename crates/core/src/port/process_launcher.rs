// Process Launcher Port
// The only OS-process boundary; mocked in tests so nothing real is spawned

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

/// External command descriptor (executable + arguments)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Readable standard output of a running process
pub type ProcessStdout = Box<dyn AsyncRead + Send + Unpin>;

/// Handle to a process started by a [`ProcessLauncher`]
#[async_trait]
pub trait RunningProcess: Send {
    /// OS process id, if the process still has one
    fn id(&self) -> Option<u32>;

    /// Take ownership of the stdout pipe (returns `None` after the first call)
    fn take_stdout(&mut self) -> Option<ProcessStdout>;

    /// Wait for the process to exit, returning its exit code
    async fn wait(&mut self) -> std::io::Result<Option<i32>>;

    /// Forcibly terminate the process and reap it
    async fn kill(&mut self) -> std::io::Result<()>;
}

/// Starts external processes
///
/// Returns `None` when the process could not be started (missing
/// executable, permissions, ...). Callers treat that as "no output".
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, command: &CommandSpec) -> Option<Box<dyn RunningProcess>>;
}

/// Adapts a plain function or closure into a [`ProcessLauncher`]
///
/// # Example
/// ```ignore
/// let launcher = FnLauncher::new(|_command: &CommandSpec| None);
/// ```
pub struct FnLauncher<F> {
    launch: F,
}

impl<F> FnLauncher<F>
where
    F: Fn(&CommandSpec) -> Option<Box<dyn RunningProcess>> + Send + Sync,
{
    pub fn new(launch: F) -> Self {
        Self { launch }
    }
}

impl<F> ProcessLauncher for FnLauncher<F>
where
    F: Fn(&CommandSpec) -> Option<Box<dyn RunningProcess>> + Send + Sync,
{
    fn launch(&self, command: &CommandSpec) -> Option<Box<dyn RunningProcess>> {
        (self.launch)(command)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// What a mock process does once its scripted stdout is exhausted
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockOutcome {
        /// Close stdout and exit with code 0
        Exit,
        /// Keep stdout open and never exit (simulates a hung scanner)
        Hang,
        /// Fail the next stdout read
        ReadError,
    }

    /// Stdout that replays a byte script, then follows the outcome
    struct ScriptedStdout {
        data: Vec<u8>,
        pos: usize,
        outcome: MockOutcome,
    }

    impl AsyncRead for ScriptedStdout {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if self.pos < self.data.len() {
                let n = (self.data.len() - self.pos).min(buf.remaining());
                let start = self.pos;
                buf.put_slice(&self.data[start..start + n]);
                self.pos += n;
                return Poll::Ready(Ok(()));
            }

            match self.outcome {
                MockOutcome::Exit => Poll::Ready(Ok(())),
                // Never woken; the caller's timeout drives progress
                MockOutcome::Hang => Poll::Pending,
                MockOutcome::ReadError => Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "mock stdout read failure",
                ))),
            }
        }
    }

    /// Mock process handle
    pub struct MockProcess {
        id: u32,
        stdout: Option<ProcessStdout>,
        outcome: MockOutcome,
        fail_kill: bool,
        kills: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RunningProcess for MockProcess {
        fn id(&self) -> Option<u32> {
            Some(self.id)
        }

        fn take_stdout(&mut self) -> Option<ProcessStdout> {
            self.stdout.take()
        }

        async fn wait(&mut self) -> std::io::Result<Option<i32>> {
            match self.outcome {
                MockOutcome::Hang => std::future::pending().await,
                MockOutcome::Exit | MockOutcome::ReadError => Ok(Some(0)),
            }
        }

        async fn kill(&mut self) -> std::io::Result<()> {
            self.kills.fetch_add(1, Ordering::SeqCst);
            if self.fail_kill {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock kill failure",
                ));
            }
            Ok(())
        }
    }

    /// Mock launcher recording every command it was asked to start
    #[derive(Clone)]
    pub struct MockProcessLauncher {
        script: Option<(Vec<u8>, MockOutcome)>,
        fail_kill: bool,
        launched: Arc<Mutex<Vec<CommandSpec>>>,
        kills: Arc<AtomicUsize>,
    }

    impl MockProcessLauncher {
        fn with_script(script: Option<(Vec<u8>, MockOutcome)>) -> Self {
            Self {
                script,
                fail_kill: false,
                launched: Arc::new(Mutex::new(Vec::new())),
                kills: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Processes write `stdout` and exit
        pub fn exiting(stdout: impl Into<Vec<u8>>) -> Self {
            Self::with_script(Some((stdout.into(), MockOutcome::Exit)))
        }

        /// Processes write `stdout` and then hang forever
        pub fn hanging(stdout: impl Into<Vec<u8>>) -> Self {
            Self::with_script(Some((stdout.into(), MockOutcome::Hang)))
        }

        /// Processes write `stdout` and then fail the next read
        pub fn failing_read(stdout: impl Into<Vec<u8>>) -> Self {
            Self::with_script(Some((stdout.into(), MockOutcome::ReadError)))
        }

        /// Launcher that can never start a process
        pub fn unavailable() -> Self {
            Self::with_script(None)
        }

        /// Make `kill` on launched processes return an error
        pub fn with_failing_kill(mut self) -> Self {
            self.fail_kill = true;
            self
        }

        pub fn launch_count(&self) -> usize {
            self.launched.lock().unwrap().len()
        }

        pub fn kill_count(&self) -> usize {
            self.kills.load(Ordering::SeqCst)
        }

        pub fn last_command(&self) -> Option<CommandSpec> {
            self.launched.lock().unwrap().last().cloned()
        }
    }

    impl ProcessLauncher for MockProcessLauncher {
        fn launch(&self, command: &CommandSpec) -> Option<Box<dyn RunningProcess>> {
            let mut launched = self.launched.lock().unwrap();
            launched.push(command.clone());

            let (data, outcome) = self.script.clone()?;
            let stdout: ProcessStdout = Box::new(ScriptedStdout {
                data,
                pos: 0,
                outcome,
            });

            Some(Box::new(MockProcess {
                id: 1000 + launched.len() as u32,
                stdout: Some(stdout),
                outcome,
                fail_kill: self.fail_kill,
                kills: Arc::clone(&self.kills),
            }))
        }
    }
}
