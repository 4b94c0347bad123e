// Tokio process launcher
// reason: tokio::process for async stdout pipes and kill-on-drop children
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use surveyor_core::port::{CommandSpec, ProcessLauncher, ProcessStdout, RunningProcess};

/// Launches real OS processes with stdout piped
///
/// stdin and stderr are detached so a scanner waiting for input or
/// flooding stderr cannot stall. Children are killed if their handle is
/// dropped before they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioProcessLauncher {
    fn launch(&self, command: &CommandSpec) -> Option<Box<dyn RunningProcess>> {
        let spawned = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(command = %command, pid = ?child.id(), "Process spawned");
                Some(Box::new(TokioProcess { child }))
            }
            Err(e) => {
                warn!(
                    command = %command,
                    error = %e,
                    kind = ?e.kind(),
                    "Process spawn failed"
                );
                None
            }
        }
    }
}

/// Running tokio child process
pub struct TokioProcess {
    child: Child,
}

#[async_trait]
impl RunningProcess for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn take_stdout(&mut self) -> Option<ProcessStdout> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as ProcessStdout)
    }

    async fn wait(&mut self) -> std::io::Result<Option<i32>> {
        let status = self.child.wait().await?;
        Ok(status.code())
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        // SIGKILL on unix, TerminateProcess on windows; waits for the exit
        self.child.kill().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[tokio::test]
    async fn test_missing_executable_is_none() {
        let launcher = TokioProcessLauncher::new();
        let process = launcher.launch(&CommandSpec::new(
            "surveyor-definitely-not-installed",
            Vec::<String>::new(),
        ));
        assert!(process.is_none());
    }

    /// In-memory log sink
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_logged_at_warn_with_cause() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let process = tracing::subscriber::with_default(subscriber, || {
            TokioProcessLauncher::new().launch(&CommandSpec::new(
                "surveyor-definitely-not-installed",
                Vec::<String>::new(),
            ))
        });

        assert!(process.is_none());
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("surveyor-definitely-not-installed"));
        assert!(output.contains("NotFound"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_and_wait() {
        let launcher = TokioProcessLauncher::new();
        let mut process = launcher
            .launch(&CommandSpec::new("sh", ["-c", "exit 3"]))
            .expect("sh should be available");

        assert!(process.id().is_some());
        assert!(process.take_stdout().is_some());
        assert!(process.take_stdout().is_none());
        assert_eq!(process.wait().await.unwrap(), Some(3));
    }
}
