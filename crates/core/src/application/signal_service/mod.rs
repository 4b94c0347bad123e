// Signal Service - scanner polling loop and published signal state

pub mod constants;
mod shutdown;
mod snapshot;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use snapshot::SignalSnapshot;

use crate::domain::Signal;
use crate::port::{CommandRunner, CommandSpec, ScanParser, TimeProvider};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Everything one poll needs; shared with the background loop
struct Poller {
    runner: Arc<dyn CommandRunner>,
    parser: Arc<dyn ScanParser>,
    command: CommandSpec,
    time_provider: Arc<dyn TimeProvider>,
    state: watch::Sender<Arc<SignalSnapshot>>,
    // Serializes on-demand polls with the background loop
    poll_lock: tokio::sync::Mutex<()>,
}

impl Poller {
    async fn poll_once(&self) -> Arc<SignalSnapshot> {
        let _guard = self.poll_lock.lock().await;

        let output = self.runner.run(&self.command).await;
        let now = self.time_provider.now_millis();

        // A launch failure or a kill before any output both surface as ""
        if output.trim().is_empty() {
            warn!(
                command = %self.command,
                "Scanner produced no output, keeping previous signals"
            );
            return self.degrade(STATUS_NO_OUTPUT.to_string());
        }

        match self.parser.parse(&output) {
            Ok(signals) => {
                let status = if signals.is_empty() {
                    STATUS_NO_NETWORKS
                } else {
                    STATUS_OK
                };
                debug!(
                    command = %self.command,
                    signal_count = signals.len(),
                    "Scan parsed"
                );
                self.publish(SignalSnapshot {
                    signals,
                    status: status.to_string(),
                    scanned_at: Some(now),
                })
            }
            Err(e) => {
                warn!(
                    command = %self.command,
                    error = %e,
                    "Failed to parse scan output, keeping previous signals"
                );
                self.degrade(format!("{}{}", STATUS_ERROR_PREFIX, e))
            }
        }
    }

    /// Publish a new status over the previous signals and scan time
    fn degrade(&self, status: String) -> Arc<SignalSnapshot> {
        let mut published = None;
        self.state.send_modify(|current| {
            let degraded = Arc::new(SignalSnapshot {
                signals: current.signals.clone(),
                status,
                scanned_at: current.scanned_at,
            });
            *current = Arc::clone(&degraded);
            published = Some(degraded);
        });
        published.unwrap_or_else(|| self.state.borrow().clone())
    }

    fn publish(&self, snapshot: SignalSnapshot) -> Arc<SignalSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.state.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    async fn run(&self, poll_interval: Duration, mut shutdown: ShutdownToken) {
        info!(
            command = %self.command,
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Signal polling started"
        );

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            // An in-flight poll always runs to completion (bounded by the
            // runner's own timeout); stop requests are honoured between polls
            self.poll_once().await;

            tokio::select! {
                _ = sleep(poll_interval) => {},
                _ = shutdown.wait() => break,
            }
        }

        info!(command = %self.command, "Signal polling stopped");
    }
}

struct PollLoop {
    shutdown: ShutdownSender,
    handle: JoinHandle<()>,
}

/// Polls the platform scanner and publishes the latest signals
///
/// Consumers read [`SignalService::snapshot`] (or `signals`/`status`) or
/// [`SignalService::subscribe`] to be woken on every publish. Each publish
/// replaces the whole snapshot, so readers never see a half-updated set.
pub struct SignalService {
    poller: Arc<Poller>,
    poll_interval: Duration,
    poll_loop: Mutex<Option<PollLoop>>,
}

impl SignalService {
    /// Create a signal service
    ///
    /// # Arguments
    /// * `runner` - Runs the scan command (never fails, see CommandRunner)
    /// * `parser` - Parser matching the scanner behind `command`
    /// * `command` - Platform scan command
    /// * `time_provider` - Clock used to stamp scans
    ///
    /// # Example
    /// ```ignore
    /// let service = SignalService::new(runner, parser, command, Arc::new(SystemTimeProvider))
    ///     .with_poll_interval(Duration::from_secs(2));
    /// service.start();
    /// ```
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        parser: Arc<dyn ScanParser>,
        command: CommandSpec,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(SignalSnapshot::loading()));

        Self {
            poller: Arc::new(Poller {
                runner,
                parser,
                command,
                time_provider,
                state,
                poll_lock: tokio::sync::Mutex::new(()),
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_loop: Mutex::new(None),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Scan command this service runs
    pub fn command(&self) -> &CommandSpec {
        &self.poller.command
    }

    /// Current published state
    pub fn snapshot(&self) -> Arc<SignalSnapshot> {
        self.poller.state.borrow().clone()
    }

    /// Latest fully parsed signal set
    pub fn signals(&self) -> Vec<Signal> {
        self.snapshot().signals.clone()
    }

    /// Human-readable service state ("loading" until the first poll)
    pub fn status(&self) -> String {
        self.snapshot().status.clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Arc<SignalSnapshot>> {
        self.poller.state.subscribe()
    }

    /// Run one scan now and publish its result
    ///
    /// Never runs concurrently with another poll of this service.
    pub async fn poll_once(&self) -> Arc<SignalSnapshot> {
        self.poller.poll_once().await
    }

    /// Start the background poll loop
    ///
    /// Returns false (and starts nothing) if the loop is already running or
    /// if called outside a tokio runtime.
    pub fn start(&self) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(
                command = %self.poller.command,
                "Signal polling needs a tokio runtime"
            );
            return false;
        };

        let mut poll_loop = self.poll_loop.lock().unwrap();

        if let Some(existing) = poll_loop.as_ref() {
            if !existing.handle.is_finished() {
                warn!(command = %self.poller.command, "Signal polling already running");
                return false;
            }
        }

        let (shutdown, token) = shutdown_channel();
        let poller = Arc::clone(&self.poller);
        let poll_interval = self.poll_interval;
        let handle = runtime.spawn(async move {
            poller.run(poll_interval, token).await;
        });

        *poll_loop = Some(PollLoop { shutdown, handle });
        true
    }

    /// Whether the background loop is running
    pub fn is_running(&self) -> bool {
        self.poll_loop
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|poll_loop| !poll_loop.handle.is_finished())
    }

    /// Stop the background loop
    ///
    /// An in-flight poll is allowed to finish; no poll starts afterwards.
    /// Returns false if the loop was not running.
    pub async fn stop(&self) -> bool {
        let poll_loop = self.poll_loop.lock().unwrap().take();

        let Some(poll_loop) = poll_loop else {
            return false;
        };

        poll_loop.shutdown.shutdown();
        if let Err(e) = poll_loop.handle.await {
            error!(error = ?e, "Signal poll loop ended abnormally");
        }
        true
    }
}
