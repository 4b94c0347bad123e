// Command Runner Port
// Runs one external command to completion or deadline

use async_trait::async_trait;

use crate::port::process_launcher::CommandSpec;

/// Command runner trait
///
/// Implementations:
/// - ProcessCommandRunner: launches through a ProcessLauncher with a timeout
///
/// `run` never fails: a missing executable, a hang or a broken pipe all
/// complete with whatever stdout was captured (possibly empty) and are
/// reported through the log instead.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` and return its captured standard output
    async fn run(&self, command: &CommandSpec) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock runner replaying canned outputs
    ///
    /// Outputs are returned in order; the last one repeats once the queue
    /// runs dry. An empty script behaves like a scanner that printed nothing.
    pub struct MockCommandRunner {
        outputs: Arc<Mutex<VecDeque<String>>>,
        last: Arc<Mutex<String>>,
        delay: Duration,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockCommandRunner {
        pub fn new<I, S>(outputs: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                outputs: Arc::new(Mutex::new(outputs.into_iter().map(Into::into).collect())),
                last: Arc::new(Mutex::new(String::new())),
                delay: Duration::ZERO,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        /// Sleep before answering (simulates a slow scan)
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, _command: &CommandSpec) -> String {
            *self.call_count.lock().unwrap() += 1;

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let next = self.outputs.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(output) = next {
                *last = output;
            }
            last.clone()
        }
    }
}
