// Poll loop stop signal

use tokio::sync::watch;

/// Stop signal observed by the poll loop
///
/// A dropped [`ShutdownSender`] counts as a stop request, so a service that
/// goes away without calling `stop` does not leave its loop running.
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if a stop was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until a stop is requested
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

/// Requests the poll loop to stop
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_is_observed() {
        let (tx, mut token) = shutdown_channel();
        assert!(!token.is_shutdown());

        tx.shutdown();
        assert!(token.is_shutdown());
        token.wait().await;
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let (tx, mut token) = shutdown_channel();
        drop(tx);

        assert!(token.is_shutdown());
        token.wait().await;
    }

    #[test]
    fn test_shutdown_sent_before_wait() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();

        tokio_test::block_on(token.wait());
        assert!(token.is_shutdown());
    }
}
