//! Graceful shutdown via a shared `CancellationToken`.
//!
//! The HTTP listener, the chat relay and every socket session watch the same
//! token; cancelling it stops all three.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Wait this long for tasks to finish when no timeout is given.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the server-wide cancellation token.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with a fresh token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A clone of the token for a task to watch.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal every task to stop.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the token, then wait up to `timeout` for `handles` to finish.
    pub async fn graceful_shutdown(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        self.shutdown();
        info!(
            task_count = handles.len(),
            timeout_secs = timeout.as_secs(),
            "waiting for tasks to finish"
        );
        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            warn!(?timeout, "shutdown timed out, abandoning remaining tasks");
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_logging::capture_logs;

    #[test]
    fn starts_running() {
        assert!(!ShutdownCoordinator::new().is_shutting_down());
    }

    #[test]
    fn shutdown_cancels_every_token() {
        let coord = ShutdownCoordinator::default();
        let tokens = [coord.token(), coord.token()];
        coord.shutdown();
        coord.shutdown();
        assert!(coord.is_shutting_down());
        assert!(tokens.iter().all(CancellationToken::is_cancelled));
    }

    #[tokio::test]
    async fn graceful_shutdown_waits_for_tasks() {
        let coord = ShutdownCoordinator::new();
        let token = coord.token();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            token.cancelled().await;
            let _ = tx.send("stopped");
        });

        coord.graceful_shutdown(vec![handle], None).await;
        assert_eq!(rx.await.unwrap(), "stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_shutdown_gives_up_after_timeout() {
        let (logs, _guard) = capture_logs();
        let coord = ShutdownCoordinator::new();
        let stuck = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        });

        coord
            .graceful_shutdown(vec![stuck], Some(Duration::from_millis(100)))
            .await;
        assert!(logs.has_event(tracing::Level::WARN, "shutdown timed out"));
    }
}
