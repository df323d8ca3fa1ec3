//! Shutdown coordination for the bot's long-running tasks.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long tasks get to wind down before they are abandoned.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the cancellation token shared by the listener, event loop, and
/// scheduler, and joins their handles on shutdown.
#[derive(Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Track a spawned task so shutdown waits for it.
    pub fn track(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.handles.push((name, handle));
    }

    /// Cancel every task and wait up to `timeout` for them to finish.
    pub async fn shutdown(self, timeout: Duration) {
        self.token.cancel();
        info!(
            task_count = self.handles.len(),
            timeout_secs = timeout.as_secs(),
            "Waiting for tasks to complete"
        );

        let drain = async {
            for (name, handle) in self.handles {
                if let Err(e) = handle.await {
                    warn!(task = name, error = %e, "Task ended abnormally");
                }
            }
        };

        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!("Shutdown timed out after {timeout:?}, some tasks may still be running");
        }
    }
}
