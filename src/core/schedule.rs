use super::refresh::{Dashboard, RefreshOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Fixed period between automatic refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to a running periodic refresh task.
pub struct RefreshHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancels the task, abandoning any in-flight refresh, and waits for it.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Periodic refresh task ended abnormally");
        }
    }
}

/// Refreshes immediately and then every `every`, handing each outcome to
/// `on_outcome`, until the returned handle is cancelled.
pub fn spawn_periodic_refresh<F>(
    dashboard: Arc<Dashboard>,
    every: Duration,
    mut on_outcome: F,
) -> RefreshHandle
where
    F: FnMut(RefreshOutcome) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let task = tokio::spawn(async move {
        info!(interval_secs = every.as_secs(), "Periodic refresh started");
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        outcome = dashboard.refresh() => on_outcome(outcome),
                        _ = cancelled.cancelled() => break,
                    }
                }
                _ = cancelled.cancelled() => break,
            }
        }
        info!("Periodic refresh stopped");
    });

    RefreshHandle { token, task }
}
