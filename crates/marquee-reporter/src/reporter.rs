//! Periodic presence reporting.
//!
//! The reporter pings the registry once immediately and then on every
//! interval tick until it is stopped. The last successful count is
//! published on a watch channel; a failed report is logged and leaves the
//! previous count in place.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::PingClient;
use crate::identity::VisitorIdentity;

pub struct PresenceReporter;

impl PresenceReporter {
    /// Spawn the reporting loop on the current tokio runtime.
    pub fn start(client: PingClient, identity: VisitorIdentity, every: Duration) -> ReporterHandle {
        let (count_tx, count_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        info!(
            visitor = %identity.id,
            endpoint = client.endpoint(),
            every_secs = every.as_secs_f64(),
            "Starting presence reporter"
        );
        let task = tokio::spawn(report_loop(client, identity, every, count_tx, cancel.clone()));

        ReporterHandle {
            count_rx,
            cancel,
            task: Some(task),
        }
    }
}

/// Owns a running reporter. Dropping the handle stops the loop.
pub struct ReporterHandle {
    count_rx: watch::Receiver<Option<u64>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// Last count returned by the registry, `None` before the first success.
    pub fn count(&self) -> Option<u64> {
        *self.count_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.count_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the loop and wait for it to exit. A report still on the wire is
    /// abandoned and its result never published.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Presence reporter task failed");
            }
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn report_loop(
    client: PingClient,
    identity: VisitorIdentity,
    every: Duration,
    count_tx: watch::Sender<Option<u64>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Abandoning in-flight presence report");
                break;
            }
            result = client.ping(&identity) => result,
        };

        match result {
            Ok(count) => {
                debug!(visitor = %identity.id, count, "Presence reported");
                count_tx.send_replace(Some(count));
            }
            Err(e) => warn!(error = %e, "Presence report failed"),
        }
    }

    debug!("Presence reporter stopped");
}

#[cfg(test)]
mod tests;
