//! Cancellable background pollers.
//!
//! Each poller is returned as a [`PollHandle`] that the owner cancels
//! explicitly at teardown. Dropping the handle also aborts the task, so an
//! orphaned timer can never keep probing a stale chain.

use crate::WalletSession;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// How often the active chain's endpoint is probed.
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// How often prices are refreshed while a wallet is connected.
pub const PRICE_POLL_INTERVAL: Duration = Duration::from_secs(600);

/// Handle to a background polling task.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Stops the poller. Safe to call more than once.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// True once the task has stopped running.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn spawn_interval<F, Fut>(period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    PollHandle::new(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            tick().await;
        }
    }))
}

impl WalletSession {
    /// Starts the network-health poller. Probes the active (or default)
    /// chain whether or not a wallet is connected.
    pub fn spawn_health_poller(&self) -> PollHandle {
        let session = self.clone();
        spawn_interval(HEALTH_POLL_INTERVAL, move || {
            let session = session.clone();
            async move {
                session.refresh_network_health().await;
            }
        })
    }

    /// Starts the price poller. Refreshing is a no-op while disconnected,
    /// so the poller is safe to keep running across sessions.
    pub fn spawn_price_poller(&self) -> PollHandle {
        let session = self.clone();
        spawn_interval(PRICE_POLL_INTERVAL, move || {
            let session = session.clone();
            async move {
                session.refresh_prices().await;
            }
        })
    }
}
