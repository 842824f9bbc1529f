//! Background expiry sweeper.
//!
//! A recurring timer that evicts expired messages from the live
//! conversation store. Started once when the shell mounts and cancelled on
//! teardown via the returned handle.

use super::ConversationStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Cancellation handle for the background sweep task.
///
/// Dropping the handle stops the sweeper.
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Default sweep period: one second.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    /// Spawns the sweep loop over the shared store.
    ///
    /// Each tick applies `sweep_expired(now)` and persists only when the
    /// log changed. Ticks are serialized with every other store mutation
    /// through the shared lock, so a tick can interleave with, but never
    /// preempt, an in-flight send.
    pub fn spawn(store: Arc<Mutex<ConversationStore>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;
            tracing::debug!(target: "sweeper", period_ms = period.as_millis() as u64, "sweeper started");

            loop {
                ticker.tick().await;
                let mut store = store.lock().await;
                store.sweep(Utc::now()).await;
            }
        });

        Self { handle }
    }

    /// Stops the sweep loop.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
