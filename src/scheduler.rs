//! Self-rearming periodic refresh of the snapshot.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::sampler::Sampler;
use crate::snapshot::SnapshotStore;

/// Periodic sampling task: every interval the sampler runs and its result
/// replaces the snapshot.
///
/// The ticker is armed independently of the callback, so a slow sample
/// delays at most its own tick, and callbacks never overlap (single
/// task). Client traffic never drives sampling; the two only meet at the
/// snapshot store.
pub struct RefreshScheduler {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Spawn the refresh task. The first tick fires one full interval
    /// after start; the caller seeds the store with an initial sample.
    pub fn start(interval: Duration, sampler: Arc<Sampler>, store: SnapshotStore) -> Self {
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let reading = sampler.sample().await;
                        debug!("snapshot refreshed: {}", reading);
                        store.set(reading).await;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("refresh task stopped");
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Cancel the pending tick and wait for the task to finish. Safe to
    /// call more than once.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}
