//! The shared "current reading" slot.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::reading::Reading;

/// The single latest reading, shared between the refresh task and every
/// client worker. All access goes through the lock; readers get a copy,
/// the newest write wins, and no reader ever observes a partial record.
#[derive(Clone)]
pub struct SnapshotStore {
    current: Arc<RwLock<Reading>>,
}

impl SnapshotStore {
    /// Seed the store. Startup takes a real initial sample before the
    /// server accepts connections.
    pub fn new(initial: Reading) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
        }
    }

    /// Copy of the current reading.
    pub async fn get(&self) -> Reading {
        *self.current.read().await
    }

    /// Replace the current reading.
    pub async fn set(&self, reading: Reading) {
        *self.current.write().await = reading;
    }
}
