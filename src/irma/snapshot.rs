//! Latest-value snapshot channels for read-only collaborators.
//!
//! The scheme configuration and the wallet are owned elsewhere; this crate
//! only ever reads whatever value is current when a fold step runs.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot source closed before publishing a value")]
    Closed,
}

/// Writer side: publishes new snapshots.
pub struct SnapshotStore<T> {
    sender: watch::Sender<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> SnapshotStore<T> {
    /// A store with no value yet; readers wait for the first publish.
    pub fn empty() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Some(Arc::new(initial)));
        Self { sender }
    }

    pub fn publish(&self, value: T) {
        self.sender.send_replace(Some(Arc::new(value)));
    }

    pub fn subscribe(&self) -> Snapshot<T> {
        Snapshot {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Reader side: yields the latest published snapshot.
pub struct Snapshot<T> {
    receiver: watch::Receiver<Option<Arc<T>>>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Snapshot<T> {
    /// A snapshot pinned to one value, with no store behind it.
    pub fn fixed(value: T) -> Self {
        let (_, receiver) = watch::channel(Some(Arc::new(value)));
        Self { receiver }
    }

    /// The first currently-available value.
    ///
    /// Returns immediately once anything has been published; never waits for
    /// a newer value than the one already present.
    pub async fn current(&self) -> Result<Arc<T>, SnapshotError> {
        let mut receiver = self.receiver.clone();
        let guard = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SnapshotError::Closed)?;
        guard.clone().ok_or(SnapshotError::Closed)
    }
}
