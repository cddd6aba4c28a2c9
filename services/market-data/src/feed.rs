//! Single-producer snapshot publish point
//!
//! Built on `tokio::sync::watch`: readers always see the latest snapshot
//! and never a partial one. A publish replaces the previous snapshot
//! wholesale. After `close`, publishing fails and waiting readers wake
//! with `None`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::FeedError;
use crate::snapshot::Snapshot;

/// Publish point for one dataset.
pub struct SnapshotFeed<T> {
    name: String,
    sender: Mutex<Option<watch::Sender<Snapshot<T>>>>,
    /// Kept so `latest` works after close.
    receiver: watch::Receiver<Snapshot<T>>,
    published: AtomicU64,
}

impl<T> SnapshotFeed<T> {
    pub fn new(name: impl Into<String>, initial: Snapshot<T>) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            name: name.into(),
            sender: Mutex::new(Some(tx)),
            receiver: rx,
            published: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the current snapshot. Versions must strictly increase.
    pub fn publish(&self, snapshot: Snapshot<T>) -> Result<u64, FeedError> {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let Some(tx) = guard.as_ref() else {
            return Err(FeedError::Closed {
                feed: self.name.clone(),
            });
        };

        let current = tx.borrow().version();
        let offered = snapshot.version();
        if offered <= current {
            return Err(FeedError::StaleVersion {
                feed: self.name.clone(),
                current,
                offered,
            });
        }

        tx.send_replace(snapshot);
        self.published.fetch_add(1, Ordering::Relaxed);
        debug!(feed = %self.name, version = offered, "Published snapshot");
        Ok(offered)
    }

    /// Current snapshot.
    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> FeedReader<T> {
        FeedReader {
            rx: self.receiver.clone(),
        }
    }

    /// Stop accepting publishes. Idempotent.
    pub fn close(&self) {
        let mut guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            info!(feed = %self.name, "Feed closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .map(|g| g.is_none())
            .unwrap_or(true)
    }

    /// Number of successful publishes.
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

/// Read-only view of a feed.
pub struct FeedReader<T> {
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T> Clone for FeedReader<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> FeedReader<T> {
    pub fn latest(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// Whether a snapshot arrived since the last `changed`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next publish. `None` once the feed is closed.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> SnapshotFeed<u32> {
        SnapshotFeed::new("numbers", Snapshot::initial(vec![1, 2, 3]))
    }

    #[test]
    fn test_publish_replaces_latest() {
        let feed = feed();
        let reader = feed.subscribe();
        let next = feed.latest().with_replaced(vec![(0, 10)]);

        assert_eq!(feed.publish(next).unwrap(), 1);
        assert_eq!(reader.latest().version(), 1);
        assert_eq!(reader.latest().get(0), Some(&10));
        assert_eq!(feed.published_count(), 1);
    }

    #[test]
    fn test_stale_version_rejected() {
        let feed = feed();
        let stale = Snapshot::initial(vec![9]);
        assert!(matches!(
            feed.publish(stale),
            Err(FeedError::StaleVersion { current: 0, offered: 0, .. })
        ));
    }

    #[test]
    fn test_closed_feed_rejects_publish() {
        let feed = feed();
        feed.close();
        feed.close();
        assert!(feed.is_closed());

        let next = feed.latest().with_replaced(vec![(1, 20)]);
        assert!(matches!(feed.publish(next), Err(FeedError::Closed { .. })));
        assert_eq!(feed.latest().version(), 0);
    }

    #[tokio::test]
    async fn test_reader_wakes_on_publish_and_close() {
        let feed = feed();
        let mut reader = feed.subscribe();
        assert!(!reader.has_changed());

        feed.publish(feed.latest().with_replaced(vec![(2, 30)])).unwrap();
        assert!(reader.has_changed());
        let snap = reader.changed().await.unwrap();
        assert_eq!(snap.get(2), Some(&30));

        feed.close();
        assert!(reader.changed().await.is_none());
    }
}
