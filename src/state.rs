//! State shared between the refresh, countdown and render tasks.
//!
//! The snapshot slot is a `watch` channel holding an `Arc<Snapshot>`: the
//! refresher replaces the whole value, readers clone the `Arc`. The channel's
//! "changed" bit doubles as the redraw flag, so it can never be observed
//! ahead of the value it announces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::snapshot::Snapshot;

/// Creates the slot, initially holding an empty (not loaded) snapshot.
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(Arc::new(Snapshot::empty()));
    (SnapshotPublisher { tx }, SnapshotReader { rx })
}

/// Write half, owned by the refresh task.
pub struct SnapshotPublisher {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl SnapshotPublisher {
    /// Replaces the published snapshot and marks it changed for every reader.
    pub fn publish(&self, snapshot: Snapshot) {
        // send_replace keeps working when every reader is gone.
        self.tx.send_replace(Arc::new(snapshot));
    }
}

/// Read half, handed to the renderer and input handler.
#[derive(Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotReader {
    /// The snapshot as of now. Never a mix of two refresh cycles.
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.rx.borrow())
    }

    /// True once per newly published snapshot; clears the flag.
    pub fn take_changed(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            // Publisher gone: nothing new will ever arrive.
            Ok(false) | Err(_) => false,
        }
    }

    /// Waits until a snapshot newer than the last seen one is published.
    /// Returns `false` if the publisher was dropped.
    #[cfg(test)]
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Seconds until the next refresh, for display only.
#[derive(Clone, Default)]
pub struct Countdown(Arc<AtomicU64>);

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self, interval: Duration) {
        self.0.store(interval.as_secs(), Ordering::Release);
    }

    /// Decrements by one, stopping at zero.
    pub fn tick(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |secs| secs.checked_sub(1));
    }

    pub fn remaining(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}
