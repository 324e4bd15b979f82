//! Poll callback that republishes the device snapshot for the API.

use std::sync::Arc;

use pillbox_core::device::{Device, PollSummary};
use pillbox_core::runner::PollCallback;
use pillbox_types::DeviceSnapshot;
use tokio::sync::RwLock;
use tracing::debug;

/// Callback that bridges the poll loop to the HTTP API.
pub struct SnapshotCallback {
    snapshot: Arc<RwLock<DeviceSnapshot>>,
    /// Polls skipped because a reader held the lock.
    skipped: u64,
}

impl SnapshotCallback {
    /// Create a callback publishing into `snapshot`.
    pub const fn new(snapshot: Arc<RwLock<DeviceSnapshot>>) -> Self {
        Self {
            snapshot,
            skipped: 0,
        }
    }

    /// Polls whose snapshot was not published.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl PollCallback for SnapshotCallback {
    fn on_poll(&mut self, summary: &PollSummary, device: &Device) {
        if !summary.tick.fired.is_empty() || summary.acknowledged {
            debug!(
                fired = summary.tick.fired.len(),
                acknowledged = summary.acknowledged,
                "Publishing state change"
            );
        }

        // try_write keeps the loop from waiting on a slow reader; the next
        // poll publishes again.
        if let Ok(mut snap) = self.snapshot.try_write() {
            *snap = device.snapshot();
        } else {
            self.skipped = self.skipped.saturating_add(1);
        }
    }
}
