//! Shared application state for the HTTP API.
//!
//! [`AppState`] holds the sending half of the submission queue and the
//! snapshot the device loop republishes after every poll.

use std::sync::Arc;
use std::time::Duration;

use pillbox_core::runner::Submission;
use pillbox_types::DeviceSnapshot;
use tokio::sync::{RwLock, mpsc};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Queue into the device loop.
    pub submissions: mpsc::Sender<Submission>,
    /// Latest device snapshot (updated each poll).
    pub snapshot: Arc<RwLock<DeviceSnapshot>>,
    /// How long a submission may wait for the loop before the request
    /// fails.
    pub submit_timeout: Duration,
}

impl AppState {
    /// Create a state with an empty snapshot.
    pub fn new(submissions: mpsc::Sender<Submission>, submit_timeout: Duration) -> Self {
        Self {
            submissions,
            snapshot: Arc::new(RwLock::new(DeviceSnapshot::default())),
            submit_timeout,
        }
    }

    /// Handle to the snapshot for the publisher side.
    pub fn snapshot_handle(&self) -> Arc<RwLock<DeviceSnapshot>> {
        Arc::clone(&self.snapshot)
    }
}
