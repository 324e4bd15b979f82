//! The device poll loop.
//!
//! This module provides [`run_device`], the top-level async function that
//! drives the device:
//!
//! - **Submissions**: at most one queued submission is applied per
//!   iteration, before that iteration's tick, and the stored reminder is
//!   sent back to whoever submitted it.
//! - **Polling**: one scheduler tick plus one button check per iteration.
//! - **Publishing**: a [`PollCallback`] sees the device after every poll.
//! - **Clean shutdown**: the loop exits when the shutdown flag flips.
//!
//! The HTTP layer never touches the device. It only talks to this loop
//! through the submission channel.

use std::time::Duration;

use pillbox_types::{Reminder, SubmitReminder};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::device::{Device, PollSummary};

/// Errors that can occur during the device run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The shutdown sender was dropped without signalling shutdown.
    #[error("shutdown signal lost")]
    ShutdownLost,
}

/// A reminder submission waiting for the loop, with its reply channel.
#[derive(Debug)]
pub struct Submission {
    /// The decoded request.
    pub request: SubmitReminder,
    /// Receives the stored reminder once the loop has applied it.
    pub respond_to: oneshot::Sender<Reminder>,
}

impl Submission {
    /// Pair a request with a fresh reply channel.
    pub fn new(request: SubmitReminder) -> (Self, oneshot::Receiver<Reminder>) {
        let (respond_to, reply) = oneshot::channel();
        (
            Self {
                request,
                respond_to,
            },
            reply,
        )
    }

    /// Store the request on `device` and reply with the stored reminder.
    ///
    /// A submission whose submitter has already given up (its reply
    /// receiver is gone) is dropped without being stored, so a request
    /// answered `503` never leaves a reminder behind. Returns the stored
    /// reminder, or `None` if the submission was abandoned.
    pub fn apply(self, device: &mut Device) -> Option<Reminder> {
        if self.respond_to.is_closed() {
            debug!(name = %self.request.name, "Dropping abandoned submission");
            return None;
        }
        let reminder = device.submit(self.request);
        if self.respond_to.send(reminder.clone()).is_err() {
            debug!("Submitter went away before the reply");
        }
        Some(reminder)
    }
}

/// Totals for one run of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Polls executed.
    pub polls: u64,
    /// Submissions applied.
    pub submissions: u64,
    /// Reminders fired.
    pub fired: u64,
    /// Alerts acknowledged.
    pub acknowledged: u64,
}

/// Callback invoked after each poll.
///
/// Implementations can use this to publish a snapshot for the API, etc.
pub trait PollCallback: Send {
    /// Called after a poll completes.
    fn on_poll(&mut self, summary: &PollSummary, device: &Device);
}

/// A no-op poll callback for testing.
pub struct NoOpCallback;

impl PollCallback for NoOpCallback {
    fn on_poll(&mut self, _summary: &PollSummary, _device: &Device) {}
}

/// Run the device loop until shutdown is requested.
///
/// # Arguments
///
/// * `device` - All device state
/// * `submissions` - Queue fed by the HTTP layer
/// * `callback` - Called after each poll
/// * `shutdown` - Flips to `true` to stop the loop
/// * `poll_interval` - Sleep between iterations
///
/// A closed submission queue is not fatal: the device keeps firing the
/// reminders it already has until shutdown.
///
/// # Errors
///
/// Returns [`RunnerError::ShutdownLost`] if the shutdown sender is dropped
/// while the loop is still running.
pub async fn run_device(
    device: &mut Device,
    submissions: &mut mpsc::Receiver<Submission>,
    callback: &mut dyn PollCallback,
    shutdown: &mut watch::Receiver<bool>,
    poll_interval: Duration,
) -> Result<RunSummary, RunnerError> {
    let mut totals = RunSummary::default();
    let mut queue_open = true;

    info!(
        poll_interval_ms = poll_interval.as_millis(),
        "Device loop starting"
    );

    loop {
        if *shutdown.borrow_and_update() {
            info!("Shutdown requested");
            break;
        }

        // --- Apply one submission ---
        if queue_open {
            match submissions.try_recv() {
                Ok(submission) => {
                    if submission.apply(device).is_some() {
                        totals.submissions = totals.submissions.saturating_add(1);
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    warn!("Submission queue closed, continuing without it");
                    queue_open = false;
                }
            }
        }

        // --- Tick and button ---
        let summary = device.poll();
        totals.polls = totals.polls.saturating_add(1);
        let fired = u64::try_from(summary.tick.fired.len()).unwrap_or(u64::MAX);
        totals.fired = totals.fired.saturating_add(fired);
        if summary.acknowledged {
            totals.acknowledged = totals.acknowledged.saturating_add(1);
        }

        // --- Notify callback ---
        callback.on_poll(&summary, device);

        // --- Sleep, waking early on shutdown ---
        tokio::select! {
            () = tokio::time::sleep(poll_interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    warn!("Shutdown sender dropped");
                    return Err(RunnerError::ShutdownLost);
                }
            }
        }
    }

    info!(
        polls = totals.polls,
        submissions = totals.submissions,
        fired = totals.fired,
        acknowledged = totals.acknowledged,
        "Device loop stopped"
    );
    Ok(totals)
}
