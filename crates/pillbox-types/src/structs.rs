//! Core record types shared between the device loop and the status API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Slot;
use crate::ids::ReminderId;

// ---------------------------------------------------------------------------
// WallTime
// ---------------------------------------------------------------------------

/// A local wall-clock reading at minute resolution.
///
/// Produced by the clock source; hour is in `0..24` and minute in `0..60`
/// when it comes from a real clock. Reminder targets are compared against
/// it with [`WallTime::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WallTime {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Minute of hour (0-59).
    pub minute: u32,
}

impl WallTime {
    /// Create a reading from an hour and minute.
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// True at local midnight (00:00), the minute of the daily reset.
    pub const fn is_midnight(self) -> bool {
        self.hour == 0 && self.minute == 0
    }

    /// Compare against a reminder's signed target fields.
    ///
    /// Out-of-range targets (negative, hour >= 24, minute >= 60) never match.
    pub fn matches(self, hour: i32, minute: i32) -> bool {
        i64::from(self.hour) == i64::from(hour) && i64::from(self.minute) == i64::from(minute)
    }
}

impl core::fmt::Display for WallTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

// ---------------------------------------------------------------------------
// Reminder
// ---------------------------------------------------------------------------

/// One scheduled alert.
///
/// Created by a submission with `triggered = false`, flagged by the
/// scheduler when it fires, and cleared again by the midnight reset. The
/// daily reset is the only recurrence mechanism: a reminder fires at most
/// once per day, every day, for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Reminder {
    /// Identifier assigned at submission.
    pub id: ReminderId,
    /// Display label (first line of the alert screen).
    pub name: String,
    /// Target compartment.
    #[ts(type = "string")]
    pub slot: Slot,
    /// Target hour. Not range-checked.
    pub hour: i32,
    /// Target minute. Not range-checked.
    pub minute: i32,
    /// Whether this reminder already fired today.
    pub triggered: bool,
    /// When the reminder was submitted.
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Build a fresh, untriggered reminder.
    pub fn new(name: impl Into<String>, slot: Slot, hour: i32, minute: i32) -> Self {
        Self {
            id: ReminderId::new(),
            name: name.into(),
            slot,
            hour,
            minute,
            triggered: false,
            created_at: Utc::now(),
        }
    }

    /// True if this reminder has not fired today and targets `time`.
    pub fn is_due_at(&self, time: WallTime) -> bool {
        !self.triggered && time.matches(self.hour, self.minute)
    }
}

// ---------------------------------------------------------------------------
// Submission request
// ---------------------------------------------------------------------------

/// A validated request to store a new reminder.
///
/// The HTTP layer builds this once all four parameters are present and the
/// time fields parse as integers; the device loop turns it into a
/// [`Reminder`]. The slot stays as raw text until the store parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubmitReminder {
    /// Display label.
    pub name: String,
    /// Submitted slot label (`"1"`, `"2"`, or anything else).
    pub slot: String,
    /// Target hour, unchecked.
    pub hour: i32,
    /// Target minute, unchecked.
    pub minute: i32,
}

// ---------------------------------------------------------------------------
// Alert status
// ---------------------------------------------------------------------------

/// The two lines currently shown on the character display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DisplayLines {
    /// First line.
    pub top: String,
    /// Second line.
    pub bottom: String,
}

/// Read-only view of the alert state machine and its outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AlertStatus {
    /// Whether an alert is waiting for acknowledgment.
    pub active: bool,
    /// Seconds since the alert was raised, when active.
    pub active_for_secs: Option<u64>,
    /// Whether the tone output is driven.
    pub tone_on: bool,
    /// Level last written to indicator A.
    pub indicator_a: bool,
    /// Level last written to indicator B.
    pub indicator_b: bool,
    /// Text on the display, `None` when cleared.
    pub display: Option<DisplayLines>,
}

// ---------------------------------------------------------------------------
// Device snapshot
// ---------------------------------------------------------------------------

/// Projection of the whole device published after each loop iteration.
///
/// The HTTP status endpoints serve this snapshot so they never touch the
/// state owned by the device loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeviceSnapshot {
    /// All stored reminders in submission order.
    pub reminders: Vec<Reminder>,
    /// Current alert status.
    pub alert: AlertStatus,
    /// Most recent clock reading, `None` until the clock is available.
    pub last_reading: Option<WallTime>,
    /// Number of loop iterations completed.
    pub polls: u64,
}
