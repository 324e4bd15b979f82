//! The alert state machine.
//!
//! ```text
//!            raise(r)                       acknowledge()
//!   Idle ─────────────► Active ────────────────────────► Idle
//!                        │  ▲
//!                        └──┘ raise(r): outputs for r, state unchanged
//! ```
//!
//! There is exactly one alert lifecycle per device. Raising while already
//! active repeats the side effects for the new reminder (display text,
//! tone, its slot indicator) without restarting the activation clock, so
//! several indicators can be latched at once while a single acknowledgment
//! silences everything. There is no timeout: an alert lasts until the
//! button is pressed.

use std::time::Instant;

use pillbox_types::{AlertStatus, DisplayLines, Indicator, Reminder};
use tracing::{debug, info};

use crate::hardware::{AlertOutputs, ButtonInput};

/// Prefix for the display's second line.
const SLOT_PREFIX: &str = "Slot: ";

/// Text flashed when a submission is stored while idle.
pub const RECEIPT_TEXT: &str = "Reminder received";

/// Alert lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    /// No alert; button presses are ignored.
    Idle,
    /// Waiting for acknowledgment.
    Active {
        /// When the alert went active. Informational only.
        since: Instant,
    },
}

/// What [`AlertMachine::raise`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaiseOutcome {
    /// The machine went from Idle to Active.
    Activated,
    /// An alert was already active; outputs were updated for the new
    /// reminder.
    Reasserted,
}

/// Levels last written to each output, kept for the status API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OutputLevels {
    tone_on: bool,
    indicator_a: bool,
    indicator_b: bool,
    display: Option<DisplayLines>,
}

/// Owns the alert state and the outputs it drives.
pub struct AlertMachine {
    state: AlertState,
    outputs: Box<dyn AlertOutputs + Send>,
    levels: OutputLevels,
}

impl core::fmt::Debug for AlertMachine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AlertMachine")
            .field("state", &self.state)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

impl AlertMachine {
    /// Create an idle machine driving `outputs`.
    pub fn new(outputs: Box<dyn AlertOutputs + Send>) -> Self {
        Self {
            state: AlertState::Idle,
            outputs,
            levels: OutputLevels::default(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> AlertState {
        self.state
    }

    /// Whether an alert is waiting for acknowledgment.
    pub const fn is_active(&self) -> bool {
        matches!(self.state, AlertState::Active { .. })
    }

    /// Raise an alert for `reminder`.
    ///
    /// Shows the reminder's name and slot, drives the tone, and lights the
    /// slot's indicator (none for an unknown slot). If an alert is already
    /// active the activation time is kept.
    pub fn raise(&mut self, reminder: &Reminder) -> RaiseOutcome {
        let bottom = format!("{SLOT_PREFIX}{}", reminder.slot.label());
        self.show(&reminder.name, &bottom);

        self.outputs.set_tone(true);
        self.levels.tone_on = true;

        let outcome = match self.state {
            AlertState::Idle => {
                self.state = AlertState::Active {
                    since: Instant::now(),
                };
                RaiseOutcome::Activated
            }
            AlertState::Active { .. } => RaiseOutcome::Reasserted,
        };

        if let Some(indicator) = reminder.slot.indicator() {
            self.set_indicator(indicator, true);
        }

        info!(
            reminder = %reminder.id,
            name = %reminder.name,
            slot = %reminder.slot,
            ?outcome,
            "Alert raised"
        );
        outcome
    }

    /// Silence and clear everything and return to Idle.
    ///
    /// Both indicators are cleared whatever raised them. Returns `false`
    /// without touching any output when no alert is active.
    pub fn acknowledge(&mut self) -> bool {
        let AlertState::Active { since } = self.state else {
            return false;
        };

        self.outputs.set_tone(false);
        self.levels.tone_on = false;

        self.outputs.clear_display();
        self.levels.display = None;

        for indicator in Indicator::ALL {
            self.set_indicator(indicator, false);
        }

        self.state = AlertState::Idle;
        info!(
            active_for_secs = since.elapsed().as_secs(),
            "Alert acknowledged"
        );
        true
    }

    /// Acknowledge if active and the button reads pressed.
    ///
    /// The button is not read at all while idle.
    pub fn poll_button(&mut self, button: &mut dyn ButtonInput) -> bool {
        if !self.is_active() {
            return false;
        }
        if button.is_pressed() {
            return self.acknowledge();
        }
        false
    }

    /// Show a notice on the display if no alert owns it.
    ///
    /// Returns whether the notice was shown.
    pub fn show_notice(&mut self, top: &str, bottom: &str) -> bool {
        if self.is_active() {
            debug!(top, "Alert on screen, notice suppressed");
            return false;
        }
        self.show(top, bottom);
        true
    }

    /// Read-only view for snapshots.
    pub fn status(&self) -> AlertStatus {
        let active_for_secs = match self.state {
            AlertState::Active { since } => Some(since.elapsed().as_secs()),
            AlertState::Idle => None,
        };
        AlertStatus {
            active: self.is_active(),
            active_for_secs,
            tone_on: self.levels.tone_on,
            indicator_a: self.levels.indicator_a,
            indicator_b: self.levels.indicator_b,
            display: self.levels.display.clone(),
        }
    }

    fn show(&mut self, top: &str, bottom: &str) {
        self.outputs.show(top, bottom);
        self.levels.display = Some(DisplayLines {
            top: top.to_owned(),
            bottom: bottom.to_owned(),
        });
    }

    fn set_indicator(&mut self, indicator: Indicator, high: bool) {
        self.outputs.set_indicator(indicator, high);
        match indicator {
            Indicator::A => self.levels.indicator_a = high,
            Indicator::B => self.levels.indicator_b = high,
        }
    }
}
