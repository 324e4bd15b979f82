//! Once-per-minute reminder matching and the midnight reset.
//!
//! Each tick reads the clock once. At 00:00 every `triggered` flag is
//! cleared, on every tick of that minute. Matching against the store runs
//! at most once per distinct minute value: the scheduler remembers the
//! last minute it processed and skips the store until the reading changes.
//!
//! Only the minute is remembered, not the hour. A clock that jumps from
//! 10:05 straight to 11:05 between two ticks will not be matched a second
//! time; at a sub-second poll interval that cannot happen with a clock
//! that moves forward normally.

use pillbox_types::{ReminderId, WallTime};
use tracing::{debug, info};

use crate::alert::AlertMachine;
use crate::clock::ClockSource;
use crate::store::ReminderStore;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The clock reading, or `None` if the clock was unavailable.
    pub time: Option<WallTime>,
    /// Whether the midnight reset ran.
    pub daily_reset: bool,
    /// Whether this tick matched the store (first tick of a new minute).
    pub matched: bool,
    /// Reminders fired this tick, in store order.
    pub fired: Vec<ReminderId>,
}

/// Drives reminders from the store into the alert machine.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Minute processed by the last matching pass. `None` never equals a
    /// real minute, so the first reading always matches.
    last_minute: Option<u32>,
}

impl Scheduler {
    /// Create a scheduler that has not processed any minute yet.
    pub const fn new() -> Self {
        Self { last_minute: None }
    }

    /// Minute of the last matching pass.
    pub const fn last_minute(&self) -> Option<u32> {
        self.last_minute
    }

    /// Run one tick.
    ///
    /// 1. Read the clock; stop here if it has no reading.
    /// 2. At 00:00, reset every reminder's `triggered` flag.
    /// 3. If the minute differs from the last processed one, raise an
    ///    alert for each due reminder in store order and mark it
    ///    triggered, then remember the minute.
    pub fn tick(
        &mut self,
        clock: &dyn ClockSource,
        store: &mut ReminderStore,
        alert: &mut AlertMachine,
    ) -> TickSummary {
        let Some(time) = clock.now() else {
            debug!("Clock unavailable, skipping tick");
            return TickSummary::default();
        };

        let mut summary = TickSummary {
            time: Some(time),
            ..TickSummary::default()
        };

        if time.is_midnight() {
            let cleared = store.reset_daily();
            summary.daily_reset = true;
            if cleared > 0 {
                info!(cleared, "Daily reset");
            }
        }

        if self.last_minute == Some(time.minute) {
            return summary;
        }

        summary.matched = true;
        for reminder in store.due_at_mut(time) {
            alert.raise(reminder);
            reminder.triggered = true;
            summary.fired.push(reminder.id);
        }
        self.last_minute = Some(time.minute);

        if !summary.fired.is_empty() {
            info!(%time, fired = summary.fired.len(), "Reminders fired");
        }
        summary
    }
}
