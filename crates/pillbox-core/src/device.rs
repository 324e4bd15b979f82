//! The device context.
//!
//! [`Device`] owns every piece of mutable device state: the reminder store,
//! the scheduler's dedupe memory, the alert machine with its outputs, and
//! the input seams. The run loop holds it by `&mut` and nothing else ever
//! sees it, so no field needs a lock.

use pillbox_types::{DeviceSnapshot, Reminder, Slot, SubmitReminder, WallTime};
use tracing::info;

use crate::alert::{AlertMachine, RECEIPT_TEXT};
use crate::clock::ClockSource;
use crate::hardware::{AlertOutputs, ButtonInput};
use crate::scheduler::{Scheduler, TickSummary};
use crate::store::ReminderStore;

/// Result of one [`Device::poll`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// The scheduler tick.
    pub tick: TickSummary,
    /// Whether the button acknowledged an alert.
    pub acknowledged: bool,
}

/// All device state, owned in one place.
pub struct Device {
    clock: Box<dyn ClockSource + Send>,
    button: Box<dyn ButtonInput + Send>,
    store: ReminderStore,
    scheduler: Scheduler,
    alert: AlertMachine,
    /// Flash a notice when a submission is stored while idle.
    show_receipt: bool,
    /// Polls since start-up.
    polls: u64,
    /// Most recent clock reading seen by the scheduler.
    last_reading: Option<WallTime>,
}

impl core::fmt::Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("reminders", &self.store.len())
            .field("scheduler", &self.scheduler)
            .field("alert", &self.alert)
            .field("polls", &self.polls)
            .field("last_reading", &self.last_reading)
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Assemble a device with an empty store and an idle alert.
    pub fn new(
        clock: Box<dyn ClockSource + Send>,
        outputs: Box<dyn AlertOutputs + Send>,
        button: Box<dyn ButtonInput + Send>,
        show_receipt: bool,
    ) -> Self {
        Self {
            clock,
            button,
            store: ReminderStore::new(),
            scheduler: Scheduler::new(),
            alert: AlertMachine::new(outputs),
            show_receipt,
            polls: 0,
            last_reading: None,
        }
    }

    /// Store a submitted reminder and return it.
    ///
    /// The slot text is kept verbatim when it is not a known slot. If
    /// enabled and no alert is showing, a receipt notice replaces the
    /// display contents; it stays until the next alert or notice.
    pub fn submit(&mut self, request: SubmitReminder) -> Reminder {
        let SubmitReminder {
            name,
            slot,
            hour,
            minute,
        } = request;
        let reminder = self.store.submit(name, Slot::from(slot), hour, minute);

        info!(
            reminder = %reminder.id,
            name = %reminder.name,
            slot = %reminder.slot,
            hour = reminder.hour,
            minute = reminder.minute,
            "Reminder stored"
        );

        if self.show_receipt {
            self.alert.show_notice(RECEIPT_TEXT, "");
        }
        reminder
    }

    /// One scheduler tick followed by one button check.
    pub fn poll(&mut self) -> PollSummary {
        let tick = self
            .scheduler
            .tick(self.clock.as_ref(), &mut self.store, &mut self.alert);
        if tick.time.is_some() {
            self.last_reading = tick.time;
        }
        let acknowledged = self.alert.poll_button(self.button.as_mut());
        self.polls = self.polls.saturating_add(1);
        PollSummary { tick, acknowledged }
    }

    /// Owned copy of the state the API serves.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            reminders: self.store.to_vec(),
            alert: self.alert.status(),
            last_reading: self.last_reading,
            polls: self.polls,
        }
    }

    /// The reminder store.
    pub const fn store(&self) -> &ReminderStore {
        &self.store
    }

    /// The alert machine.
    pub const fn alert(&self) -> &AlertMachine {
        &self.alert
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pillbox_types::Slot;

    use super::*;
    use crate::clock::ManualClock;
    use crate::hardware::{ManualButton, OutputWrite, RecordingOutputs};

    fn request(name: &str, slot: &str, hour: i32, minute: i32) -> SubmitReminder {
        SubmitReminder {
            name: name.to_owned(),
            slot: slot.to_owned(),
            hour,
            minute,
        }
    }

    fn device(
        clock: &ManualClock,
        show_receipt: bool,
    ) -> (Device, RecordingOutputs, ManualButton) {
        let recorder = RecordingOutputs::new();
        let button = ManualButton::new();
        let device = Device::new(
            Box::new(clock.clone()),
            Box::new(recorder.clone()),
            Box::new(button.clone()),
            show_receipt,
        );
        (device, recorder, button)
    }

    #[test]
    fn submit_parses_slot_and_stores() {
        let clock = ManualClock::new();
        let (mut device, _, _) = device(&clock, false);

        let one = device.submit(request("A", "1", 8, 0));
        let odd = device.submit(request("B", "left", 8, 0));
        assert_eq!(one.slot, Slot::One);
        assert_eq!(odd.slot, Slot::Unknown("left".to_owned()));
        assert_eq!(device.store().len(), 2);
        assert!(!device.store().get(one.id).unwrap().triggered);
    }

    #[test]
    fn receipt_shown_only_when_idle() {
        let clock = ManualClock::at(8, 0);
        let (mut device, recorder, _) = device(&clock, true);

        device.submit(request("Metformin", "1", 8, 0));
        assert!(recorder.writes().contains(&OutputWrite::Show {
            top: RECEIPT_TEXT.to_owned(),
            bottom: String::new(),
        }));

        device.poll();
        recorder.clear();
        device.submit(request("Later", "2", 9, 0));
        assert!(recorder.writes().is_empty());
        assert_eq!(device.snapshot().alert.display.unwrap().top, "Metformin");
    }

    #[test]
    fn receipt_disabled() {
        let clock = ManualClock::new();
        let (mut device, recorder, _) = device(&clock, false);
        device.submit(request("A", "1", 8, 0));
        assert!(recorder.writes().is_empty());
    }

    #[test]
    fn poll_ticks_then_checks_button() {
        let clock = ManualClock::at(8, 0);
        let (mut device, _, button) = device(&clock, false);
        device.submit(request("Metformin", "1", 8, 0));

        // Held before the alert fires: the same poll raises and then
        // acknowledges.
        button.press();
        let summary = device.poll();
        assert_eq!(summary.tick.fired.len(), 1);
        assert!(summary.acknowledged);
        assert!(!device.alert().is_active());
    }

    #[test]
    fn snapshot_tracks_polls_and_last_reading() {
        let clock = ManualClock::new();
        let (mut device, _, _) = device(&clock, false);

        device.poll();
        assert_eq!(device.snapshot().last_reading, None);

        clock.set(12, 34);
        device.poll();
        clock.set_unavailable();
        device.poll();

        let snapshot = device.snapshot();
        assert_eq!(snapshot.polls, 3);
        assert_eq!(snapshot.last_reading, Some(WallTime::new(12, 34)));
    }
}
