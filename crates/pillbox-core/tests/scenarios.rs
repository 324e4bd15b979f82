//! End-to-end scenarios for the device core.
//!
//! Each test assembles a [`Device`] from a manual clock, recording outputs,
//! and a manual button, then walks it through a day the way the poll loop
//! would: submit, poll, move the clock, press the button.

#![allow(clippy::unwrap_used)]

use pillbox_core::clock::ManualClock;
use pillbox_core::device::Device;
use pillbox_core::hardware::{ManualButton, OutputWrite, RecordingOutputs};
use pillbox_types::{Indicator, Reminder, SubmitReminder};

struct Bench {
    device: Device,
    clock: ManualClock,
    outputs: RecordingOutputs,
    button: ManualButton,
}

impl Bench {
    fn at(hour: u32, minute: u32) -> Self {
        let clock = ManualClock::at(hour, minute);
        let outputs = RecordingOutputs::new();
        let button = ManualButton::new();
        let device = Device::new(
            Box::new(clock.clone()),
            Box::new(outputs.clone()),
            Box::new(button.clone()),
            false,
        );
        Self {
            device,
            clock,
            outputs,
            button,
        }
    }

    fn submit(&mut self, name: &str, slot: &str, hour: i32, minute: i32) -> Reminder {
        self.device.submit(SubmitReminder {
            name: name.to_owned(),
            slot: slot.to_owned(),
            hour,
            minute,
        })
    }

    /// Press, poll once, release.
    fn press_button(&mut self) -> bool {
        self.button.press();
        let summary = self.device.poll();
        self.button.release();
        summary.acknowledged
    }
}

#[test]
fn metformin_at_eight() {
    let mut bench = Bench::at(7, 59);
    let r = bench.submit("Metformin", "1", 8, 0);

    bench.device.poll();
    assert!(!bench.device.alert().is_active());

    bench.clock.set(8, 0);
    let summary = bench.device.poll();
    assert_eq!(summary.tick.fired, vec![r.id]);

    let writes = bench.outputs.writes();
    assert!(writes.contains(&OutputWrite::Tone(true)));
    assert!(writes.contains(&OutputWrite::Show {
        top: "Metformin".to_owned(),
        bottom: "Slot: 1".to_owned(),
    }));
    assert!(writes.contains(&OutputWrite::Indicator(Indicator::A, true)));
    assert!(!writes.contains(&OutputWrite::Indicator(Indicator::B, true)));
    assert!(bench.device.store().get(r.id).unwrap().triggered);

    // Nothing times out: many polls later the alert is still up.
    for _ in 0..100 {
        bench.device.poll();
    }
    assert!(bench.device.alert().is_active());

    bench.outputs.clear();
    assert!(bench.press_button());
    let writes = bench.outputs.writes();
    assert!(writes.contains(&OutputWrite::Tone(false)));
    assert!(writes.contains(&OutputWrite::Clear));
    assert!(writes.contains(&OutputWrite::Indicator(Indicator::A, false)));

    let status = bench.device.snapshot().alert;
    assert!(!status.active);
    assert!(!status.tone_on);
    assert!(!status.indicator_a);
    assert_eq!(status.display, None);
}

#[test]
fn two_reminders_share_a_minute() {
    let mut bench = Bench::at(9, 29);
    let first = bench.submit("Aspirin", "1", 9, 30);
    let second = bench.submit("Statin", "2", 9, 30);
    bench.device.poll();

    bench.clock.set(9, 30);
    let summary = bench.device.poll();
    assert_eq!(summary.tick.fired, vec![first.id, second.id]);

    let status = bench.device.snapshot().alert;
    assert!(status.active);
    assert!(status.indicator_a);
    assert!(status.indicator_b);
    assert_eq!(status.display.unwrap().top, "Statin");

    assert!(bench.press_button());
    let status = bench.device.snapshot().alert;
    assert!(!status.indicator_a);
    assert!(!status.indicator_b);

    // A second press with nothing active changes nothing.
    bench.outputs.clear();
    assert!(!bench.press_button());
    assert!(bench.outputs.writes().is_empty());
}

#[test]
fn unacknowledged_late_reminder_fires_again_next_day() {
    let mut bench = Bench::at(23, 58);
    let r = bench.submit("Night dose", "2", 23, 59);

    bench.clock.set(23, 59);
    assert_eq!(bench.device.poll().tick.fired, vec![r.id]);
    assert!(bench.device.alert().is_active());

    bench.clock.set(0, 0);
    let summary = bench.device.poll();
    assert!(summary.tick.daily_reset);
    assert!(!bench.device.store().get(r.id).unwrap().triggered);
    // Still waiting for the button from yesterday.
    assert!(bench.device.alert().is_active());

    assert!(bench.press_button());

    bench.clock.set(23, 59);
    assert_eq!(bench.device.poll().tick.fired, vec![r.id]);
    assert!(bench.device.alert().is_active());
}

#[test]
fn repeated_polls_in_one_minute_fire_once() {
    let mut bench = Bench::at(12, 0);
    bench.submit("Lunch", "1", 12, 0);

    assert_eq!(bench.device.poll().tick.fired.len(), 1);
    assert!(bench.press_button());
    for _ in 0..50 {
        assert!(bench.device.poll().tick.fired.is_empty());
    }
    assert!(!bench.device.alert().is_active());
}

#[test]
fn unknown_slot_and_out_of_range_fields() {
    let mut bench = Bench::at(10, 0);
    let odd = bench.submit("Eye drops", "3", 10, 0);
    let never = bench.submit("Never", "1", 24, 0);

    let summary = bench.device.poll();
    assert_eq!(summary.tick.fired, vec![odd.id]);
    assert!(!summary.tick.fired.contains(&never.id));

    let status = bench.device.snapshot().alert;
    assert!(status.active);
    assert!(status.tone_on);
    assert!(!status.indicator_a);
    assert!(!status.indicator_b);
    assert_eq!(status.display.unwrap().bottom, "Slot: 3");
}

#[test]
fn unsynchronized_clock_delays_firing() {
    let mut bench = Bench::at(6, 0);
    bench.clock.set_unavailable();
    let r = bench.submit("Thyroid", "1", 6, 0);

    for _ in 0..10 {
        assert!(bench.device.poll().tick.time.is_none());
    }
    assert!(!bench.device.store().get(r.id).unwrap().triggered);

    bench.clock.set(6, 0);
    assert_eq!(bench.device.poll().tick.fired, vec![r.id]);
}
