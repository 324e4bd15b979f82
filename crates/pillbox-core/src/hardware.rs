//! Hardware seams between the alert state machine and the physical device.
//!
//! The state machine talks to [`AlertOutputs`] and polls a [`ButtonInput`].
//! [`PinOutputs`] and [`PinButton`] implement those seams over the
//! `embedded-hal` 1.0 traits, so any HAL that provides a PWM channel and
//! GPIO pins can drive the appliance. The character display has no
//! `embedded-hal` trait and gets its own small [`TextDisplay`] trait.
//!
//! Output writes are assumed to succeed. When a backend reports an error it
//! is logged and the state machine carries on.
//!
//! [`RecordingOutputs`] and [`ManualButton`] are in-memory stand-ins for
//! tests and simulation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use pillbox_types::Indicator;
use tracing::warn;

/// Write-only actuation outputs driven by the alert state machine.
pub trait AlertOutputs {
    /// Drive the tone at its fixed level, or silence it.
    fn set_tone(&mut self, on: bool);

    /// Set one slot indicator high or low.
    fn set_indicator(&mut self, indicator: Indicator, high: bool);

    /// Replace the display content with two lines.
    fn show(&mut self, top: &str, bottom: &str);

    /// Blank the display.
    fn clear_display(&mut self);
}

/// A polled acknowledge button.
pub trait ButtonInput {
    /// Whether the button currently reads as pressed.
    fn is_pressed(&mut self) -> bool;
}

/// A two-line character display (16x2 LCD or similar).
pub trait TextDisplay {
    /// Error reported by the display driver.
    type Error: core::fmt::Debug;

    /// Blank the display and home the cursor.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Write `text` at the start of `row` (0 = top).
    fn write_line(&mut self, row: u8, text: &str) -> Result<(), Self::Error>;
}

// ---------------------------------------------------------------------------
// embedded-hal backed outputs
// ---------------------------------------------------------------------------

/// [`AlertOutputs`] over a PWM tone channel, two GPIO indicators, and a
/// character display.
#[derive(Debug)]
pub struct PinOutputs<T, A, B, D> {
    tone: T,
    indicator_a: A,
    indicator_b: B,
    display: D,
    /// Duty cycle written when the tone is on.
    duty_percent: u8,
    /// Display width; longer lines are cut.
    columns: usize,
}

impl<T, A, B, D> PinOutputs<T, A, B, D>
where
    T: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    D: TextDisplay,
{
    /// Bundle the outputs. The tone is silenced and both indicators driven
    /// low so the device starts in a known state.
    pub fn new(
        tone: T,
        indicator_a: A,
        indicator_b: B,
        display: D,
        duty_percent: u8,
        columns: usize,
    ) -> Self {
        let mut outputs = Self {
            tone,
            indicator_a,
            indicator_b,
            display,
            duty_percent,
            columns,
        };
        outputs.set_tone(false);
        outputs.set_indicator(Indicator::A, false);
        outputs.set_indicator(Indicator::B, false);
        outputs
    }

    /// Release the underlying drivers.
    pub fn into_parts(self) -> (T, A, B, D) {
        (self.tone, self.indicator_a, self.indicator_b, self.display)
    }

    fn fit(&self, text: &str) -> String {
        text.chars().take(self.columns).collect()
    }
}

impl<T, A, B, D> AlertOutputs for PinOutputs<T, A, B, D>
where
    T: SetDutyCycle,
    A: OutputPin,
    B: OutputPin,
    D: TextDisplay,
{
    fn set_tone(&mut self, on: bool) {
        let result = if on {
            self.tone.set_duty_cycle_percent(self.duty_percent)
        } else {
            self.tone.set_duty_cycle_fully_off()
        };
        if let Err(e) = result {
            warn!(error = ?e, on, "tone write failed");
        }
    }

    fn set_indicator(&mut self, indicator: Indicator, high: bool) {
        let state = PinState::from(high);
        let result = match indicator {
            Indicator::A => self.indicator_a.set_state(state).map_err(|e| format!("{e:?}")),
            Indicator::B => self.indicator_b.set_state(state).map_err(|e| format!("{e:?}")),
        };
        if let Err(error) = result {
            warn!(?indicator, high, %error, "indicator write failed");
        }
    }

    fn show(&mut self, top: &str, bottom: &str) {
        let top = self.fit(top);
        let bottom = self.fit(bottom);
        let result = self
            .display
            .clear()
            .and_then(|()| self.display.write_line(0, &top))
            .and_then(|()| self.display.write_line(1, &bottom));
        if let Err(e) = result {
            warn!(error = ?e, "display write failed");
        }
    }

    fn clear_display(&mut self) {
        if let Err(e) = self.display.clear() {
            warn!(error = ?e, "display clear failed");
        }
    }
}

/// [`ButtonInput`] over a GPIO input pin.
#[derive(Debug)]
pub struct PinButton<P> {
    pin: P,
    /// Pressed reads low (pull-up wiring, button to ground).
    active_low: bool,
}

impl<P: InputPin> PinButton<P> {
    /// Wrap a pin. `active_low` is true for pull-up wiring.
    pub const fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }
}

impl<P: InputPin> ButtonInput for PinButton<P> {
    fn is_pressed(&mut self) -> bool {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        match level {
            Ok(pressed) => pressed,
            Err(e) => {
                warn!(error = ?e, "button read failed, treating as released");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory stand-ins
// ---------------------------------------------------------------------------

/// One write observed by [`RecordingOutputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputWrite {
    /// Tone switched on or off.
    Tone(bool),
    /// Indicator driven to a level.
    Indicator(Indicator, bool),
    /// Display replaced with two lines.
    Show {
        /// First line.
        top: String,
        /// Second line.
        bottom: String,
    },
    /// Display blanked.
    Clear,
}

/// [`AlertOutputs`] that records every write.
///
/// Clones share the log, so a test can hand one to the device and inspect
/// the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutputs {
    log: Arc<Mutex<Vec<OutputWrite>>>,
}

impl RecordingOutputs {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn writes(&self) -> Vec<OutputWrite> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Forget everything written so far.
    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }

    fn push(&self, write: OutputWrite) {
        if let Ok(mut log) = self.log.lock() {
            log.push(write);
        }
    }
}

impl AlertOutputs for RecordingOutputs {
    fn set_tone(&mut self, on: bool) {
        self.push(OutputWrite::Tone(on));
    }

    fn set_indicator(&mut self, indicator: Indicator, high: bool) {
        self.push(OutputWrite::Indicator(indicator, high));
    }

    fn show(&mut self, top: &str, bottom: &str) {
        self.push(OutputWrite::Show {
            top: top.to_owned(),
            bottom: bottom.to_owned(),
        });
    }

    fn clear_display(&mut self) {
        self.push(OutputWrite::Clear);
    }
}

/// [`ButtonInput`] held down or released by hand. Clones share the level.
#[derive(Debug, Clone, Default)]
pub struct ManualButton {
    pressed: Arc<AtomicBool>,
}

impl ManualButton {
    /// Create a released button.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the button down.
    pub fn press(&self) {
        self.pressed.store(true, Ordering::Release);
    }

    /// Let the button go.
    pub fn release(&self) {
        self.pressed.store(false, Ordering::Release);
    }
}

impl ButtonInput for ManualButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::digital::ErrorType as DigitalErrorType;
    use embedded_hal::pwm::ErrorType as PwmErrorType;

    use super::*;

    #[derive(Debug, Default)]
    struct FakePwm {
        duty: u16,
    }

    impl PwmErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            255
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FakePin {
        high: bool,
    }

    impl DigitalErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    #[derive(Debug, Default)]
    struct FakeLcd {
        rows: [String; 2],
    }

    impl TextDisplay for FakeLcd {
        type Error = Infallible;

        fn clear(&mut self) -> Result<(), Self::Error> {
            self.rows = [String::new(), String::new()];
            Ok(())
        }

        fn write_line(&mut self, row: u8, text: &str) -> Result<(), Self::Error> {
            if let Some(line) = self.rows.get_mut(usize::from(row)) {
                *line = text.to_owned();
            }
            Ok(())
        }
    }

    fn outputs() -> PinOutputs<FakePwm, FakePin, FakePin, FakeLcd> {
        PinOutputs::new(
            FakePwm::default(),
            FakePin { high: true },
            FakePin { high: true },
            FakeLcd::default(),
            50,
            16,
        )
    }

    #[test]
    fn new_outputs_start_quiet_and_dark() {
        let (tone, a, b, _) = outputs().into_parts();
        assert_eq!(tone.duty, 0);
        assert!(!a.high);
        assert!(!b.high);
    }

    #[test]
    fn tone_uses_configured_duty() {
        let mut out = outputs();
        out.set_tone(true);
        let (tone, ..) = out.into_parts();
        // 50% of 255, rounded down by embedded-hal's fraction helper.
        assert_eq!(tone.duty, 127);
    }

    #[test]
    fn tone_reassert_is_not_stacked() {
        let mut out = outputs();
        out.set_tone(true);
        out.set_tone(true);
        let (tone, ..) = out.into_parts();
        assert_eq!(tone.duty, 127);
    }

    #[test]
    fn indicators_are_independent() {
        let mut out = outputs();
        out.set_indicator(Indicator::B, true);
        let (_, a, b, _) = out.into_parts();
        assert!(!a.high);
        assert!(b.high);
    }

    #[test]
    fn display_lines_are_cut_to_width() {
        let mut out = outputs();
        out.show("Levothyroxine sodium 50mcg", "Slot: 1");
        let (.., lcd) = out.into_parts();
        assert_eq!(lcd.rows[0], "Levothyroxine so");
        assert_eq!(lcd.rows[1], "Slot: 1");
    }

    #[test]
    fn active_low_button() {
        let mut button = PinButton::new(FakePin { high: false }, true);
        assert!(button.is_pressed());
        let mut button = PinButton::new(FakePin { high: true }, true);
        assert!(!button.is_pressed());
    }

    #[test]
    fn active_high_button() {
        let mut button = PinButton::new(FakePin { high: true }, false);
        assert!(button.is_pressed());
    }

    #[test]
    fn recording_outputs_share_log() {
        let recorder = RecordingOutputs::new();
        let mut handle = recorder.clone();
        handle.set_tone(true);
        handle.show("a", "b");
        assert_eq!(
            recorder.writes(),
            vec![
                OutputWrite::Tone(true),
                OutputWrite::Show {
                    top: "a".to_owned(),
                    bottom: "b".to_owned()
                },
            ]
        );
        recorder.clear();
        assert!(recorder.writes().is_empty());
    }

    #[test]
    fn manual_button_levels() {
        let button = ManualButton::new();
        let mut handle = button.clone();
        assert!(!handle.is_pressed());
        button.press();
        assert!(handle.is_pressed());
        button.release();
        assert!(!handle.is_pressed());
    }
}
