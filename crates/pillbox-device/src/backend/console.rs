//! Console backend: every output is a log line and the acknowledge button
//! is the Enter key.
//!
//! Used for development and for running the appliance on a host without
//! GPIO. The drivers implement the same `embedded-hal` traits as the real
//! pins, so the device runs the exact same output path either way.

use core::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use embedded_hal::digital::{ErrorType as DigitalErrorType, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use pillbox_core::hardware::{ButtonInput, TextDisplay};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Duty-cycle resolution of the simulated tone output.
const TONE_MAX_DUTY: u16 = 100;

/// How long a key press counts as the button being held.
const PRESS_HOLD: Duration = Duration::from_millis(500);

/// Indicator LED that logs level changes.
#[derive(Debug)]
pub struct LogPin {
    name: &'static str,
    high: bool,
}

impl LogPin {
    /// Create a pin reported under `name`, starting low.
    pub const fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    fn drive(&mut self, high: bool) {
        if self.high != high {
            info!(pin = self.name, high, "Indicator");
        }
        self.high = high;
    }
}

impl DigitalErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// Buzzer PWM that logs when the tone starts and stops.
#[derive(Debug, Default)]
pub struct LogTone {
    duty: u16,
}

impl PwmErrorType for LogTone {
    type Error = Infallible;
}

impl SetDutyCycle for LogTone {
    fn max_duty_cycle(&self) -> u16 {
        TONE_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if (duty == 0) != (self.duty == 0) {
            info!(duty_percent = duty, "Tone {}", if duty == 0 { "off" } else { "on" });
        }
        self.duty = duty;
        Ok(())
    }
}

/// Character display rendered into the log.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    rows: [String; 2],
}

impl TextDisplay for ConsoleDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Self::Error> {
        for row in &mut self.rows {
            row.clear();
        }
        info!("Display cleared");
        Ok(())
    }

    fn write_line(&mut self, row: u8, text: &str) -> Result<(), Self::Error> {
        if let Some(slot) = self.rows.get_mut(usize::from(row)) {
            text.clone_into(slot);
        }
        if row == 1 {
            let [top, bottom] = &self.rows;
            info!(top = %top, bottom = %bottom, "Display");
        }
        Ok(())
    }
}

/// Momentary button pressed from the keyboard.
///
/// A press reads as held for a short window and is consumed by the first
/// read inside it, so a stray key press while idle does not acknowledge a
/// later alert.
#[derive(Debug, Clone, Default)]
pub struct KeyButton {
    pressed_at: Arc<Mutex<Option<Instant>>>,
}

impl KeyButton {
    /// Create a released button.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press now.
    pub fn press(&self) {
        self.press_at(Instant::now());
    }

    fn press_at(&self, at: Instant) {
        if let Ok(mut pressed_at) = self.pressed_at.lock() {
            *pressed_at = Some(at);
        }
    }

    /// Press the button every time a line is read from stdin.
    ///
    /// The task ends when stdin closes.
    pub fn spawn_stdin_reader(&self) -> tokio::task::JoinHandle<()> {
        let button = self.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            info!("Press Enter to acknowledge alerts");
            while let Ok(Some(_)) = lines.next_line().await {
                debug!("Key press");
                button.press();
            }
            debug!("stdin closed, keyboard button disabled");
        })
    }
}

impl ButtonInput for KeyButton {
    fn is_pressed(&mut self) -> bool {
        let Ok(mut pressed_at) = self.pressed_at.lock() else {
            return false;
        };
        pressed_at
            .take()
            .is_some_and(|at| at.elapsed() <= PRESS_HOLD)
    }
}
