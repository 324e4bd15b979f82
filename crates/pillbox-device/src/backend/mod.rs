//! Hardware backends.
//!
//! [`build`] turns the `hardware` config section into the output and
//! button seams the device core drives. Both backends feed
//! [`PinOutputs`], so tone level, indicator mapping, and display width are
//! handled the same way on the bench and on the appliance.

pub mod console;
pub mod sysfs;

use std::path::Path;

use pillbox_core::config::{HardwareBackend, PillboxConfig};
use pillbox_core::hardware::{AlertOutputs, ButtonInput, PinButton, PinOutputs};
use tracing::info;

use crate::error::DeviceError;

use self::console::{ConsoleDisplay, KeyButton, LogPin, LogTone};
use self::sysfs::{Direction, SysfsPin, SysfsPwm};

/// The seams handed to the device.
pub struct Hardware {
    /// Tone, indicators, and display.
    pub outputs: Box<dyn AlertOutputs + Send>,
    /// Acknowledge button.
    pub button: Box<dyn ButtonInput + Send>,
}

/// Build the configured backend.
///
/// The console backend also starts the stdin reader that stands in for the
/// button, so this must run inside the Tokio runtime.
///
/// # Errors
///
/// Returns [`DeviceError::Sysfs`] if a sysfs line or channel cannot be
/// set up.
pub fn build(config: &PillboxConfig) -> Result<Hardware, DeviceError> {
    let duty = config.tone.duty_percent;
    let columns = config.display.columns;

    match config.hardware.backend {
        HardwareBackend::Console => {
            info!("Using console hardware backend");
            let button = KeyButton::new();
            let _reader = button.spawn_stdin_reader();
            Ok(Hardware {
                outputs: Box::new(PinOutputs::new(
                    LogTone::default(),
                    LogPin::new("A"),
                    LogPin::new("B"),
                    ConsoleDisplay::default(),
                    duty,
                    columns,
                )),
                button: Box::new(button),
            })
        }
        HardwareBackend::Sysfs => {
            let hw = &config.hardware;
            info!(
                gpio_root = %hw.gpio_root,
                pwm_chip = %hw.pwm_chip,
                indicator_a_pin = hw.indicator_a_pin,
                indicator_b_pin = hw.indicator_b_pin,
                button_pin = hw.button_pin,
                "Using sysfs hardware backend"
            );
            let gpio = Path::new(&hw.gpio_root);
            let tone = SysfsPwm::open(
                Path::new(&hw.pwm_chip),
                hw.pwm_channel,
                config.tone.frequency_hz,
            )?;
            let indicator_a = SysfsPin::open(gpio, hw.indicator_a_pin, Direction::Out)?;
            let indicator_b = SysfsPin::open(gpio, hw.indicator_b_pin, Direction::Out)?;
            let button = SysfsPin::open(gpio, hw.button_pin, Direction::In)?;

            // No character-display driver on this backend; the display
            // goes to the log.
            Ok(Hardware {
                outputs: Box::new(PinOutputs::new(
                    tone,
                    indicator_a,
                    indicator_b,
                    ConsoleDisplay::default(),
                    duty,
                    columns,
                )),
                button: Box::new(PinButton::new(button, hw.button_active_low)),
            })
        }
    }
}
