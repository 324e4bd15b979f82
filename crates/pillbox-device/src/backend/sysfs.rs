//! Linux sysfs backend for GPIO lines and the buzzer PWM channel.
//!
//! Pins are exported through `<gpio_root>/export` and driven by writing
//! their `value` file. The buzzer uses the kernel PWM class: the channel is
//! exported under the chip, its period set from the configured tone
//! frequency, and the duty cycle written in nanoseconds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use tracing::debug;

/// Nanoseconds per second, for converting a frequency to a period.
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Failure talking to a sysfs attribute.
#[derive(Debug, thiserror::Error)]
#[error("{path}: {source}")]
pub struct SysfsError {
    /// Attribute that failed.
    pub path: String,
    /// The I/O error.
    #[source]
    pub source: io::Error,
}

impl SysfsError {
    fn at(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.display().to_string(),
            source,
        }
    }
}

impl digital::Error for SysfsError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl pwm::Error for SysfsError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

fn write_attr(path: &Path, value: &str) -> Result<(), SysfsError> {
    fs::write(path, value).map_err(|e| SysfsError::at(path, e))
}

/// Pin direction as written to the `direction` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input line.
    In,
    /// Output line, starting low.
    Out,
}

impl Direction {
    const fn as_attr(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "low",
        }
    }
}

/// A GPIO line under `/sys/class/gpio`.
#[derive(Debug)]
pub struct SysfsPin {
    value: PathBuf,
}

impl SysfsPin {
    /// Export `line` (if it is not already) and set its direction.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsError`] if the export or direction write fails.
    pub fn open(root: &Path, line: u32, direction: Direction) -> Result<Self, SysfsError> {
        let dir = root.join(format!("gpio{line}"));
        if !dir.exists() {
            write_attr(&root.join("export"), &line.to_string())?;
        }
        write_attr(&dir.join("direction"), direction.as_attr())?;
        debug!(line, ?direction, "GPIO exported");
        Ok(Self {
            value: dir.join("value"),
        })
    }

    fn read_high(&self) -> Result<bool, SysfsError> {
        let raw = fs::read_to_string(&self.value).map_err(|e| SysfsError::at(&self.value, e))?;
        Ok(raw.trim() == "1")
    }
}

impl digital::ErrorType for SysfsPin {
    type Error = SysfsError;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        write_attr(&self.value, "0")
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        write_attr(&self.value, "1")
    }
}

impl InputPin for SysfsPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.read_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.read_high().map(|high| !high)
    }
}

/// A PWM channel under `/sys/class/pwm/pwmchipN`.
///
/// Duty is expressed in sixteen-bit steps of the period.
#[derive(Debug)]
pub struct SysfsPwm {
    duty_cycle: PathBuf,
    period_ns: u64,
}

impl SysfsPwm {
    /// Export `channel` on `chip`, set the period for `frequency_hz`, and
    /// enable it with zero duty.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsError`] if any attribute write fails.
    pub fn open(chip: &Path, channel: u32, frequency_hz: u32) -> Result<Self, SysfsError> {
        let dir = chip.join(format!("pwm{channel}"));
        if !dir.exists() {
            write_attr(&chip.join("export"), &channel.to_string())?;
        }
        let period_ns = NANOS_PER_SECOND
            .checked_div(u64::from(frequency_hz))
            .unwrap_or(NANOS_PER_SECOND);

        // Duty must never exceed the period, so clear it before changing
        // the period.
        let duty_cycle = dir.join("duty_cycle");
        write_attr(&duty_cycle, "0")?;
        write_attr(&dir.join("period"), &period_ns.to_string())?;
        write_attr(&dir.join("enable"), "1")?;
        debug!(channel, period_ns, "PWM channel enabled");

        Ok(Self {
            duty_cycle,
            period_ns,
        })
    }

    /// Nanoseconds of high time for `duty` out of [`u16::MAX`].
    fn duty_ns(&self, duty: u16) -> u64 {
        self.period_ns
            .checked_mul(u64::from(duty))
            .and_then(|n| n.checked_div(u64::from(u16::MAX)))
            .unwrap_or(self.period_ns)
    }
}

impl pwm::ErrorType for SysfsPwm {
    type Error = SysfsError;
}

impl SetDutyCycle for SysfsPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        write_attr(&self.duty_cycle, &self.duty_ns(duty).to_string())
    }
}
