//! Clock sources for the scheduler.
//!
//! The scheduler only ever asks one question: what is the local hour and
//! minute right now? A clock may not know yet (the system time has not been
//! synchronized) and answers `None`; the scheduler then skips the tick and
//! asks again on the next one. There is no other retry policy.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike, Utc};
use pillbox_types::WallTime;

use crate::config::ClockConfig;

/// Seconds per minute, for converting configured offsets.
const SECONDS_PER_MINUTE: i32 = 60;

/// Errors that can occur while building a clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The configured UTC offset is outside what `chrono` accepts.
    #[error("invalid UTC offset: {minutes} minutes")]
    InvalidOffset {
        /// The rejected offset.
        minutes: i32,
    },
}

/// A source of local wall-clock readings.
pub trait ClockSource {
    /// Current local hour and minute, or `None` if no reading is available.
    fn now(&self) -> Option<WallTime>;
}

/// Wall clock backed by the host's system time.
///
/// Converts UTC to local time either through a fixed offset (the default,
/// matching a device configured with a known zone and no DST) or through
/// the host's own time zone database.
#[derive(Debug, Clone)]
pub struct SystemClock {
    /// Fixed zone, or `None` for the host zone.
    offset: Option<FixedOffset>,
    /// Readings before this year mean the clock has not been set.
    min_valid_year: i32,
}

impl SystemClock {
    /// Create a system clock from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidOffset`] if the offset is not strictly
    /// within +/- 24 hours.
    pub fn new(config: &ClockConfig) -> Result<Self, ClockError> {
        let offset = match config.utc_offset_minutes {
            Some(minutes) => Some(
                minutes
                    .checked_mul(SECONDS_PER_MINUTE)
                    .and_then(FixedOffset::east_opt)
                    .ok_or(ClockError::InvalidOffset { minutes })?,
            ),
            None => None,
        };
        Ok(Self {
            offset,
            min_valid_year: config.min_valid_year,
        })
    }

    /// Convert a UTC instant into a local reading.
    ///
    /// Returns `None` when the instant predates `min_valid_year`, which is
    /// how an unsynchronized clock (still counting from the epoch) shows up.
    pub fn reading_at(&self, instant: DateTime<Utc>) -> Option<WallTime> {
        if instant.year() < self.min_valid_year {
            return None;
        }
        let (hour, minute) = match self.offset {
            Some(offset) => {
                let local = instant.with_timezone(&offset);
                (local.hour(), local.minute())
            }
            None => {
                let local = instant.with_timezone(&Local);
                (local.hour(), local.minute())
            }
        };
        Some(WallTime::new(hour, minute))
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> Option<WallTime> {
        self.reading_at(Utc::now())
    }
}

/// A clock whose reading is set by hand.
///
/// Cloning shares the reading, so a test can keep one handle and give the
/// other to the device. Starts unavailable.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    reading: Arc<Mutex<Option<WallTime>>>,
}

impl ManualClock {
    /// Create a clock with no reading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock reading `hour:minute`.
    pub fn at(hour: u32, minute: u32) -> Self {
        let clock = Self::new();
        clock.set(hour, minute);
        clock
    }

    /// Set the reading to `hour:minute`.
    pub fn set(&self, hour: u32, minute: u32) {
        if let Ok(mut reading) = self.reading.lock() {
            *reading = Some(WallTime::new(hour, minute));
        }
    }

    /// Make the clock report no reading.
    pub fn set_unavailable(&self) {
        if let Ok(mut reading) = self.reading.lock() {
            *reading = None;
        }
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> Option<WallTime> {
        self.reading.lock().ok().and_then(|reading| *reading)
    }
}
