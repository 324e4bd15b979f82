//! Error types for the device binary.
//!
//! [`DeviceError`] is the top-level error type that wraps all possible
//! failure modes during start-up and the device run.

/// Top-level error for the device binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pillbox_core::config::ConfigError,
    },

    /// The system clock could not be built.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: pillbox_core::clock::ClockError,
    },

    /// The device loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: pillbox_core::runner::RunnerError,
    },

    /// The HTTP server failed to start.
    #[error("api error: {source}")]
    Api {
        /// The underlying startup error.
        #[from]
        source: pillbox_api::startup::StartupError,
    },

    /// A sysfs GPIO line or PWM channel could not be set up.
    #[error("hardware error: {source}")]
    Sysfs {
        /// The underlying sysfs error.
        #[from]
        source: crate::backend::sysfs::SysfsError,
    },
}
