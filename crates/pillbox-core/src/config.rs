//! Configuration loading and typed config structures for the Pillbox device.
//!
//! The configuration lives in `pillbox.yaml` next to the binary. This
//! module defines strongly-typed structs that mirror the YAML structure and
//! a loader that reads, overrides from the environment, and validates it.
//! Every field has a default, so an empty file (or no file) yields a
//! working console-backed device on port 80 at UTC+05:30.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level device configuration.
///
/// Mirrors the structure of `pillbox.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PillboxConfig {
    /// HTTP listener and submission queue settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Clock source and loop cadence.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Tone output settings.
    #[serde(default)]
    pub tone: ToneConfig,

    /// Character display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Hardware backend and pin assignments.
    #[serde(default)]
    pub hardware: HardwareConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PillboxConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `PILLBOX_HOST` overrides `network.host`
    /// - `PILLBOX_PORT` overrides `network.port`
    /// - `PILLBOX_UTC_OFFSET_MINUTES` overrides `clock.utc_offset_minutes`
    ///   (the value `local` selects the host time zone)
    /// - `PILLBOX_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override or value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Split out from [`apply_env_overrides`](Self::apply_env_overrides) so
    /// the override rules can be exercised without touching the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PILLBOX_HOST") {
            self.network.host = host;
        }
        if let Some(port) = lookup("PILLBOX_PORT") {
            self.network.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
                field: "PILLBOX_PORT".to_owned(),
                reason: format!("{e}"),
            })?;
        }
        if let Some(offset) = lookup("PILLBOX_UTC_OFFSET_MINUTES") {
            let offset = offset.trim();
            self.clock.utc_offset_minutes = if offset.eq_ignore_ascii_case("local") {
                None
            } else {
                Some(offset.parse().map_err(|e| ConfigError::Invalid {
                    field: "PILLBOX_UTC_OFFSET_MINUTES".to_owned(),
                    reason: format!("{e}"),
                })?)
            };
        }
        if let Some(level) = lookup("PILLBOX_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Check values that deserialize fine but cannot drive the device.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tone.duty_percent == 0 || self.tone.duty_percent > 100 {
            return Err(invalid("tone.duty_percent", "must be between 1 and 100"));
        }
        if self.tone.frequency_hz == 0 {
            return Err(invalid("tone.frequency_hz", "must be at least 1"));
        }
        if self.display.columns == 0 {
            return Err(invalid("display.columns", "must be at least 1"));
        }
        if self.clock.poll_interval_ms == 0 {
            return Err(invalid("clock.poll_interval_ms", "must be at least 1"));
        }
        if let Some(offset) = self.clock.utc_offset_minutes {
            // chrono accepts offsets strictly inside +/- 24 hours.
            if offset.unsigned_abs() >= MINUTES_PER_DAY {
                return Err(invalid(
                    "clock.utc_offset_minutes",
                    "must be within +/- 1439 minutes",
                ));
            }
        }
        if self.network.submission_queue == 0 {
            return Err(invalid("network.submission_queue", "must be at least 1"));
        }
        Ok(())
    }
}

/// Minutes in a day; offsets must stay strictly below this magnitude.
const MINUTES_PER_DAY: u32 = 24 * 60;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the submission and status API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capacity of the submission channel between the HTTP handlers and the
    /// device loop. Submissions beyond this wait in the handler.
    #[serde(default = "default_submission_queue")]
    pub submission_queue: usize,

    /// How long a submission handler waits for the loop to store the
    /// reminder before answering `503`.
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            submission_queue: default_submission_queue(),
            submit_timeout_ms: default_submit_timeout_ms(),
        }
    }
}

/// Clock source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Fixed offset east of UTC in minutes. `null` uses the host time zone.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: Option<i32>,

    /// Readings dated before this year are treated as "clock not yet
    /// synchronized" and produce no reading.
    #[serde(default = "default_min_valid_year")]
    pub min_valid_year: i32,

    /// Delay between loop iterations in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            min_valid_year: default_min_valid_year(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Tone (buzzer) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToneConfig {
    /// Duty cycle in percent while an alert sounds.
    #[serde(default = "default_duty_percent")]
    pub duty_percent: u8,

    /// PWM frequency in hertz (sysfs backend only).
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: u32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            duty_percent: default_duty_percent(),
            frequency_hz: default_frequency_hz(),
        }
    }
}

/// Character display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Visible characters per line; longer text is cut.
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Show "Reminder received" when a submission arrives and no alert is
    /// on screen.
    #[serde(default = "default_true")]
    pub show_receipt: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            show_receipt: true,
        }
    }
}

/// Which hardware backend drives the outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareBackend {
    /// Outputs are written to the log; the button is the Enter key.
    #[default]
    Console,
    /// Linux sysfs GPIO and PWM.
    Sysfs,
}

/// Hardware backend and pin assignments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HardwareConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: HardwareBackend,

    /// Root of the sysfs GPIO tree.
    #[serde(default = "default_gpio_root")]
    pub gpio_root: String,

    /// Sysfs PWM chip driving the buzzer.
    #[serde(default = "default_pwm_chip")]
    pub pwm_chip: String,

    /// PWM channel on the chip.
    #[serde(default)]
    pub pwm_channel: u32,

    /// GPIO line for slot 1's indicator.
    #[serde(default = "default_indicator_a_pin")]
    pub indicator_a_pin: u32,

    /// GPIO line for slot 2's indicator.
    #[serde(default = "default_indicator_b_pin")]
    pub indicator_b_pin: u32,

    /// GPIO line for the acknowledge button.
    #[serde(default = "default_button_pin")]
    pub button_pin: u32,

    /// Button reads low when pressed (pull-up wiring).
    #[serde(default = "default_true")]
    pub button_active_low: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backend: HardwareBackend::default(),
            gpio_root: default_gpio_root(),
            pwm_chip: default_pwm_chip(),
            pwm_channel: 0,
            indicator_a_pin: default_indicator_a_pin(),
            indicator_b_pin: default_indicator_b_pin(),
            button_pin: default_button_pin(),
            button_active_low: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    80
}

const fn default_submission_queue() -> usize {
    16
}

const fn default_submit_timeout_ms() -> u64 {
    5000
}

#[allow(clippy::unnecessary_wraps)]
const fn default_utc_offset_minutes() -> Option<i32> {
    // IST, +05:30
    Some(330)
}

const fn default_min_valid_year() -> i32 {
    2016
}

const fn default_poll_interval_ms() -> u64 {
    50
}

const fn default_duty_percent() -> u8 {
    50
}

const fn default_frequency_hz() -> u32 {
    1500
}

const fn default_columns() -> usize {
    16
}

fn default_gpio_root() -> String {
    "/sys/class/gpio".to_owned()
}

fn default_pwm_chip() -> String {
    "/sys/class/pwm/pwmchip0".to_owned()
}

const fn default_indicator_a_pin() -> u32 {
    18
}

const fn default_indicator_b_pin() -> u32 {
    19
}

const fn default_button_pin() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = PillboxConfig::parse("{}").unwrap();
        assert_eq!(config, PillboxConfig::default());
        assert_eq!(config.network.port, 80);
        assert_eq!(config.clock.utc_offset_minutes, Some(330));
        assert_eq!(config.tone.duty_percent, 50);
        assert_eq!(config.display.columns, 16);
        assert_eq!(config.hardware.backend, HardwareBackend::Console);
        assert!(config.hardware.button_active_low);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r"
network:
  port: 8080
clock:
  utc_offset_minutes: -300
hardware:
  backend: sysfs
  button_pin: 17
";
        let config = PillboxConfig::parse(yaml).unwrap();
        assert_eq!(config.network.port, 8080);
        assert_eq!(config.network.host, "0.0.0.0");
        assert_eq!(config.clock.utc_offset_minutes, Some(-300));
        assert_eq!(config.clock.poll_interval_ms, 50);
        assert_eq!(config.hardware.backend, HardwareBackend::Sysfs);
        assert_eq!(config.hardware.button_pin, 17);
        assert_eq!(config.hardware.indicator_a_pin, 18);
    }

    #[test]
    fn null_offset_selects_host_zone() {
        let config = PillboxConfig::parse("clock:\n  utc_offset_minutes: null\n").unwrap();
        assert_eq!(config.clock.utc_offset_minutes, None);
    }

    #[test]
    fn zero_duty_rejected() {
        let result = PillboxConfig::parse("tone:\n  duty_percent: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn oversized_offset_rejected() {
        let result = PillboxConfig::parse("clock:\n  utc_offset_minutes: 1440\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn unknown_backend_is_yaml_error() {
        let result = PillboxConfig::parse("hardware:\n  backend: spi\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_apply() {
        let vars: BTreeMap<&str, &str> = BTreeMap::from([
            ("PILLBOX_HOST", "127.0.0.1"),
            ("PILLBOX_PORT", "9000"),
            ("PILLBOX_UTC_OFFSET_MINUTES", "local"),
            ("PILLBOX_LOG", "debug"),
        ]);
        let mut config = PillboxConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(config.network.host, "127.0.0.1");
        assert_eq!(config.network.port, 9000);
        assert_eq!(config.clock.utc_offset_minutes, None);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn numeric_offset_override() {
        let mut config = PillboxConfig::default();
        config
            .apply_overrides(|key| (key == "PILLBOX_UTC_OFFSET_MINUTES").then(|| "60".to_owned()))
            .unwrap();
        assert_eq!(config.clock.utc_offset_minutes, Some(60));
    }

    #[test]
    fn bad_port_override_rejected() {
        let mut config = PillboxConfig::default();
        let result =
            config.apply_overrides(|key| (key == "PILLBOX_PORT").then(|| "eighty".to_owned()));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
