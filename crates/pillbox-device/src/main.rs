//! Device binary for the Pillbox reminder appliance.
//!
//! This is the main entry point that wires together the clock, the
//! hardware backend, the reminder store and alert machine, and the HTTP
//! API. It loads configuration, initializes all subsystems, and runs the
//! device loop until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pillbox.yaml` (or `PILLBOX_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the system clock
//! 4. Set up the hardware backend
//! 5. Start the HTTP API
//! 6. Run the device loop until Ctrl-C
//! 7. Wait for the API to drain and log the result

mod backend;
mod error;
mod snapshot_callback;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pillbox_api::server::ServerConfig;
use pillbox_api::startup::spawn_api;
use pillbox_api::state::AppState;
use pillbox_core::clock::SystemClock;
use pillbox_core::config::{LoggingConfig, PillboxConfig};
use pillbox_core::device::Device;
use pillbox_core::runner;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::DeviceError;
use crate::snapshot_callback::SnapshotCallback;

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "pillbox.yaml";

/// Application entry point for the device.
///
/// # Errors
///
/// Returns an error if any initialization step or the device loop fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("pillbox-device starting");
    info!(
        path = %config_path.display(),
        host = %config.network.host,
        port = config.network.port,
        utc_offset_minutes = ?config.clock.utc_offset_minutes,
        poll_interval_ms = config.clock.poll_interval_ms,
        backend = ?config.hardware.backend,
        "Configuration loaded"
    );

    // 3. Create the clock.
    let clock = SystemClock::new(&config.clock).map_err(DeviceError::from)?;
    info!("System clock initialized");

    // 4. Hardware.
    let hardware = backend::build(&config)?;
    let mut device = Device::new(
        Box::new(clock),
        hardware.outputs,
        hardware.button,
        config.display.show_receipt,
    );

    // 5. HTTP API.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    let (submissions_tx, mut submissions_rx) = mpsc::channel(config.network.submission_queue);
    let app_state = Arc::new(AppState::new(
        submissions_tx,
        Duration::from_millis(config.network.submit_timeout_ms),
    ));
    let api_handle = spawn_api(
        &ServerConfig::from(&config.network),
        Arc::clone(&app_state),
        shutdown_rx.clone(),
    )
    .await
    .map_err(DeviceError::from)?;

    let mut callback = SnapshotCallback::new(app_state.snapshot_handle());
    drop(app_state);

    // 6. Ctrl-C flips the shutdown flag for both the loop and the server.
    {
        let shutdown_tx = Arc::clone(&shutdown_tx);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Ctrl-C received, shutting down"),
                Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, shutting down"),
            }
            let _ = shutdown_tx.send(true);
        });
    }

    let mut shutdown = shutdown_rx;
    let poll_interval = Duration::from_millis(config.clock.poll_interval_ms);
    let result = runner::run_device(
        &mut device,
        &mut submissions_rx,
        &mut callback,
        &mut shutdown,
        poll_interval,
    )
    .await
    .map_err(DeviceError::from)?;

    // 7. Drain.
    let _ = shutdown_tx.send(true);
    if let Err(e) = api_handle.await {
        warn!(error = %e, "HTTP server task failed");
    }

    info!(
        polls = result.polls,
        submissions = result.submissions,
        fired = result.fired,
        acknowledged = result.acknowledged,
        snapshots_skipped = callback.skipped(),
        reminders = device.store().len(),
        "pillbox-device shutdown complete"
    );

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the device configuration.
///
/// Reads `PILLBOX_CONFIG` if set, else `pillbox.yaml` in the working
/// directory. A missing file means defaults; environment overrides apply
/// either way.
fn load_config() -> Result<(PillboxConfig, PathBuf), DeviceError> {
    let path = std::env::var_os("PILLBOX_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = PillboxConfig::from_file(&path)?;
        Ok((config, path))
    } else {
        let mut config = PillboxConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok((config, path))
    }
}
