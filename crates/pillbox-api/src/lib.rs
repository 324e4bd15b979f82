//! HTTP API for the Pillbox reminder appliance.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Submission endpoint** (`GET /update`) used by the companion app to
//!   store a reminder on the device
//! - **REST endpoints** for reading device state (stored reminders, alert
//!   status, liveness)
//! - **Minimal HTML page** (`GET /`) showing the alert state and links to
//!   the API endpoints
//!
//! # Architecture
//!
//! The API never touches device state directly. Submissions are forwarded
//! to the device loop over a bounded channel and the handler waits for the
//! loop to confirm the reminder is stored. Reads are served from a
//! [`DeviceSnapshot`] that the loop republishes after every poll.
//!
//! [`DeviceSnapshot`]: pillbox_types::DeviceSnapshot

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use state::AppState;
