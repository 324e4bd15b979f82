//! Clock, reminder store, scheduler, and alert state machine for the
//! Pillbox reminder appliance.
//!
//! The device runs one cooperative loop. Each iteration services at most
//! one pending submission, runs one scheduler tick, and checks the
//! acknowledge button. All device state is owned by a single [`Device`]
//! value that the loop borrows mutably, so nothing here needs a lock.
//!
//! # Modules
//!
//! - [`alert`] -- The Idle/Active alert state machine driving the outputs.
//! - [`clock`] -- [`ClockSource`] trait, system clock, and a manual clock.
//! - [`config`] -- Configuration loading from `pillbox.yaml` into
//!   strongly-typed structs.
//! - [`device`] -- The owned application context tying everything together.
//! - [`hardware`] -- Output and button seams over `embedded-hal` traits.
//! - [`runner`] -- The async poll loop and its callback hook.
//! - [`scheduler`] -- Once-per-minute matching and the midnight reset.
//! - [`store`] -- The append-only reminder store.
//!
//! [`Device`]: device::Device
//! [`ClockSource`]: clock::ClockSource

pub mod alert;
pub mod clock;
pub mod config;
pub mod device;
pub mod hardware;
pub mod runner;
pub mod scheduler;
pub mod store;
