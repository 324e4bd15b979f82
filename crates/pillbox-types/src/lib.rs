//! Shared type definitions for the Pillbox reminder appliance.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: the reminder record, the slot and indicator enumerations,
//! wall-clock readings, and the read-only device snapshot served by the
//! status API. Types flow downstream to `TypeScript` via `ts-rs` for the
//! companion app that submits reminders.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for reminder identifiers
//! - [`enums`] -- [`Slot`] and [`Indicator`]
//! - [`structs`] -- [`WallTime`], [`Reminder`], [`SubmitReminder`],
//!   [`AlertStatus`], [`DeviceSnapshot`]

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Indicator, Slot};
pub use ids::ReminderId;
pub use structs::{
    AlertStatus, DeviceSnapshot, DisplayLines, Reminder, SubmitReminder, WallTime,
};

#[cfg(test)]
mod tests {
    //! Export checks for `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Importing the TS trait and calling export_all writes the bindings
        // to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::ReminderId::export_all();
        let _ = crate::enums::Indicator::export_all();
        let _ = crate::structs::WallTime::export_all();
        let _ = crate::structs::Reminder::export_all();
        let _ = crate::structs::SubmitReminder::export_all();
        let _ = crate::structs::DisplayLines::export_all();
        let _ = crate::structs::AlertStatus::export_all();
        let _ = crate::structs::DeviceSnapshot::export_all();
    }
}
