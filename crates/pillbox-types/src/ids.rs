//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Reminder IDs are assigned at submission time and exist only for logging
//! and the status API. Matching never looks at them: two reminders with the
//! same name and time are still two distinct reminders.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a stored reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReminderId(pub Uuid);

impl ReminderId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ReminderId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ReminderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ReminderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<ReminderId> for Uuid {
    fn from(id: ReminderId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ReminderId::new();
        let b = ReminderId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ReminderId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = ReminderId::from(Uuid::nil());
        let json = serde_json::to_string(&id).ok();
        assert_eq!(
            json.as_deref(),
            Some("\"00000000-0000-0000-0000-000000000000\"")
        );
    }
}
