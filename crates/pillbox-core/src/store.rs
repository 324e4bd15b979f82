//! The in-memory reminder store.
//!
//! Append-only: reminders are never removed for the lifetime of the
//! process. The only mutation after insertion is the `triggered` flag,
//! which the scheduler sets when a reminder fires and the midnight reset
//! clears. Insertion order is preserved and is the firing order when
//! several reminders share a minute.

use pillbox_types::{Reminder, ReminderId, Slot, WallTime};

/// Ordered collection of every reminder submitted since start-up.
#[derive(Debug, Clone, Default)]
pub struct ReminderStore {
    reminders: Vec<Reminder>,
}

impl ReminderStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            reminders: Vec::new(),
        }
    }

    /// Append a new untriggered reminder and return a copy of it.
    ///
    /// Nothing is validated: an hour of 25 is stored as-is and simply never
    /// matches.
    pub fn submit(
        &mut self,
        name: impl Into<String>,
        slot: Slot,
        hour: i32,
        minute: i32,
    ) -> Reminder {
        let reminder = Reminder::new(name, slot, hour, minute);
        self.reminders.push(reminder.clone());
        reminder
    }

    /// Clear `triggered` on every reminder. Returns how many were set.
    ///
    /// Idempotent: a second call in the same minute clears nothing.
    pub fn reset_daily(&mut self) -> usize {
        let mut cleared: usize = 0;
        for reminder in &mut self.reminders {
            if reminder.triggered {
                reminder.triggered = false;
                cleared = cleared.saturating_add(1);
            }
        }
        cleared
    }

    /// Untriggered reminders targeting `time`, in store order.
    ///
    /// Lazy; call again for a fresh pass.
    pub fn due_at(&self, time: WallTime) -> impl Iterator<Item = &Reminder> {
        self.reminders.iter().filter(move |r| r.is_due_at(time))
    }

    /// Mutable version of [`due_at`](Self::due_at), used by the scheduler
    /// to flag what it fires.
    pub fn due_at_mut(&mut self, time: WallTime) -> impl Iterator<Item = &mut Reminder> {
        self.reminders.iter_mut().filter(move |r| r.is_due_at(time))
    }

    /// All reminders in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Reminder> {
        self.reminders.iter()
    }

    /// Look up a reminder by ID.
    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Number of stored reminders.
    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    /// Whether no reminder has been submitted yet.
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// Owned copy of every reminder, for snapshots.
    pub fn to_vec(&self) -> Vec<Reminder> {
        self.reminders.clone()
    }
}
