//! Enumeration types for the Pillbox appliance.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// The physical compartment a reminder targets.
///
/// Submissions carry the slot as free text. `"1"` and `"2"` map to the two
/// compartments wired to an indicator; anything else is kept verbatim as
/// [`Slot::Unknown`], which still raises an alert but lights nothing.
///
/// Serializes as the submitted text so the companion app sees exactly what
/// it sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Slot {
    /// Compartment 1, lit by [`Indicator::A`].
    One,
    /// Compartment 2, lit by [`Indicator::B`].
    Two,
    /// Any other submitted label. Alerts without an indicator.
    Unknown(String),
}

impl Slot {
    /// The text shown on the display's second line after `Slot: `.
    pub fn label(&self) -> &str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Unknown(raw) => raw,
        }
    }

    /// The indicator wired to this slot, if any.
    pub const fn indicator(&self) -> Option<Indicator> {
        match self {
            Self::One => Some(Indicator::A),
            Self::Two => Some(Indicator::B),
            Self::Unknown(_) => None,
        }
    }
}

/// Matching is exact: `" 1"` is unknown.
impl From<String> for Slot {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "1" => Self::One,
            "2" => Self::Two,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::One => "1".to_owned(),
            Slot::Two => "2".to_owned(),
            Slot::Unknown(raw) => raw,
        }
    }
}

impl core::fmt::Display for Slot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// One of the two binary slot indicators (LEDs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Indicator {
    /// Indicator for slot 1.
    A,
    /// Indicator for slot 2.
    B,
}

impl Indicator {
    /// Both indicators, in wiring order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_slots_map_to_indicators() {
        assert_eq!(Slot::from("1".to_owned()), Slot::One);
        assert_eq!(Slot::from("2".to_owned()), Slot::Two);
        assert_eq!(Slot::One.indicator(), Some(Indicator::A));
        assert_eq!(Slot::Two.indicator(), Some(Indicator::B));
    }

    #[test]
    fn unknown_slot_keeps_raw_label() {
        let slot = Slot::from("3b".to_owned());
        assert_eq!(slot, Slot::Unknown("3b".to_owned()));
        assert_eq!(slot.label(), "3b");
        assert_eq!(slot.indicator(), None);
    }

    #[test]
    fn slot_matching_is_exact() {
        assert_eq!(Slot::from(" 1".to_owned()), Slot::Unknown(" 1".to_owned()));
        assert_eq!(Slot::from("01".to_owned()), Slot::Unknown("01".to_owned()));
        assert_eq!(Slot::from("".to_owned()), Slot::Unknown(String::new()));
    }

    #[test]
    fn slot_serializes_as_submitted_text() {
        let json = serde_json::to_string(&Slot::Two).ok();
        assert_eq!(json.as_deref(), Some("\"2\""));

        let restored: Result<Slot, _> = serde_json::from_str("\"kitchen\"");
        assert_eq!(restored.ok(), Some(Slot::Unknown("kitchen".to_owned())));

        let restored: Result<Slot, _> = serde_json::from_str("\"1\"");
        assert_eq!(restored.ok(), Some(Slot::One));
    }
}
