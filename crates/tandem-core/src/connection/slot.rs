//! Labeled connection slots.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// A labeled slot of a connection.
///
/// Every connection exposes exactly these three slots. The labels are the
/// names hosts register connections under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, IntoStaticStr)]
pub enum Slot {
    /// The first input.
    #[serde(rename = "FIRSTINPUT")]
    #[strum(serialize = "FIRSTINPUT")]
    FirstInput,
    /// The second input.
    #[serde(rename = "SECONDINPUT")]
    #[strum(serialize = "SECONDINPUT")]
    SecondInput,
    /// The computed output.
    #[serde(rename = "OUTPUT")]
    #[strum(serialize = "OUTPUT")]
    Output,
}

impl Slot {
    /// All slots in registration order.
    pub const ALL: [Self; 3] = [Self::FirstInput, Self::SecondInput, Self::Output];

    /// Returns the slot label.
    pub fn label(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Slot::FirstInput.label(), "FIRSTINPUT");
        assert_eq!(Slot::SecondInput.to_string(), "SECONDINPUT");
        assert_eq!(Slot::Output.as_ref(), "OUTPUT");
    }

    #[test]
    fn test_all_matches_declaration_order() {
        assert_eq!(Slot::iter().collect::<Vec<_>>(), Slot::ALL);
    }

    #[test]
    fn test_serde_uses_labels() {
        assert_eq!(
            serde_json::to_string(&Slot::SecondInput).unwrap(),
            "\"SECONDINPUT\""
        );
    }
}
