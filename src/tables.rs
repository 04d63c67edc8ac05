use crate::{Error, Result};

/// Vendor code of the horizontal vane position that is only available on
/// units with a wide vane.
pub const H_VANE_SPLIT: &str = "split";

/// Swing mode shown when the active axis has no known position.
pub const DEFAULT_SWING_MODE: &str = "Auto";

/// Fixed (vendor code, display name) table.
#[derive(Debug)]
pub struct Lookup {
    kind: &'static str,
    pairs: &'static [(&'static str, &'static str)],
}

impl Lookup {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn display(&self, code: &str) -> Option<&'static str> {
        self.pairs
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    pub fn code(&self, name: &str) -> Result<&'static str> {
        self.pairs
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(code, _)| *code)
            .ok_or_else(|| Error::invalid(self.kind, name))
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(code, _)| *code)
    }
}

pub static OPERATION_MODES: Lookup = Lookup {
    kind: "hvac_mode",
    pairs: &[
        ("heat", "heat"),
        ("dry", "dry"),
        ("cool", "cool"),
        ("fan_only", "fan_only"),
        ("heat_cool", "heat_cool"),
    ],
};

pub static VANE_VERTICAL: Lookup = Lookup {
    kind: "vertical swing_mode",
    pairs: &[
        ("auto", "VerticalAuto"),
        ("1", "VerticalTop"),
        ("2", "VerticalMiddleTop"),
        ("3", "VerticalMiddle"),
        ("4", "VerticalMiddleBottom"),
        ("5", "VerticalBottom"),
        ("swing", "VerticalSwing"),
    ],
};

pub static VANE_HORIZONTAL: Lookup = Lookup {
    kind: "horizontal swing_mode",
    pairs: &[
        ("auto", "HorizontalAuto"),
        ("1", "HorizontalLeft"),
        ("2", "HorizontalMiddleLeft"),
        ("3", "HorizontalMiddle"),
        ("4", "HorizontalMiddleRight"),
        ("5", "HorizontalRight"),
        (H_VANE_SPLIT, "HorizontalSplit"),
        ("swing", "HorizontalSwing"),
    ],
};

/// Whether a horizontal vane code may be offered. Split needs a wide vane.
pub fn horizontal_offered(code: &str, has_wide_vane: bool) -> bool {
    code != H_VANE_SPLIT || has_wide_vane
}

/// Display names for the device's advertised vane positions. The split
/// horizontal position is dropped unless the unit has a wide vane.
pub fn swing_modes(
    vertical: &[String],
    horizontal: &[String],
    has_wide_vane: bool,
) -> Vec<&'static str> {
    let vertical = vertical.iter().filter_map(|code| VANE_VERTICAL.display(code));
    let horizontal = horizontal
        .iter()
        .filter(|code| horizontal_offered(code, has_wide_vane))
        .filter_map(|code| VANE_HORIZONTAL.display(code));
    vertical.chain(horizontal).collect()
}
