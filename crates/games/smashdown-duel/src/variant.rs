use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Fighting style. Closed set; per-style behaviour is looked up through
/// [`Variant::capabilities`] rather than trait objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Fast mover whose special is a dash strike, usable once mid-air.
    Dasher,
    /// Throws bouncing shells on a long cooldown.
    Thrower,
    /// Punches only; the special button is a second basic-attack button.
    Brawler,
}

/// What a variant's special button does and which guards apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_air_dash: bool,
    pub has_projectile: bool,
    pub has_distinct_special: bool,
    /// Basic attacks are refused while airborne.
    pub grounded_attacks_only: bool,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Dasher, Variant::Thrower, Variant::Brawler];

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Variant::Dasher => Capabilities {
                can_air_dash: true,
                has_projectile: false,
                has_distinct_special: true,
                grounded_attacks_only: false,
            },
            Variant::Thrower => Capabilities {
                can_air_dash: false,
                has_projectile: true,
                has_distinct_special: true,
                grounded_attacks_only: false,
            },
            Variant::Brawler => Capabilities {
                can_air_dash: false,
                has_projectile: false,
                has_distinct_special: false,
                grounded_attacks_only: true,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Dasher => "dasher",
            Variant::Thrower => "thrower",
            Variant::Brawler => "brawler",
        }
    }
}

impl FromStr for Variant {
    type Err = SetupError;

    /// Accepts the style names and the character names used by the menus.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dasher" | "sonic" => Ok(Variant::Dasher),
            "thrower" | "mario" => Ok(Variant::Thrower),
            "brawler" | "nerd" => Ok(Variant::Brawler),
            _ => Err(SetupError::UnknownVariant(s.to_string())),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the two combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}
