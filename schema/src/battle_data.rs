use crate::{AbilityId, ElementType, ItemId};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum StatKind {
    Attack,
    Defense,
    #[strum(serialize = "Sp. Atk")]
    SpecialAttack,
    #[strum(serialize = "Sp. Def")]
    SpecialDefense,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum StatusTag {
    #[strum(serialize = "burn")]
    Burn,
    #[strum(serialize = "severe burn")]
    SevereBurn,
    #[strum(serialize = "poison")]
    Poison,
    #[strum(serialize = "bad poison")]
    BadlyPoisoned,
    #[strum(serialize = "paralysis")]
    Paralysis,
    #[strum(serialize = "frostbite")]
    Frostbite,
    #[strum(serialize = "sleep")]
    Sleep,
    #[strum(serialize = "confusion")]
    Confusion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum WeatherKind {
    #[strum(serialize = "harsh sunlight")]
    HarshSunlight,
    #[strum(serialize = "rain")]
    Rain,
    #[strum(serialize = "sandstorm")]
    Sandstorm,
    #[strum(serialize = "hail")]
    Hail,
    #[strum(serialize = "fog")]
    Fog,
    #[strum(serialize = "strong winds")]
    StrongWinds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Lowers the opposing combatant's attack stage on entry.
    Intimidate,
    /// Extra boost to same-type moves of `move_type` while at low HP.
    PinchBoost { move_type: ElementType },
    /// Speed multiplier while `weather` is active.
    WeatherSpeed { weather: WeatherKind, multiplier: f64 },
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityData {
    pub id: AbilityId,
    pub name: String,
    pub effect: AbilityEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum BallTier {
    Standard,
    Improved,
    Excellent,
}

impl BallTier {
    pub fn modifier(self) -> f64 {
        match self {
            BallTier::Standard => 1.0,
            BallTier::Improved => 1.5,
            BallTier::Excellent => 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    Ball(BallTier),
    GuaranteedEscape,
    /// Resolved by the inventory owner; the battle only spends the turn.
    External(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: ItemId,
    pub name: String,
    pub effect: ItemEffect,
}
