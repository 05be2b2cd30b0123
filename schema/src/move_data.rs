use crate::{ElementType, MoveId, StatKind, StatusTag, WeatherKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who receives a secondary effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    Target,
}

/// Semi-invulnerable position taken while charging a two-turn move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum SemiInvulnerable {
    Flying,
    Underground,
    Underwater,
    Vanished,
}

/// Closed set of secondary effect payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    StatStage { stat: StatKind, stages: i8 },
    Status(StatusTag),
    /// Percentage of damage dealt returned to the user as damage.
    Recoil(u8),
    /// Percentage of damage dealt restored to the user.
    Drain(u8),
    /// Percentage of the recipient's max HP restored.
    Heal(u8),
    SetWeather { weather: WeatherKind, turns: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryEffect {
    pub target: Target,
    /// Proc chance in percent (100 = always).
    pub chance: u8,
    pub kind: EffectKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoTurnSpec {
    /// Spend the first turn charging before the hit lands.
    #[serde(default)]
    pub charges: bool,
    #[serde(default)]
    pub semi_invulnerable: Option<SemiInvulnerable>,
    /// Skip the user's next turn after a landed hit.
    #[serde(default)]
    pub recharge: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitAccuracy {
    /// One roll gates every hit.
    Single,
    /// Roll before each hit; the first miss ends the sequence.
    PerHit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MultiTurnSpec {
    MultiHit {
        min_hits: u8,
        max_hits: u8,
        accuracy: HitAccuracy,
        #[serde(default)]
        per_hit_power: Option<u16>,
    },
    Locking {
        min_turns: u8,
        max_turns: u8,
        power_multiplier: f64,
        #[serde(default)]
        confuses_on_end: bool,
    },
    Trapping {
        min_turns: u8,
        max_turns: u8,
        /// Denominator of the max-HP fraction dealt each end of turn.
        damage_divisor: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub move_type: ElementType,
    pub category: MoveCategory,
    pub power: u16,
    /// `None` never misses.
    pub accuracy: Option<u8>,
    pub max_pp: u8,
    #[serde(default)]
    pub effects: Vec<SecondaryEffect>,
    #[serde(default)]
    pub two_turn: Option<TwoTurnSpec>,
    #[serde(default)]
    pub multi_turn: Option<MultiTurnSpec>,
    #[serde(default)]
    pub first_turn_only: bool,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power > 0
    }

    pub fn charges(&self) -> bool {
        self.two_turn.as_ref().is_some_and(|spec| spec.charges)
    }

    pub fn requires_recharge(&self) -> bool {
        self.two_turn.as_ref().is_some_and(|spec| spec.recharge)
    }

    pub fn is_locking(&self) -> bool {
        matches!(self.multi_turn, Some(MultiTurnSpec::Locking { .. }))
    }

    pub fn targets_opponent(&self) -> bool {
        self.is_damaging()
            || self.effects.is_empty()
            || self.effects.iter().any(|effect| effect.target == Target::Target)
    }
}
