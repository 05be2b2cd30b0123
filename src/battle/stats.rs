use crate::battle::conditions::get_modified_stats;
use crate::combatant::Combatant;
use schema::StatKind;
use serde::{Deserialize, Serialize};

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// Per-side stat stages, each clamped to [-6, +6].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatStages {
    pub attack: i8,
    pub defense: i8,
    pub special_attack: i8,
    pub special_defense: i8,
    pub speed: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub old_stage: i8,
    pub new_stage: i8,
}

impl StageChange {
    pub fn changed(&self) -> bool {
        self.old_stage != self.new_stage
    }
}

impl StatStages {
    pub fn get(&self, stat: StatKind) -> i8 {
        match stat {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::SpecialAttack => self.special_attack,
            StatKind::SpecialDefense => self.special_defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: StatKind, stage: i8) {
        let clamped = stage.clamp(MIN_STAGE, MAX_STAGE);
        match stat {
            StatKind::Attack => self.attack = clamped,
            StatKind::Defense => self.defense = clamped,
            StatKind::SpecialAttack => self.special_attack = clamped,
            StatKind::SpecialDefense => self.special_defense = clamped,
            StatKind::Speed => self.speed = clamped,
        }
    }

    pub fn modify(&mut self, stat: StatKind, delta: i8) -> StageChange {
        let old_stage = self.get(stat);
        self.set(stat, old_stage.saturating_add(delta));
        StageChange {
            old_stage,
            new_stage: self.get(stat),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stage multiplier.
/// Negative stages: 2 / (2 + |stage|)
/// Positive stages: (2 + stage) / 2
pub fn stage_multiplier(stage: i8) -> f64 {
    let clamped = stage.clamp(MIN_STAGE, MAX_STAGE);
    if clamped < 0 {
        2.0 / (2.0 + (-clamped) as f64)
    } else {
        (2.0 + clamped as f64) / 2.0
    }
}

pub fn apply_stat_stage_multiplier(base_stat: u16, stage: i8) -> u16 {
    if stage == 0 {
        return base_stat;
    }
    ((base_stat as f64) * stage_multiplier(stage)).round() as u16
}

/// Stat after status penalties, then stage multipliers.
pub fn effective_stat(combatant: &Combatant, stat: StatKind, stages: &StatStages) -> u16 {
    let modified = get_modified_stats(combatant).get(stat);
    apply_stat_stage_multiplier(modified, stages.get(stat))
}
