//! Status condition engine.
//!
//! Each [`StatusTag`] maps to a fixed [`StatusConfig`]. The functions here are
//! the only place statuses are added, removed, rolled or ticked.

use crate::battle::state::{BattleEvent, TurnRng};
use crate::combatant::{ActiveStatus, Combatant, Stats};
use schema::{StatKind, StatusTag};
use tracing::debug;

/// Per-tag rules. Fractions are `(numerator, denominator)` of max HP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusConfig {
    pub damage_fraction: Option<(u16, u16)>,
    pub skip_chance: u8,
    pub self_hit_chance: u8,
    pub stat_multipliers: &'static [(StatKind, f64)],
    pub cure_chance: u8,
}

pub fn status_config(tag: StatusTag) -> StatusConfig {
    const NONE: &[(StatKind, f64)] = &[];
    match tag {
        StatusTag::Burn => StatusConfig {
            damage_fraction: Some((1, 16)),
            skip_chance: 0,
            self_hit_chance: 0,
            stat_multipliers: &[(StatKind::Attack, 0.5)],
            cure_chance: 0,
        },
        StatusTag::SevereBurn => StatusConfig {
            damage_fraction: Some((1, 8)),
            skip_chance: 0,
            self_hit_chance: 0,
            stat_multipliers: &[(StatKind::Attack, 0.5)],
            cure_chance: 0,
        },
        StatusTag::Poison => StatusConfig {
            damage_fraction: Some((1, 8)),
            skip_chance: 0,
            self_hit_chance: 0,
            stat_multipliers: NONE,
            cure_chance: 0,
        },
        StatusTag::BadlyPoisoned => StatusConfig {
            damage_fraction: Some((1, 6)),
            skip_chance: 0,
            self_hit_chance: 0,
            stat_multipliers: NONE,
            cure_chance: 0,
        },
        StatusTag::Paralysis => StatusConfig {
            damage_fraction: None,
            skip_chance: 25,
            self_hit_chance: 0,
            stat_multipliers: &[(StatKind::Speed, 0.25)],
            cure_chance: 0,
        },
        StatusTag::Frostbite => StatusConfig {
            damage_fraction: Some((1, 16)),
            skip_chance: 0,
            self_hit_chance: 0,
            stat_multipliers: &[(StatKind::SpecialAttack, 0.5)],
            cure_chance: 20,
        },
        StatusTag::Sleep => StatusConfig {
            damage_fraction: None,
            skip_chance: 100,
            self_hit_chance: 0,
            stat_multipliers: NONE,
            cure_chance: 33,
        },
        StatusTag::Confusion => StatusConfig {
            damage_fraction: None,
            skip_chance: 0,
            self_hit_chance: 33,
            stat_multipliers: NONE,
            cure_chance: 25,
        },
    }
}

/// Tags that cannot be held together with `tag`.
fn excluded_by(tag: StatusTag) -> &'static [StatusTag] {
    match tag {
        StatusTag::Sleep => &[StatusTag::Paralysis, StatusTag::Frostbite],
        StatusTag::Paralysis | StatusTag::Frostbite => &[StatusTag::Sleep],
        StatusTag::Burn => &[StatusTag::SevereBurn],
        StatusTag::SevereBurn => &[StatusTag::Burn],
        StatusTag::Poison => &[StatusTag::BadlyPoisoned],
        StatusTag::BadlyPoisoned => &[StatusTag::Poison],
        StatusTag::Confusion => &[],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusApplication {
    pub applied: bool,
    pub event: BattleEvent,
}

impl StatusApplication {
    pub fn message(&self) -> String {
        self.event.format().unwrap_or_default()
    }
}

pub fn has_status(combatant: &Combatant, tag: StatusTag) -> bool {
    combatant.statuses.iter().any(|status| status.tag == tag)
}

pub fn add_status(combatant: &mut Combatant, tag: StatusTag) -> StatusApplication {
    if has_status(combatant, tag) {
        return StatusApplication {
            applied: false,
            event: BattleEvent::StatusAlreadyPresent {
                target: combatant.name.clone(),
                status: tag,
            },
        };
    }

    if let Some(blocker) = excluded_by(tag)
        .iter()
        .find(|other| has_status(combatant, **other))
    {
        return StatusApplication {
            applied: false,
            event: BattleEvent::StatusBlocked {
                target: combatant.name.clone(),
                status: tag,
                blocker: blocker.to_string(),
            },
        };
    }

    combatant.statuses.push(ActiveStatus {
        tag,
        turns_active: 0,
    });
    debug!(combatant = %combatant.id, %tag, "status applied");
    StatusApplication {
        applied: true,
        event: BattleEvent::StatusApplied {
            target: combatant.name.clone(),
            status: tag,
        },
    }
}

pub fn remove_status(combatant: &mut Combatant, tag: StatusTag) -> bool {
    let before = combatant.statuses.len();
    combatant.statuses.retain(|status| status.tag != tag);
    combatant.statuses.len() != before
}

pub fn clear_all(combatant: &mut Combatant) -> Vec<StatusTag> {
    combatant
        .statuses
        .drain(..)
        .map(|status| status.tag)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndOfTurnDamage {
    pub damage: u16,
    pub events: Vec<BattleEvent>,
}

/// Deal every active tag's damage fraction of max HP (at least 1 each).
pub fn apply_end_of_turn_damage(combatant: &mut Combatant) -> EndOfTurnDamage {
    let mut result = EndOfTurnDamage::default();
    let tags: Vec<StatusTag> = combatant.statuses.iter().map(|status| status.tag).collect();

    for tag in tags {
        if combatant.is_fainted() {
            break;
        }
        let Some((numerator, denominator)) = status_config(tag).damage_fraction else {
            continue;
        };
        let raw = (combatant.max_hp as u32 * numerator as u32) / denominator as u32;
        let damage = (raw.max(1) as u16).min(combatant.current_hp);
        combatant.take_damage(damage);
        result.damage += damage;
        result.events.push(BattleEvent::StatusDamage {
            target: combatant.name.clone(),
            status: tag,
            damage,
        });
    }
    result
}

/// Roll each tag's skip chance in order; the first success stops the turn.
pub fn should_skip_turn(combatant: &Combatant, rng: &mut TurnRng) -> Option<StatusTag> {
    combatant.statuses.iter().map(|status| status.tag).find(|tag| {
        let chance = status_config(*tag).skip_chance;
        chance > 0 && rng.roll_chance(chance, &format!("{} turn skip", tag))
    })
}

pub fn should_hit_self(combatant: &Combatant, rng: &mut TurnRng) -> bool {
    if !has_status(combatant, StatusTag::Confusion) {
        return false;
    }
    let chance = status_config(StatusTag::Confusion).self_hit_chance;
    rng.roll_chance(chance, "confusion self-hit")
}

/// Base stats with every active tag's stat penalties composed multiplicatively.
pub fn get_modified_stats(combatant: &Combatant) -> Stats {
    let mut stats = combatant.stats;
    for status in &combatant.statuses {
        for (stat, multiplier) in status_config(status.tag).stat_multipliers {
            let value = stats.get_mut(*stat);
            *value = ((*value as f64) * multiplier).floor() as u16;
        }
    }
    stats
}

/// Roll each tag's cure chance once. Returns the cured tags; survivors age by one turn.
pub fn process_natural_recovery(combatant: &mut Combatant, rng: &mut TurnRng) -> Vec<StatusTag> {
    let mut cured = Vec::new();
    let mut survivors = Vec::with_capacity(combatant.statuses.len());

    for mut status in combatant.statuses.drain(..) {
        let chance = status_config(status.tag).cure_chance;
        if rng.roll_chance(chance, &format!("{} natural cure", status.tag)) {
            cured.push(status.tag);
        } else {
            status.turns_active = status.turns_active.saturating_add(1);
            survivors.push(status);
        }
    }
    combatant.statuses = survivors;
    cured
}
