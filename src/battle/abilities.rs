//! Ability hooks. Abilities fire at battle start and during damage and
//! speed computation only; they never spend a turn or PP.

use crate::battle::rules::BattleRules;
use crate::battle::state::{BattleContext, BattleEvent, Side};
use crate::catalog::Catalog;
use crate::combatant::Combatant;
use crate::errors::CatalogResult;
use schema::{AbilityData, AbilityEffect, ElementType, StatKind, WeatherKind};
use tracing::{debug, trace};

/// Resolve the combatant's ability; combatants without one resolve to `None`.
pub fn ability_of<'a>(
    catalog: &'a dyn Catalog,
    combatant: &Combatant,
) -> CatalogResult<Option<&'a AbilityData>> {
    combatant
        .ability
        .as_ref()
        .map(|id| catalog.require_ability(id))
        .transpose()
}

pub fn ability_effect<'a>(
    catalog: &'a dyn Catalog,
    combatant: &Combatant,
) -> CatalogResult<Option<&'a AbilityEffect>> {
    Ok(ability_of(catalog, combatant)?.map(|data| &data.effect))
}

/// Fire battle-start abilities for both active combatants, player side first.
pub fn apply_battle_start_abilities(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    player: &Combatant,
    opponent: &Combatant,
) -> CatalogResult<Vec<BattleEvent>> {
    let mut events = Vec::new();
    for (side, owner, foe) in [
        (Side::Player, player, opponent),
        (Side::Opponent, opponent, player),
    ] {
        let Some(ability) = ability_of(catalog, owner)? else {
            continue;
        };
        if let AbilityEffect::Intimidate = ability.effect {
            let change = context
                .stages_mut(side.opponent())
                .modify(StatKind::Attack, -1);
            debug!(owner = %owner.id, "intimidate lowered opposing attack");
            events.push(BattleEvent::AbilityTriggered {
                name: owner.name.clone(),
                ability_name: ability.name.clone(),
            });
            events.push(if change.changed() {
                BattleEvent::StatStageChanged {
                    target: foe.name.clone(),
                    stat: StatKind::Attack,
                    old_stage: change.old_stage,
                    new_stage: change.new_stage,
                }
            } else {
                BattleEvent::StatStageLimit {
                    target: foe.name.clone(),
                    stat: StatKind::Attack,
                    rising: false,
                }
            });
        }
    }
    Ok(events)
}

/// Same-type bonus composed with pinch-style ability boosts.
pub fn same_type_multiplier(
    rules: &BattleRules,
    ability: Option<&AbilityEffect>,
    attacker: &Combatant,
    move_type: ElementType,
) -> f64 {
    let mut multiplier = if attacker.has_type(move_type) {
        rules.stab_multiplier
    } else {
        1.0
    };

    if let Some(AbilityEffect::PinchBoost { move_type: specialty }) = ability {
        let in_pinch = attacker.current_hp as u32 * rules.pinch_threshold_divisor as u32
            <= attacker.max_hp as u32;
        if *specialty == move_type && in_pinch {
            trace!(attacker = %attacker.id, "pinch boost active");
            multiplier *= rules.pinch_boost;
        }
    }
    multiplier
}

pub fn speed_multiplier(ability: Option<&AbilityEffect>, weather: Option<WeatherKind>) -> f64 {
    match (ability, weather) {
        (Some(AbilityEffect::WeatherSpeed { weather: kind, multiplier }), Some(active))
            if *kind == active =>
        {
            *multiplier
        }
        _ => 1.0,
    }
}
