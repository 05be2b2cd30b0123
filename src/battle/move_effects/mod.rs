// In: src/battle/move_effects/mod.rs

mod damage_effects;
mod stat_effects;
mod status_effects;

use crate::battle::state::{BattleContext, EventBus, TurnRng};
use crate::battle::weather;
use crate::combatant::Combatant;
use schema::{EffectKind, MoveData, Target};
use tracing::debug;

use self::{damage_effects::*, stat_effects::*, status_effects::*};

/// Apply the move's secondary effects (procs rolled per effect).
///
/// Damage-relative effects (recoil, drain) are skipped here and resolved by
/// [`apply_damage_based_effects`]. Returns how many effects took hold.
pub fn apply_secondary_effects(
    battle: &mut BattleContext,
    user: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> usize {
    let mut applied = 0;
    for effect in &move_data.effects {
        if matches!(effect.kind, EffectKind::Recoil(_) | EffectKind::Drain(_)) {
            continue;
        }
        let reason = format!("{} secondary effect", move_data.name);
        if !rng.roll_chance(effect.chance, &reason) {
            continue;
        }

        let recipient: &mut Combatant = match effect.target {
            Target::User => &mut *user,
            Target::Target => &mut *target,
        };
        if recipient.is_fainted() {
            continue;
        }

        let took_hold = match &effect.kind {
            EffectKind::StatStage { stat, stages } => {
                apply_stat_stage_effect(battle, recipient, *stat, *stages, bus)
            }
            EffectKind::Status(tag) => apply_status_effect(battle, recipient, *tag, bus),
            EffectKind::Heal(percent) => apply_heal_effect(recipient, *percent, bus),
            EffectKind::SetWeather { weather: kind, turns } => {
                bus.push(weather::set_weather(battle, *kind, *turns));
                true
            }
            EffectKind::Recoil(_) | EffectKind::Drain(_) => false,
        };
        if took_hold {
            applied += 1;
        }
    }
    debug!(move_id = %move_data.id, applied, "secondary effects resolved");
    applied
}

/// Recoil and drain, scaled by the damage the move actually dealt.
pub fn apply_damage_based_effects(
    user: &mut Combatant,
    move_data: &MoveData,
    damage_dealt: u16,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) {
    if damage_dealt == 0 {
        return;
    }
    for effect in &move_data.effects {
        match effect.kind {
            EffectKind::Recoil(percent) if rng.roll_chance(effect.chance, "recoil") => {
                apply_recoil_effect(user, percent, damage_dealt, bus);
            }
            EffectKind::Drain(percent) if rng.roll_chance(effect.chance, "drain") => {
                apply_drain_effect(user, percent, damage_dealt, bus);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{
        context_for, predictable_rng, test_catalog, TestCombatantBuilder,
    };
    use crate::catalog::Catalog;
    use pretty_assertions::assert_eq;
    use schema::{MoveId, StatKind};

    fn move_named(id: &str) -> MoveData {
        match test_catalog().move_data(&MoveId::from(id)) {
            Some(data) => data.clone(),
            None => panic!("fixture has no move {}", id),
        }
    }

    #[test]
    fn stage_changes_stop_at_the_limit() {
        let mut user = TestCombatantBuilder::new("user", 50).build();
        let mut target = TestCombatantBuilder::new("target", 50).build();
        let mut battle = context_for(&user, &target);
        battle.player_stages.set(StatKind::Attack, 6);
        let mut bus = EventBus::new();

        let applied = apply_secondary_effects(
            &mut battle,
            &mut user,
            &mut target,
            &move_named("swords-dance"),
            &mut predictable_rng(),
            &mut bus,
        );

        assert_eq!(applied, 0);
        assert_eq!(
            bus.events(),
            &[BattleEvent::StatStageLimit {
                target: "user".to_string(),
                stat: StatKind::Attack,
                rising: true,
            }]
        );
    }

    #[test]
    fn fainted_recipients_are_skipped() {
        let mut user = TestCombatantBuilder::new("user", 50).build();
        let mut target = TestCombatantBuilder::new("target", 50)
            .with_current_hp(0)
            .build();
        let mut battle = context_for(&user, &target);
        let mut bus = EventBus::new();

        let applied = apply_secondary_effects(
            &mut battle,
            &mut user,
            &mut target,
            &move_named("growl"),
            &mut predictable_rng(),
            &mut bus,
        );

        assert_eq!(applied, 0);
        assert!(bus.is_empty());
        assert_eq!(battle.opponent_stages.get(StatKind::Attack), 0);
    }

    #[test]
    fn recoil_deals_at_least_one() {
        let mut user = TestCombatantBuilder::new("user", 50).build();
        let mut bus = EventBus::new();

        apply_damage_based_effects(
            &mut user,
            &move_named("double-edge"),
            3,
            &mut predictable_rng(),
            &mut bus,
        );

        assert_eq!(user.current_hp, 99);
        assert_eq!(
            bus.messages(),
            vec!["user is hit with recoil! (1 damage)".to_string()]
        );
    }

    #[test]
    fn drain_never_overheals() {
        let mut user = TestCombatantBuilder::new("user", 50)
            .with_current_hp(95)
            .build();
        let mut bus = EventBus::new();

        apply_damage_based_effects(
            &mut user,
            &move_named("giga-drain"),
            40,
            &mut predictable_rng(),
            &mut bus,
        );

        assert_eq!(user.current_hp, 100);
        assert_eq!(
            bus.events(),
            &[BattleEvent::Healed {
                target: "user".to_string(),
                amount: 5,
                new_hp: 100,
            }]
        );
    }

    #[test]
    fn no_damage_means_no_recoil() {
        let mut user = TestCombatantBuilder::new("user", 50).build();
        let mut bus = EventBus::new();

        apply_damage_based_effects(
            &mut user,
            &move_named("double-edge"),
            0,
            &mut predictable_rng(),
            &mut bus,
        );

        assert_eq!(user.current_hp, 100);
        assert!(bus.is_empty());
    }
}
