//! Move selection for computer-controlled combatants.

use crate::battle::abilities::{ability_effect, same_type_multiplier};
use crate::battle::calculators::type_effectiveness;
use crate::battle::conditions::has_status;
use crate::battle::engine::BattleAction;
use crate::battle::state::{BattleContext, TurnRng};
use crate::battle::validation::get_usable_moves;
use crate::catalog::Catalog;
use crate::combatant::Combatant;
use crate::errors::BattleResult;
use ordered_float::OrderedFloat;
use schema::{EffectKind, MoveCategory, MoveData, MoveId, Target};
use tracing::debug;

/// A trait for any system that can decide on a battle action.
pub trait Behavior {
    /// Pick the next action for `actor`. `None` when nothing is usable.
    fn decide_action(
        &self,
        catalog: &dyn Catalog,
        context: &BattleContext,
        actor: &Combatant,
        target: &Combatant,
        rng: &mut TurnRng,
    ) -> BattleResult<Option<BattleAction>>;
}

/// Uniform pick among usable moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAI;

impl Behavior for RandomAI {
    fn decide_action(
        &self,
        catalog: &dyn Catalog,
        context: &BattleContext,
        actor: &Combatant,
        _target: &Combatant,
        rng: &mut TurnRng,
    ) -> BattleResult<Option<BattleAction>> {
        if let Some(action) = BattleAction::committed(actor) {
            return Ok(Some(action));
        }
        let usable = get_usable_moves(catalog, context, actor)?;
        if usable.is_empty() {
            return Ok(None);
        }
        let index = rng.range(0, usable.len() as u32 - 1, "ai move choice") as usize;
        Ok(usable.get(index).cloned().map(BattleAction::attack))
    }
}

/// Greedy scorer: expected damage for attacks, flat utility for status moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringAI;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    /// Assigns a value to using `move_data` against `target`.
    pub fn score_move(
        &self,
        catalog: &dyn Catalog,
        context: &BattleContext,
        actor: &Combatant,
        target: &Combatant,
        move_data: &MoveData,
    ) -> BattleResult<f64> {
        let mut damage_score = 0.0;
        if move_data.category != MoveCategory::Status && move_data.power > 0 {
            let effectiveness =
                type_effectiveness(move_data.move_type, &target.types, context.weather_kind());
            // Immune targets make this a terrible move.
            if effectiveness == 0.0 {
                return Ok(-1.0);
            }
            let ability = ability_effect(catalog, actor)?;
            let stab = same_type_multiplier(&context.rules, ability, actor, move_data.move_type);
            damage_score = move_data.power as f64 * effectiveness * stab;
        }

        let actor_stages = context.stages_of(&actor.id);
        let target_stages = context.stages_of(&target.id);
        let mut utility_score = 0.0;
        for effect in &move_data.effects {
            let chance = effect.chance as f64 / 100.0;
            match (&effect.kind, effect.target) {
                (EffectKind::StatStage { stat, stages }, Target::User) if *stages > 0 => {
                    let current = actor_stages.get(*stat);
                    if current < 6 {
                        let potential_gain = 1.0 - current as f64 / 6.0;
                        utility_score += 20.0 * *stages as f64 * potential_gain * chance;
                    }
                }
                (EffectKind::StatStage { stat, stages }, Target::Target) if *stages < 0 => {
                    if target_stages.get(*stat) > -6 {
                        utility_score += 15.0 * stages.unsigned_abs() as f64 * chance;
                    }
                }
                (EffectKind::Status(tag), Target::Target) => {
                    if !has_status(target, *tag) {
                        utility_score += 45.0 * chance;
                    }
                }
                (EffectKind::Heal(_), Target::User) if actor.current_hp < actor.max_hp => {
                    let missing = 1.0 - actor.current_hp as f64 / actor.max_hp.max(1) as f64;
                    utility_score += 60.0 * missing * chance;
                }
                (EffectKind::SetWeather { weather, .. }, _)
                    if context.weather_kind() != Some(*weather) =>
                {
                    utility_score += 10.0 * chance;
                }
                _ => {}
            }
        }

        if move_data.category == MoveCategory::Status && utility_score < 1.0 {
            return Ok(-1.0);
        }

        let mut score = damage_score + utility_score;
        if move_data.category != MoveCategory::Status {
            // Sure-hit moves get a slight edge.
            let accuracy = move_data.accuracy.map(u16::from).unwrap_or(101);
            score *= accuracy as f64 / 100.0;
        }
        Ok(score)
    }
}

impl Behavior for ScoringAI {
    fn decide_action(
        &self,
        catalog: &dyn Catalog,
        context: &BattleContext,
        actor: &Combatant,
        target: &Combatant,
        _rng: &mut TurnRng,
    ) -> BattleResult<Option<BattleAction>> {
        if let Some(action) = BattleAction::committed(actor) {
            return Ok(Some(action));
        }

        let mut scored: Vec<(MoveId, OrderedFloat<f64>)> = Vec::new();
        for move_id in get_usable_moves(catalog, context, actor)? {
            let move_data = catalog.require_move(&move_id)?;
            let score = self.score_move(catalog, context, actor, target, move_data)?;
            scored.push((move_id, OrderedFloat(score)));
        }

        // Ties keep the earliest move slot.
        let best = scored
            .into_iter()
            .rev()
            .max_by_key(|(_, score)| *score)
            .map(|(move_id, score)| {
                debug!(actor = %actor.id, %move_id, score = score.0, "ai picked move");
                move_id
            });
        Ok(best.map(BattleAction::attack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{test_catalog, TestCombatantBuilder};
    use pretty_assertions::assert_eq;
    use schema::ElementType;

    fn arena(actor: &str, target: &str) -> BattleContext {
        let mut context = BattleContext::new("ai", actor, target);
        context.field.enter(actor);
        context.field.enter(target);
        context
    }

    #[test]
    fn scoring_prefers_super_effective_damage() {
        let catalog = test_catalog();
        let context = arena("striker", "plant");
        let actor = TestCombatantBuilder::new("striker", 30)
            .with_moves(&["tackle", "ember"])
            .build();
        let target = TestCombatantBuilder::new("plant", 30)
            .with_types(vec![ElementType::Grass])
            .build();
        let mut rng = TurnRng::new_for_test(vec![]);

        let action = ScoringAI
            .decide_action(&catalog, &context, &actor, &target, &mut rng)
            .unwrap();
        assert_eq!(action, Some(BattleAction::attack("ember")));
    }

    #[test]
    fn scoring_avoids_immune_targets() {
        let catalog = test_catalog();
        let context = arena("striker", "spirit");
        let actor = TestCombatantBuilder::new("striker", 30)
            .with_moves(&["tackle", "growl"])
            .build();
        let target = TestCombatantBuilder::new("spirit", 30)
            .with_types(vec![ElementType::Ghost])
            .build();
        let mut rng = TurnRng::new_for_test(vec![]);

        let action = ScoringAI
            .decide_action(&catalog, &context, &actor, &target, &mut rng)
            .unwrap();
        assert_eq!(action, Some(BattleAction::attack("growl")));
    }

    #[test]
    fn committed_actors_repeat_their_move() {
        let catalog = test_catalog();
        let context = arena("locked", "foe");
        let mut actor = TestCombatantBuilder::new("locked", 30)
            .with_moves(&["tackle", "outrage"])
            .build();
        crate::battle::multi_turn::begin_lock(&mut actor, &MoveId::from("outrage"), 3);
        let target = TestCombatantBuilder::new("foe", 30).build();
        let mut rng = TurnRng::new_for_test(vec![]);

        for behavior in [&RandomAI as &dyn Behavior, &ScoringAI] {
            let action = behavior
                .decide_action(&catalog, &context, &actor, &target, &mut rng)
                .unwrap();
            assert_eq!(action, Some(BattleAction::attack("outrage")));
        }
    }

    #[test]
    fn no_usable_moves_means_no_action() {
        let catalog = test_catalog();
        let context = arena("empty", "foe");
        let mut actor = TestCombatantBuilder::new("empty", 30)
            .with_moves(&["tackle"])
            .build();
        actor.moves[0].pp = 0;
        let target = TestCombatantBuilder::new("foe", 30).build();
        let mut rng = TurnRng::new_for_test(vec![]);

        assert_eq!(
            RandomAI
                .decide_action(&catalog, &context, &actor, &target, &mut rng)
                .unwrap(),
            None
        );
    }

    #[test]
    fn random_choice_is_drawn_from_usable_moves() {
        let catalog = test_catalog();
        let context = arena("picker", "foe");
        let actor = TestCombatantBuilder::new("picker", 30)
            .with_moves(&["tackle", "growl"])
            .build();
        let target = TestCombatantBuilder::new("foe", 30).build();

        let mut last = TurnRng::new_for_test(vec![100]);
        assert_eq!(
            RandomAI
                .decide_action(&catalog, &context, &actor, &target, &mut last)
                .unwrap(),
            Some(BattleAction::attack("growl"))
        );
    }
}
