//! Escape attempts.

use crate::battle::engine::ActionOutcome;
use crate::battle::state::{ActionFailureReason, BattleContext, BattleEvent, TurnRng};
use crate::combatant::Combatant;
use tracing::info;

/// A level at or above the opponent's always escapes. Otherwise draw
/// `r` in `[0, 2*diff - 1]` and escape when `r < diff`.
pub fn flee_succeeds(actor_level: u8, target_level: u8, guaranteed: bool, rng: &mut TurnRng) -> bool {
    if guaranteed || actor_level >= target_level {
        return true;
    }
    let diff = (target_level - actor_level) as u32;
    rng.range(0, 2 * diff - 1, "flee") < diff
}

pub(crate) fn resolve_flee(
    context: &BattleContext,
    actor: &Combatant,
    target: &Combatant,
    guaranteed: bool,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) {
    if actor.commitment.is_trapped() && !guaranteed {
        outcome.fail(&actor.name, ActionFailureReason::IsTrapped);
        return;
    }

    if flee_succeeds(actor.level, target.level, guaranteed, rng) {
        info!(actor = %actor.id, side = ?context.side_of(&actor.id), "fled");
        outcome.bus.push(BattleEvent::Fled {
            name: actor.name.clone(),
        });
        outcome.result.success = true;
        outcome.result.fled = true;
        outcome.result.battle_ended = true;
        outcome.result.winner = None;
    } else {
        outcome.bus.push(BattleEvent::FleeFailed {
            name: actor.name.clone(),
        });
    }
}
