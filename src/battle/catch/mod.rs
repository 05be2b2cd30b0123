pub mod calculation;
pub mod validation;

pub use calculation::*;
pub use validation::*;

use crate::battle::engine::ActionOutcome;
use crate::battle::state::{ActionFailureReason, BattleContext, BattleEvent, TurnRng};
use crate::catalog::Catalog;
use crate::combatant::Combatant;
use crate::errors::BattleResult;
use schema::BallTier;
use tracing::info;

/// Throw `ball` at `target`. A refused throw does not spend the ball.
pub(crate) fn resolve_catch(
    catalog: &dyn Catalog,
    context: &BattleContext,
    actor: &Combatant,
    target: &Combatant,
    ball: BallTier,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<()> {
    let species = catalog.require_species(&target.species)?;

    if let Err(refusal) = can_attempt_catch(target) {
        let reason = match refusal {
            CatchError::TargetFainted { .. } => ActionFailureReason::CatchTargetFainted,
            CatchError::TargetOutOfReach { .. } => ActionFailureReason::CatchTargetOutOfReach,
        };
        outcome.fail(&target.name, reason);
        return Ok(());
    }

    let chance = calculate_catch_chance(
        species.rarity,
        target.current_hp,
        target.max_hp,
        ball,
        &context.rules,
    );
    outcome.result.ball_used = Some(ball);
    outcome.bus.push(BattleEvent::CatchAttempted {
        target: target.name.clone(),
        ball,
        chance,
    });

    if roll_catch_success(chance, rng) {
        info!(target = %target.id, chance, "caught");
        outcome.bus.push(BattleEvent::Caught {
            name: target.name.clone(),
        });
        outcome.result.success = true;
        outcome.result.monster_caught = Some(true);
        outcome.result.battle_ended = true;
        outcome.result.winner = context.side_of(&actor.id);
    } else {
        outcome.bus.push(BattleEvent::BrokeFree {
            name: target.name.clone(),
        });
        outcome.result.monster_caught = Some(false);
    }
    Ok(())
}
