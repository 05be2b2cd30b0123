//! Charging and recharging commitments.
//!
//! `Idle -> Charging -> (hit | miss) -> [Recharging] -> Idle`

use crate::battle::state::BattleEvent;
use crate::combatant::{Commitment, Combatant};
use schema::{MoveData, MoveId, SemiInvulnerable};
use tracing::debug;

/// Moves that still connect against a target in the given position.
pub fn counter_moves(position: SemiInvulnerable) -> &'static [&'static str] {
    match position {
        SemiInvulnerable::Flying => &[
            "gust",
            "twister",
            "thunder",
            "sky-uppercut",
            "smack-down",
            "hurricane",
        ],
        SemiInvulnerable::Underground => &["earthquake", "magnitude", "fissure"],
        SemiInvulnerable::Underwater => &["surf", "whirlpool"],
        SemiInvulnerable::Vanished => &[],
    }
}

pub fn can_hit_semi_invulnerable(position: SemiInvulnerable, move_id: &MoveId) -> bool {
    counter_moves(position).contains(&move_id.as_str())
}

/// True when `move_id` is the charged move being released this turn.
pub fn is_second_phase(actor: &Combatant, move_id: &MoveId) -> bool {
    matches!(&actor.commitment, Commitment::Charging { move_id: charged, .. } if charged == move_id)
}

pub fn begin_charge(actor: &mut Combatant, move_data: &MoveData) -> BattleEvent {
    let semi_invulnerable = move_data
        .two_turn
        .as_ref()
        .and_then(|spec| spec.semi_invulnerable);
    actor.commitment = Commitment::Charging {
        move_id: move_data.id.clone(),
        semi_invulnerable,
    };
    debug!(actor = %actor.id, move_id = %move_data.id, "charging");
    BattleEvent::Charging {
        name: actor.name.clone(),
        move_name: move_data.name.clone(),
        semi_invulnerable,
    }
}

/// Leave the charging state before the second-phase strike resolves.
pub fn release_charge(actor: &mut Combatant) {
    if matches!(actor.commitment, Commitment::Charging { .. }) {
        actor.commitment = Commitment::Idle;
    }
}

pub fn begin_recharge(actor: &mut Combatant, move_id: &MoveId) {
    actor.commitment = Commitment::Recharging {
        move_id: move_id.clone(),
    };
}

/// Spend a pending recharge. Returns the event when the turn was consumed.
pub fn consume_recharge(actor: &mut Combatant) -> Option<BattleEvent> {
    if let Commitment::Recharging { .. } = actor.commitment {
        actor.commitment = Commitment::Idle;
        Some(BattleEvent::MustRecharge {
            name: actor.name.clone(),
        })
    } else {
        None
    }
}

/// Drop a charge or lock that was interrupted before it resolved.
pub fn interrupt(actor: &mut Combatant) -> bool {
    match actor.commitment {
        Commitment::Charging { .. } | Commitment::Locked(_) => {
            debug!(actor = %actor.id, "commitment interrupted");
            actor.commitment = Commitment::Idle;
            true
        }
        _ => false,
    }
}
