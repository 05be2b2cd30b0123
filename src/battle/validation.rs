//! Move-level restrictions checked ahead of the resolver.

use crate::battle::state::BattleContext;
use crate::catalog::Catalog;
use crate::combatant::Combatant;
use crate::errors::BattleResult;
use schema::MoveId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveUsability {
    pub can_use: bool,
    pub reason: Option<String>,
}

impl MoveUsability {
    fn usable() -> Self {
        Self {
            can_use: true,
            reason: None,
        }
    }

    fn blocked(reason: impl Into<String>) -> Self {
        Self {
            can_use: false,
            reason: Some(reason.into()),
        }
    }
}

/// Whether `actor_id` may select `move_id` right now.
///
/// First-turn-only moves are checked against field tracking. Known moves and
/// PP are only checked when a combatant snapshot is supplied.
pub fn can_use(
    catalog: &dyn Catalog,
    context: &BattleContext,
    actor_id: &str,
    move_id: &MoveId,
    combatant: Option<&Combatant>,
) -> BattleResult<MoveUsability> {
    let move_data = catalog.require_move(move_id)?;

    if move_data.first_turn_only && context.field.turns_on_field(actor_id) > 0 {
        return Ok(MoveUsability::blocked(format!(
            "{} only works on the first turn on the field",
            move_data.name
        )));
    }

    if let Some(combatant) = combatant {
        match combatant.move_slot(move_id) {
            None => {
                return Ok(MoveUsability::blocked(format!(
                    "{} does not know {}",
                    combatant.name, move_data.name
                )))
            }
            Some(slot) if slot.pp == 0 => {
                return Ok(MoveUsability::blocked(format!(
                    "{} has no PP left",
                    move_data.name
                )))
            }
            Some(_) => {}
        }
    }

    Ok(MoveUsability::usable())
}

/// Every known move `combatant` could select this turn, in move-slot order.
pub fn get_usable_moves(
    catalog: &dyn Catalog,
    context: &BattleContext,
    combatant: &Combatant,
) -> BattleResult<Vec<MoveId>> {
    let mut usable = Vec::new();
    for slot in &combatant.moves {
        if can_use(catalog, context, &combatant.id, &slot.move_id, Some(combatant))?.can_use {
            usable.push(slot.move_id.clone());
        }
    }
    Ok(usable)
}
