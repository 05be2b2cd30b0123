// In: src/battle/move_effects/stat_effects.rs

use crate::battle::state::{BattleContext, BattleEvent, EventBus};
use crate::combatant::Combatant;
use schema::StatKind;
use tracing::warn;

/// Shift the recipient side's stage. Returns false when already at the limit.
pub(super) fn apply_stat_stage_effect(
    battle: &mut BattleContext,
    recipient: &Combatant,
    stat: StatKind,
    stages: i8,
    bus: &mut EventBus,
) -> bool {
    let Some(side) = battle.side_of(&recipient.id) else {
        warn!(combatant = %recipient.id, "stat change on a combatant outside the battle");
        return false;
    };

    let change = battle.stages_mut(side).modify(stat, stages);
    if change.changed() {
        bus.push(BattleEvent::StatStageChanged {
            target: recipient.name.clone(),
            stat,
            old_stage: change.old_stage,
            new_stage: change.new_stage,
        });
        true
    } else {
        bus.push(BattleEvent::StatStageLimit {
            target: recipient.name.clone(),
            stat,
            rising: stages > 0,
        });
        false
    }
}
