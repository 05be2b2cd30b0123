// In: src/battle/move_effects/damage_effects.rs

use crate::battle::state::{BattleEvent, EventBus};
use crate::combatant::Combatant;

/// Heal a percentage of the recipient's max HP. No-op at full HP.
pub(super) fn apply_heal_effect(recipient: &mut Combatant, percent: u8, bus: &mut EventBus) -> bool {
    let amount = (recipient.max_hp as u32 * percent as u32 / 100) as u16;
    let healed = recipient.heal(amount);
    if healed == 0 {
        return false;
    }
    bus.push(BattleEvent::Healed {
        target: recipient.name.clone(),
        amount: healed,
        new_hp: recipient.current_hp,
    });
    true
}

pub(super) fn apply_recoil_effect(
    user: &mut Combatant,
    percent: u8,
    damage_dealt: u16,
    bus: &mut EventBus,
) {
    let recoil = ((damage_dealt as u32 * percent as u32 / 100).max(1) as u16).min(user.current_hp);
    if recoil == 0 {
        return;
    }
    user.take_damage(recoil);
    bus.push(BattleEvent::RecoilDamage {
        user: user.name.clone(),
        damage: recoil,
    });
}

pub(super) fn apply_drain_effect(
    user: &mut Combatant,
    percent: u8,
    damage_dealt: u16,
    bus: &mut EventBus,
) {
    let amount = (damage_dealt as u32 * percent as u32 / 100).max(1) as u16;
    let healed = user.heal(amount);
    if healed > 0 {
        bus.push(BattleEvent::Healed {
            target: user.name.clone(),
            amount: healed,
            new_hp: user.current_hp,
        });
    }
}
