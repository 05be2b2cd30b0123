// In: src/battle/move_effects/status_effects.rs

use crate::battle::conditions::add_status;
use crate::battle::state::{BattleContext, BattleEvent, EventBus};
use crate::battle::weather;
use crate::combatant::Combatant;
use schema::StatusTag;

pub(super) fn apply_status_effect(
    battle: &BattleContext,
    recipient: &mut Combatant,
    tag: StatusTag,
    bus: &mut EventBus,
) -> bool {
    if let Some(active) = battle.weather_kind() {
        if weather::suppresses_status(Some(active), tag) {
            bus.push(BattleEvent::WeatherSuppressedStatus {
                target: recipient.name.clone(),
                weather: active,
                status: tag,
            });
            return false;
        }
    }

    let application = add_status(recipient, tag);
    bus.push(application.event);
    application.applied
}
