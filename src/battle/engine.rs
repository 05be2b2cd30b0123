//! Single-action resolution.
//!
//! [`resolve_action`] mutates the actor and target it is handed and returns an
//! [`ActionResult`]. Unknown catalog ids fail with an error before anything is
//! mutated; illegal attempts come back as `success: false` with a reason event.

use crate::battle::abilities::ability_of;
use crate::battle::calculators::{calculate_damage, confusion_damage, type_effectiveness};
use crate::battle::catch;
use crate::battle::conditions;
use crate::battle::flee;
use crate::battle::move_effects::{apply_damage_based_effects, apply_secondary_effects};
use crate::battle::multi_turn;
use crate::battle::state::{
    ActionFailureReason, BattleContext, BattleEvent, EventBus, Side, TurnRng,
};
use crate::battle::two_turn;
use crate::battle::weather;
use crate::catalog::Catalog;
use crate::combatant::{Combatant, Commitment};
use crate::errors::{BattleEngineError, BattleResult};
use schema::{
    BallTier, HitAccuracy, ItemEffect, ItemId, MoveCategory, MoveData, MoveId, MultiTurnSpec,
    StatusTag,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum BattleAction {
    Attack { move_id: MoveId },
    Catch { ball: BallTier },
    Flee { guaranteed: bool },
    UseItem { item_id: ItemId },
    /// Swap the actor out for `incoming`; the outgoing combatant is handed back in the result.
    Switch { incoming: Box<Combatant> },
}

impl BattleAction {
    pub fn attack(move_id: impl Into<MoveId>) -> Self {
        BattleAction::Attack {
            move_id: move_id.into(),
        }
    }

    /// The action a charging, recharging or locked combatant is forced into.
    pub fn committed(combatant: &Combatant) -> Option<Self> {
        match &combatant.commitment {
            Commitment::Recharging { move_id } => Some(Self::attack(move_id.clone())),
            commitment => commitment.forced_move().cloned().map(Self::attack),
        }
    }

    pub fn switch_to(incoming: Combatant) -> Self {
        BattleAction::Switch {
            incoming: Box::new(incoming),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub damage: Option<u16>,
    pub is_critical: Option<bool>,
    pub effects: Vec<String>,
    pub events: Vec<BattleEvent>,
    pub battle_ended: bool,
    pub winner: Option<Side>,
    pub monster_caught: Option<bool>,
    pub fled: bool,
    /// Ball thrown by a catch attempt, spent whether or not the catch worked.
    pub ball_used: Option<BallTier>,
    pub consumed_item: Option<ItemId>,
    /// Ids of combatants that fainted during this action.
    pub fainted: Vec<String>,
    #[serde(skip)]
    pub switched_out: Option<Combatant>,
}

/// In-flight result plus the event bus it is narrated on.
pub(crate) struct ActionOutcome {
    pub(crate) result: ActionResult,
    pub(crate) bus: EventBus,
    down_at_start: Vec<String>,
}

impl ActionOutcome {
    pub(crate) fn new(actor: &Combatant, target: &Combatant) -> Self {
        let down_at_start = [actor, target]
            .into_iter()
            .filter(|combatant| combatant.is_fainted())
            .map(|combatant| combatant.id.clone())
            .collect();
        Self {
            result: ActionResult::default(),
            bus: EventBus::new(),
            down_at_start,
        }
    }

    pub(crate) fn fail(&mut self, name: &str, reason: ActionFailureReason) {
        debug!(name, ?reason, "action refused");
        self.result.success = false;
        self.bus.push(BattleEvent::ActionFailed {
            name: name.to_string(),
            reason,
        });
    }

    fn already_down(&self, id: &str) -> bool {
        self.down_at_start.iter().any(|down| down == id)
            || self.result.fainted.iter().any(|down| down == id)
    }

    fn add_damage(&mut self, dealt: u16, critical: bool) {
        self.result.damage = Some(self.result.damage.unwrap_or(0).saturating_add(dealt));
        self.result.is_critical = Some(self.result.is_critical.unwrap_or(false) || critical);
    }

    pub(crate) fn finish(mut self) -> ActionResult {
        self.result.effects = self.bus.messages();
        self.result.events = self.bus.into_events();
        self.result
    }
}

pub fn resolve_action(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    action: BattleAction,
    rng: &mut TurnRng,
) -> BattleResult<ActionResult> {
    let mut outcome = ActionOutcome::new(actor, target);

    if actor.is_fainted() && !matches!(action, BattleAction::Switch { .. }) {
        outcome.fail(&actor.name, ActionFailureReason::IsFainted);
        return Ok(outcome.finish());
    }

    match action {
        BattleAction::Attack { move_id } => {
            resolve_attack(catalog, context, actor, target, move_id, rng, &mut outcome)?
        }
        BattleAction::Catch { ball } => {
            catch::resolve_catch(catalog, context, actor, target, ball, rng, &mut outcome)?
        }
        BattleAction::Flee { guaranteed } => {
            flee::resolve_flee(context, actor, target, guaranteed, rng, &mut outcome)
        }
        BattleAction::UseItem { item_id } => {
            resolve_item(catalog, context, actor, target, item_id, rng, &mut outcome)?
        }
        BattleAction::Switch { incoming } => {
            resolve_switch(catalog, context, actor, target, *incoming, &mut outcome)?
        }
    }

    Ok(outcome.finish())
}

fn resolve_item(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    item_id: ItemId,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<()> {
    let item = catalog.require_item(&item_id)?;
    outcome.result.consumed_item = Some(item_id.clone());

    match &item.effect {
        ItemEffect::Ball(tier) => {
            catch::resolve_catch(catalog, context, actor, target, *tier, rng, outcome)?;
        }
        ItemEffect::GuaranteedEscape => {
            outcome.bus.push(BattleEvent::ItemUsed {
                user: actor.name.clone(),
                item_name: item.name.clone(),
            });
            flee::resolve_flee(context, actor, target, true, rng, outcome);
        }
        ItemEffect::External(tag) => {
            debug!(item = %item_id, tag, "item applied by inventory owner");
            outcome.bus.push(BattleEvent::ItemUsed {
                user: actor.name.clone(),
                item_name: item.name.clone(),
            });
            outcome.result.success = true;
        }
    }
    Ok(())
}

fn resolve_switch(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    incoming: Combatant,
    outcome: &mut ActionOutcome,
) -> BattleResult<()> {
    let side = context
        .side_of(&actor.id)
        .ok_or_else(|| BattleEngineError::CombatantNotInBattle(actor.id.clone()))?;

    if actor.commitment.is_trapped() && !actor.is_fainted() {
        outcome.fail(&actor.name, ActionFailureReason::IsTrapped);
        return Ok(());
    }
    if incoming.is_fainted() {
        outcome.fail(&incoming.name, ActionFailureReason::SwitchTargetFainted);
        return Ok(());
    }
    if incoming.id == actor.id || incoming.id == target.id {
        outcome.fail(&incoming.name, ActionFailureReason::SwitchTargetActive);
        return Ok(());
    }

    if let Some(move_id) = multi_turn::release_if_trapped_by(target, &actor.id) {
        outcome.bus.push(multi_turn::released_event(
            target,
            &move_name(catalog, &move_id),
        ));
    }

    actor.commitment = Commitment::Idle;
    conditions::remove_status(actor, StatusTag::Confusion);

    let mut outgoing = incoming;
    std::mem::swap(actor, &mut outgoing);
    context.replace_combatant(side, &actor.id);

    info!(out = %outgoing.id, into = %actor.id, ?side, "switched");
    outcome.bus.push(BattleEvent::Switched {
        old_name: outgoing.name.clone(),
        new_name: actor.name.clone(),
    });
    outcome.result.success = true;
    outcome.result.switched_out = Some(outgoing);
    Ok(())
}

fn resolve_attack(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    requested: MoveId,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<()> {
    let move_id = match &actor.commitment {
        Commitment::Recharging { move_id } => move_id.clone(),
        other => other.forced_move().cloned().unwrap_or(requested),
    };
    let move_data = catalog.require_move(&move_id)?;
    ability_of(catalog, actor)?;

    if let Some(event) = two_turn::consume_recharge(actor) {
        outcome.bus.push(event);
        return Ok(());
    }

    let second_phase = two_turn::is_second_phase(actor, &move_id);
    let lock = multi_turn::current_lock(actor, &move_id);
    let continuing = second_phase || lock.as_ref().is_some_and(|lock| lock.first_hit_landed);

    if target.is_fainted() && move_data.targets_opponent() {
        outcome.fail(&actor.name, ActionFailureReason::NoTarget);
        return Ok(());
    }

    if let Some(status) = conditions::should_skip_turn(actor, rng) {
        outcome.bus.push(BattleEvent::TurnSkipped {
            name: actor.name.clone(),
            status,
        });
        two_turn::interrupt(actor);
        return Ok(());
    }

    if !continuing
        && actor.commitment.is_trapped()
        && (move_data.charges() || move_data.requires_recharge() || move_data.is_locking())
    {
        outcome.fail(&actor.name, ActionFailureReason::TrappedCannotCommit);
        return Ok(());
    }

    if !continuing {
        match actor.move_slot_mut(&move_id) {
            None => {
                outcome.fail(&actor.name, ActionFailureReason::MoveNotKnown);
                return Ok(());
            }
            Some(slot) => {
                if !slot.use_pp() {
                    outcome.fail(&actor.name, ActionFailureReason::NoPPRemaining);
                    return Ok(());
                }
            }
        }
    }

    outcome.bus.push(BattleEvent::MoveUsed {
        user: actor.name.clone(),
        move_name: move_data.name.clone(),
    });

    if conditions::should_hit_self(actor, rng) {
        let power = if move_data.power > 0 {
            move_data.power
        } else {
            context.rules.confusion_power
        };
        let stages = context.stages_of(&actor.id);
        let damage = confusion_damage(actor, &stages, power).min(actor.current_hp);
        actor.take_damage(damage);
        outcome.bus.push(BattleEvent::HurtItself {
            name: actor.name.clone(),
            damage,
        });
        two_turn::interrupt(actor);
        check_faints(catalog, context, actor, target, outcome);
        return Ok(());
    }

    if move_data.charges() && !second_phase {
        outcome.bus.push(two_turn::begin_charge(actor, move_data));
        outcome.result.success = true;
        return Ok(());
    }
    if second_phase {
        two_turn::release_charge(actor);
    }

    let landed = match &move_data.multi_turn {
        Some(MultiTurnSpec::MultiHit {
            min_hits,
            max_hits,
            accuracy,
            per_hit_power,
        }) => resolve_multi_hit(
            catalog,
            context,
            actor,
            target,
            move_data,
            (*min_hits, *max_hits),
            *accuracy,
            per_hit_power.unwrap_or(move_data.power),
            rng,
            outcome,
        )?,
        Some(MultiTurnSpec::Locking {
            min_turns,
            max_turns,
            power_multiplier,
            ..
        }) => resolve_locking(
            catalog,
            context,
            actor,
            target,
            move_data,
            (*min_turns, *max_turns),
            *power_multiplier,
            rng,
            outcome,
        )?,
        Some(MultiTurnSpec::Trapping {
            min_turns,
            max_turns,
            damage_divisor,
        }) => resolve_trapping(
            catalog,
            context,
            actor,
            target,
            move_data,
            (*min_turns, *max_turns),
            *damage_divisor,
            rng,
            outcome,
        )?,
        None if move_data.category == MoveCategory::Status => {
            resolve_status_move(context, actor, target, move_data, rng, outcome)
        }
        None => resolve_single_hit(catalog, context, actor, target, move_data, rng, outcome)?,
    };
    outcome.result.success = landed;

    if landed && move_data.requires_recharge() && !actor.is_fainted() {
        two_turn::begin_recharge(actor, &move_id);
    }

    check_faints(catalog, context, actor, target, outcome);
    Ok(())
}

/// Accuracy roll adjusted by weather. Moves without accuracy never miss.
fn accuracy_check(move_data: &MoveData, context: &BattleContext, rng: &mut TurnRng) -> bool {
    let Some(base) = move_data.accuracy else {
        return true;
    };
    let adjusted = (base as f64 * weather::accuracy_multiplier(context.weather_kind()))
        .round()
        .clamp(1.0, 100.0) as u8;
    rng.roll_chance(adjusted, &format!("{} accuracy", move_data.name))
}

/// Semi-invulnerability, accuracy and immunity gates in front of a damaging hit.
fn precheck(
    context: &BattleContext,
    target: &Combatant,
    move_data: &MoveData,
    roll_accuracy: bool,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
    user: &str,
) -> bool {
    if let Some(position) = target.commitment.semi_invulnerable() {
        if !two_turn::can_hit_semi_invulnerable(position, &move_data.id) {
            outcome.bus.push(BattleEvent::AttackAvoided {
                target: target.name.clone(),
            });
            return false;
        }
    }

    if roll_accuracy && !accuracy_check(move_data, context, rng) {
        outcome.bus.push(BattleEvent::MoveMissed {
            user: user.to_string(),
        });
        return false;
    }

    if move_data.is_damaging()
        && type_effectiveness(move_data.move_type, &target.types, context.weather_kind()) == 0.0
    {
        outcome.bus.push(BattleEvent::NoEffect {
            target: target.name.clone(),
        });
        return false;
    }
    true
}

/// Roll and apply one hit. Damage is capped at the target's remaining HP.
fn deal_damage(
    catalog: &dyn Catalog,
    context: &BattleContext,
    actor: &Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    power: u16,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<u16> {
    let damage = calculate_damage(catalog, actor, target, move_data, power, Some(context), rng)?;
    let dealt = damage.damage.min(target.current_hp);
    target.take_damage(dealt);

    if damage.is_critical {
        outcome.bus.push(BattleEvent::CriticalHit);
    }
    outcome.bus.push(BattleEvent::AttackTypeEffectiveness {
        multiplier: damage.effectiveness,
    });
    outcome.bus.push(BattleEvent::DamageDealt {
        target: target.name.clone(),
        damage: dealt,
        remaining_hp: target.current_hp,
    });
    outcome.add_damage(dealt, damage.is_critical);
    debug!(move_id = %move_data.id, dealt, critical = damage.is_critical, "hit");
    Ok(dealt)
}

/// Recoil and drain always follow a landed hit; other effects need a surviving target.
fn finish_damaging_move(
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    damage_dealt: u16,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) {
    apply_damage_based_effects(actor, move_data, damage_dealt, rng, &mut outcome.bus);
    if !target.is_fainted() {
        apply_secondary_effects(context, actor, target, move_data, rng, &mut outcome.bus);
    }
}

fn resolve_single_hit(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<bool> {
    if !precheck(context, target, move_data, true, rng, outcome, &actor.name) {
        return Ok(false);
    }
    let dealt = deal_damage(
        catalog,
        context,
        actor,
        target,
        move_data,
        move_data.power,
        rng,
        outcome,
    )?;
    finish_damaging_move(context, actor, target, move_data, dealt, rng, outcome);
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn resolve_multi_hit(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    (min_hits, max_hits): (u8, u8),
    accuracy: HitAccuracy,
    power: u16,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<bool> {
    let hits = multi_turn::draw_hit_count(min_hits, max_hits, rng);
    let single_roll = accuracy == HitAccuracy::Single;
    if !precheck(context, target, move_data, single_roll, rng, outcome, &actor.name) {
        return Ok(false);
    }

    let mut landed = 0u8;
    let mut total = 0u16;
    for hit in 0..hits {
        if target.is_fainted() {
            break;
        }
        if !single_roll && !accuracy_check(move_data, context, rng) {
            if hit == 0 {
                outcome.bus.push(BattleEvent::MoveMissed {
                    user: actor.name.clone(),
                });
            }
            break;
        }
        total += deal_damage(catalog, context, actor, target, move_data, power, rng, outcome)?;
        landed += 1;
    }

    if landed == 0 {
        return Ok(false);
    }
    outcome.bus.push(BattleEvent::MultiHitCount { hits: landed });
    finish_damaging_move(context, actor, target, move_data, total, rng, outcome);
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn resolve_locking(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    (min_turns, max_turns): (u8, u8),
    power_multiplier: f64,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<bool> {
    if let Some(lock) = multi_turn::current_lock(actor, &move_data.id) {
        let power = multi_turn::lock_power(move_data.power, power_multiplier, lock.current_turn());
        if !precheck(
            context,
            target,
            move_data,
            !lock.first_hit_landed,
            rng,
            outcome,
            &actor.name,
        ) {
            return Ok(false);
        }
        let dealt = deal_damage(catalog, context, actor, target, move_data, power, rng, outcome)?;
        finish_damaging_move(context, actor, target, move_data, dealt, rng, outcome);
        return Ok(true);
    }

    let total_turns = multi_turn::draw_lock_duration(min_turns, max_turns, rng);
    if !precheck(context, target, move_data, true, rng, outcome, &actor.name) {
        return Ok(false);
    }
    let dealt = deal_damage(
        catalog,
        context,
        actor,
        target,
        move_data,
        move_data.power,
        rng,
        outcome,
    )?;
    multi_turn::begin_lock(actor, &move_data.id, total_turns);
    finish_damaging_move(context, actor, target, move_data, dealt, rng, outcome);
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn resolve_trapping(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    (min_turns, max_turns): (u8, u8),
    damage_divisor: u16,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> BattleResult<bool> {
    if !precheck(context, target, move_data, true, rng, outcome, &actor.name) {
        return Ok(false);
    }
    let dealt = deal_damage(
        catalog,
        context,
        actor,
        target,
        move_data,
        move_data.power,
        rng,
        outcome,
    )?;
    finish_damaging_move(context, actor, target, move_data, dealt, rng, outcome);

    if !target.is_fainted() && target.commitment.is_idle() {
        let turns = rng.range(min_turns as u32, max_turns.max(min_turns) as u32, "trap duration")
            as u8;
        if multi_turn::apply_trap(target, &actor.id, &move_data.id, turns, damage_divisor) {
            outcome.bus.push(BattleEvent::Trapped {
                target: target.name.clone(),
                move_name: move_data.name.clone(),
            });
        }
    }
    Ok(true)
}

fn resolve_status_move(
    context: &mut BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    move_data: &MoveData,
    rng: &mut TurnRng,
    outcome: &mut ActionOutcome,
) -> bool {
    if move_data.targets_opponent()
        && !precheck(context, target, move_data, true, rng, outcome, &actor.name)
    {
        return false;
    }

    let events_before = outcome.bus.len();
    let applied = apply_secondary_effects(context, actor, target, move_data, rng, &mut outcome.bus);
    if applied == 0 && outcome.bus.len() == events_before {
        outcome.fail(&actor.name, ActionFailureReason::NothingHappened);
    }
    applied > 0
}

/// Record anyone who dropped to 0 HP during this action and settle the verdict.
fn check_faints(
    catalog: &dyn Catalog,
    context: &BattleContext,
    actor: &mut Combatant,
    target: &mut Combatant,
    outcome: &mut ActionOutcome,
) {
    let target_down = target.is_fainted() && !outcome.already_down(&target.id);
    let actor_down = actor.is_fainted() && !outcome.already_down(&actor.id);

    if target_down {
        record_faint(catalog, target, actor, outcome);
    }
    if actor_down {
        record_faint(catalog, actor, target, outcome);
    }
    if target_down || actor_down {
        outcome.result.battle_ended = true;
        outcome.result.winner = match (target.is_fainted(), actor.is_fainted()) {
            (true, false) => context.side_of(&actor.id),
            (false, true) => context.side_of(&target.id),
            _ => None,
        };
    }
}

fn record_faint(
    catalog: &dyn Catalog,
    fainted: &mut Combatant,
    other: &mut Combatant,
    outcome: &mut ActionOutcome,
) {
    info!(combatant = %fainted.id, "fainted");
    outcome.bus.push(BattleEvent::Fainted {
        name: fainted.name.clone(),
    });
    fainted.on_faint();
    outcome.result.fainted.push(fainted.id.clone());

    if let Some(move_id) = multi_turn::release_if_trapped_by(other, &fainted.id) {
        outcome
            .bus
            .push(multi_turn::released_event(other, &move_name(catalog, &move_id)));
    }
    if matches!(other.commitment, Commitment::Locked(_)) {
        other.commitment = Commitment::Idle;
    }
}

pub(crate) fn move_name(catalog: &dyn Catalog, move_id: &MoveId) -> String {
    catalog
        .move_data(move_id)
        .map(|data| data.name.clone())
        .unwrap_or_else(|| move_id.to_string())
}
