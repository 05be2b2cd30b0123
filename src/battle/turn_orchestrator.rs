use crate::battle::abilities::{ability_effect, apply_battle_start_abilities, speed_multiplier};
use crate::battle::conditions;
use crate::battle::engine::{move_name, resolve_action, ActionResult, BattleAction};
use crate::battle::multi_turn;
use crate::battle::state::{BattleContext, BattleEvent, EventBus, Side, TurnRng};
use crate::battle::stats::effective_stat;
use crate::battle::weather;
use crate::catalog::Catalog;
use crate::combatant::{Combatant, Commitment};
use crate::errors::{BattleEngineError, BattleResult};
use schema::{ItemEffect, MultiTurnSpec, StatKind, StatusTag};
use serde::Serialize;
use tracing::{debug, info};

/// Everything that happened during one call to [`resolve_turn`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    pub turn_number: u32,
    /// Acting order, computed once at the start of the turn.
    pub order: [Side; 2],
    pub actions: Vec<(Side, ActionResult)>,
    pub events: Vec<BattleEvent>,
    pub effects: Vec<String>,
    pub battle_ended: bool,
    pub winner: Option<Side>,
    pub fainted: Vec<String>,
    pub monster_caught: Option<bool>,
    pub fled: bool,
    /// Combatants that left the field by switching, handed back to the caller.
    #[serde(skip)]
    pub switched_out: Vec<(Side, Combatant)>,
}

impl TurnResult {
    fn new(turn_number: u32, order: [Side; 2]) -> Self {
        Self {
            turn_number,
            order,
            actions: Vec::new(),
            events: Vec::new(),
            effects: Vec::new(),
            battle_ended: false,
            winner: None,
            fainted: Vec::new(),
            monster_caught: None,
            fled: false,
            switched_out: Vec::new(),
        }
    }

    fn end(&mut self, winner: Option<Side>) {
        self.battle_ended = true;
        self.winner = winner;
    }
}

/// Reset field tracking for a fresh pairing and fire battle-start abilities.
pub fn begin_battle(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    player: &Combatant,
    opponent: &Combatant,
) -> BattleResult<Vec<BattleEvent>> {
    ensure_in_battle(context, player, opponent)?;
    context.field.clear();
    context.field.enter(&player.id);
    context.field.enter(&opponent.id);
    let events = apply_battle_start_abilities(catalog, context, player, opponent)?;
    info!(battle = %context.battle_id, player = %player.id, opponent = %opponent.id, "battle started");
    Ok(events)
}

/// Drop per-battle bookkeeping once the battle is over.
pub fn end_battle(context: &mut BattleContext) {
    context.field.clear();
    context.player_stages.reset();
    context.opponent_stages.reset();
    info!(battle = %context.battle_id, turns = context.turn_number, "battle finished");
}

/// Main entry point for turn resolution.
///
/// Runs both actions in initiative order, then the end-of-turn phase unless
/// the battle already ended. Catalog errors surface before any combatant is
/// touched.
pub fn resolve_turn(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    player: &mut Combatant,
    opponent: &mut Combatant,
    player_action: BattleAction,
    opponent_action: BattleAction,
    rng: &mut TurnRng,
) -> BattleResult<TurnResult> {
    ensure_in_battle(context, player, opponent)?;
    let starters = [player.id.clone(), opponent.id.clone()];

    // 1. Committed combatants ignore the submitted action
    let player_action = BattleAction::committed(player).unwrap_or(player_action);
    let opponent_action = BattleAction::committed(opponent).unwrap_or(opponent_action);
    validate_action(catalog, player, opponent, &player_action)?;
    validate_action(catalog, opponent, player, &opponent_action)?;

    let mut bus = EventBus::new();
    bus.push(BattleEvent::TurnStarted {
        turn_number: context.turn_number,
    });

    // 2. Action prioritization
    let order = determine_action_order(
        catalog,
        context,
        player,
        opponent,
        &player_action,
        &opponent_action,
        rng,
    )?;
    debug!(turn = context.turn_number, ?order, "initiative decided");
    let mut turn = TurnResult::new(context.turn_number, order);

    // 3. Actions
    let mut pending = [Some(player_action), Some(opponent_action)];
    for side in order {
        let Some(action) = pending[side_index(side)].take() else {
            continue;
        };
        let (actor, target) = pair_mut(side, player, opponent);
        let mut result = resolve_action(catalog, context, actor, target, action, rng)?;
        absorb_action(&mut turn, &mut bus, side, &mut result);
        turn.actions.push((side, result));
        if turn.battle_ended {
            break;
        }
    }

    // 4. End-of-turn phase
    if !turn.battle_ended {
        execute_end_turn_phase(catalog, context, player, opponent, order, rng, &mut bus, &mut turn);
    }

    // 5. Finalization
    finalize_turn(context, &starters, player, opponent, &mut bus, &mut turn);
    turn.effects = bus.messages();
    turn.events = bus.into_events();
    Ok(turn)
}

fn ensure_in_battle(
    context: &BattleContext,
    player: &Combatant,
    opponent: &Combatant,
) -> BattleResult<()> {
    if context.player_id != player.id {
        return Err(BattleEngineError::CombatantNotInBattle(player.id.clone()));
    }
    if context.opponent_id != opponent.id {
        return Err(BattleEngineError::CombatantNotInBattle(opponent.id.clone()));
    }
    Ok(())
}

/// Look up every id the action will need so a bad id fails before mutation.
fn validate_action(
    catalog: &dyn Catalog,
    actor: &Combatant,
    target: &Combatant,
    action: &BattleAction,
) -> BattleResult<()> {
    ability_effect(catalog, actor)?;
    match action {
        BattleAction::Attack { move_id } => {
            catalog.require_move(move_id)?;
        }
        BattleAction::Catch { .. } => {
            catalog.require_species(&target.species)?;
        }
        BattleAction::UseItem { item_id } => {
            if let ItemEffect::Ball(_) = catalog.require_item(item_id)?.effect {
                catalog.require_species(&target.species)?;
            }
        }
        BattleAction::Switch { incoming } => {
            ability_effect(catalog, incoming)?;
        }
        BattleAction::Flee { .. } => {}
    }
    Ok(())
}

/// Catch attempts and items first, then switches, then speed.
fn action_priority(action: &BattleAction) -> u8 {
    match action {
        BattleAction::Catch { .. } | BattleAction::UseItem { .. } => 2,
        BattleAction::Switch { .. } => 1,
        BattleAction::Attack { .. } | BattleAction::Flee { .. } => 0,
    }
}

/// Speed after status penalties, stat stages and weather-speed abilities.
pub fn effective_speed(
    catalog: &dyn Catalog,
    context: &BattleContext,
    combatant: &Combatant,
) -> BattleResult<f64> {
    let stages = context.stages_of(&combatant.id);
    let speed = effective_stat(combatant, StatKind::Speed, &stages) as f64;
    let ability = ability_effect(catalog, combatant)?;
    Ok(speed * speed_multiplier(ability, context.weather_kind()))
}

fn determine_action_order(
    catalog: &dyn Catalog,
    context: &BattleContext,
    player: &Combatant,
    opponent: &Combatant,
    player_action: &BattleAction,
    opponent_action: &BattleAction,
    rng: &mut TurnRng,
) -> BattleResult<[Side; 2]> {
    const PLAYER_FIRST: [Side; 2] = [Side::Player, Side::Opponent];
    const OPPONENT_FIRST: [Side; 2] = [Side::Opponent, Side::Player];

    let player_priority = action_priority(player_action);
    let opponent_priority = action_priority(opponent_action);
    if player_priority != opponent_priority {
        return Ok(if player_priority > opponent_priority {
            PLAYER_FIRST
        } else {
            OPPONENT_FIRST
        });
    }

    let player_speed = effective_speed(catalog, context, player)?;
    let opponent_speed = effective_speed(catalog, context, opponent)?;
    Ok(if player_speed > opponent_speed {
        PLAYER_FIRST
    } else if opponent_speed > player_speed {
        OPPONENT_FIRST
    } else if rng.range(0, 1, "speed tie") == 0 {
        PLAYER_FIRST
    } else {
        OPPONENT_FIRST
    })
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Player => 0,
        Side::Opponent => 1,
    }
}

fn pair_mut<'a>(
    side: Side,
    player: &'a mut Combatant,
    opponent: &'a mut Combatant,
) -> (&'a mut Combatant, &'a mut Combatant) {
    match side {
        Side::Player => (player, opponent),
        Side::Opponent => (opponent, player),
    }
}

fn absorb_action(turn: &mut TurnResult, bus: &mut EventBus, side: Side, result: &mut ActionResult) {
    bus.extend(result.events.iter().cloned());
    turn.fainted.extend(result.fainted.iter().cloned());
    if let Some(outgoing) = result.switched_out.take() {
        turn.switched_out.push((side, outgoing));
    }
    if result.monster_caught.is_some() {
        turn.monster_caught = result.monster_caught;
    }
    turn.fled |= result.fled;
    if result.battle_ended {
        turn.end(result.winner);
    }
}

/// Status damage, natural recovery, lock countdown, trap damage, weather
/// damage and weather countdown, in that order. Stops at the first faint.
#[allow(clippy::too_many_arguments)]
fn execute_end_turn_phase(
    catalog: &dyn Catalog,
    context: &mut BattleContext,
    player: &mut Combatant,
    opponent: &mut Combatant,
    order: [Side; 2],
    rng: &mut TurnRng,
    bus: &mut EventBus,
    turn: &mut TurnResult,
) {
    for side in order {
        let (combatant, other) = pair_mut(side, player, opponent);
        if combatant.is_fainted() {
            continue;
        }
        let damage = conditions::apply_end_of_turn_damage(combatant);
        bus.extend(damage.events);
        if settle_faint(catalog, context, combatant, other, bus, turn) {
            return;
        }
    }

    for side in order {
        let (combatant, _) = pair_mut(side, player, opponent);
        if combatant.is_fainted() {
            continue;
        }
        for status in conditions::process_natural_recovery(combatant, rng) {
            bus.push(BattleEvent::StatusCured {
                target: combatant.name.clone(),
                status,
            });
        }
    }

    for side in order {
        let (combatant, _) = pair_mut(side, player, opponent);
        let Some(move_id) = multi_turn::advance_lock(combatant) else {
            continue;
        };
        let confuses = matches!(
            catalog.move_data(&move_id).and_then(|data| data.multi_turn.as_ref()),
            Some(MultiTurnSpec::Locking {
                confuses_on_end: true,
                ..
            })
        );
        let confused = confuses && conditions::add_status(combatant, StatusTag::Confusion).applied;
        bus.push(BattleEvent::LockEnded {
            name: combatant.name.clone(),
            confused,
        });
    }

    for side in order {
        let (combatant, other) = pair_mut(side, player, opponent);
        if combatant.is_fainted() {
            continue;
        }
        let Some(tick) = multi_turn::tick_trap(combatant) else {
            continue;
        };
        let trap_move = move_name(catalog, &tick.move_id);
        bus.push(BattleEvent::TrapDamage {
            target: combatant.name.clone(),
            move_name: trap_move.clone(),
            damage: tick.damage,
        });
        if settle_faint(catalog, context, combatant, other, bus, turn) {
            return;
        }
        if tick.released {
            bus.push(multi_turn::released_event(combatant, &trap_move));
        }
    }

    if let Some(kind) = context.weather_kind() {
        for side in order {
            let (combatant, other) = pair_mut(side, player, opponent);
            let damage =
                weather::chip_damage(Some(kind), combatant, context.rules.weather_chip_divisor);
            if damage == 0 {
                continue;
            }
            let damage = damage.min(combatant.current_hp);
            combatant.take_damage(damage);
            bus.push(BattleEvent::WeatherDamage {
                target: combatant.name.clone(),
                weather: kind,
                damage,
            });
            if settle_faint(catalog, context, combatant, other, bus, turn) {
                return;
            }
        }
    }

    let (next, ended) = weather::update_weather_condition(context.weather);
    context.weather = next;
    if let Some(weather) = ended {
        bus.push(BattleEvent::WeatherEnded { weather });
    }
}

/// Record a faint caused by end-of-turn damage. Returns true when the battle ended.
fn settle_faint(
    catalog: &dyn Catalog,
    context: &BattleContext,
    combatant: &mut Combatant,
    other: &mut Combatant,
    bus: &mut EventBus,
    turn: &mut TurnResult,
) -> bool {
    if !combatant.is_fainted() {
        return false;
    }
    info!(combatant = %combatant.id, "fainted at end of turn");
    bus.push(BattleEvent::Fainted {
        name: combatant.name.clone(),
    });
    combatant.on_faint();
    turn.fainted.push(combatant.id.clone());

    if let Some(move_id) = multi_turn::release_if_trapped_by(other, &combatant.id) {
        bus.push(multi_turn::released_event(other, &move_name(catalog, &move_id)));
    }
    if matches!(other.commitment, Commitment::Locked(_)) {
        other.commitment = Commitment::Idle;
    }

    let winner = if other.is_fainted() {
        None
    } else {
        context.side_of(&other.id)
    };
    turn.end(winner);
    true
}

/// Only combatants that started the turn on the field count it as served; a
/// mid-turn replacement is still on its first turn next time it acts.
fn finalize_turn(
    context: &mut BattleContext,
    starters: &[String; 2],
    player: &Combatant,
    opponent: &Combatant,
    bus: &mut EventBus,
    turn: &mut TurnResult,
) {
    for active in [player, opponent] {
        if starters.contains(&active.id) {
            context.field.advance(&active.id);
        }
    }
    context.turn_number += 1;

    bus.push(BattleEvent::TurnEnded);
    if turn.battle_ended {
        info!(battle = %context.battle_id, winner = ?turn.winner, "battle ended");
        bus.push(BattleEvent::BattleEnded { winner: turn.winner });
    }
}
