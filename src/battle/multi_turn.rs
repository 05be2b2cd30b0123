//! Multi-hit, locking and trapping bookkeeping.

use crate::battle::state::{BattleEvent, TurnRng};
use crate::combatant::{Commitment, Combatant, LockState, TrapState};
use schema::MoveId;
use tracing::debug;

pub fn draw_hit_count(min_hits: u8, max_hits: u8, rng: &mut TurnRng) -> u8 {
    rng.range(min_hits as u32, max_hits.max(min_hits) as u32, "multi-hit count") as u8
}

/// Power on the `current_turn`-th (1-based) turn of a lock.
pub fn lock_power(base_power: u16, multiplier: f64, current_turn: u8) -> u16 {
    let exponent = current_turn.saturating_sub(1) as i32;
    let scaled = base_power as f64 * multiplier.powi(exponent);
    scaled.floor().min(u16::MAX as f64) as u16
}

pub fn draw_lock_duration(min_turns: u8, max_turns: u8, rng: &mut TurnRng) -> u8 {
    rng.range(min_turns as u32, max_turns.max(min_turns) as u32, "lock duration") as u8
}

pub fn begin_lock(actor: &mut Combatant, move_id: &MoveId, total_turns: u8) {
    debug!(actor = %actor.id, %move_id, total_turns, "locked in");
    actor.commitment = Commitment::Locked(LockState {
        move_id: move_id.clone(),
        turns_remaining: total_turns,
        total_turns,
        first_hit_landed: true,
    });
}

pub fn current_lock(actor: &Combatant, move_id: &MoveId) -> Option<LockState> {
    match &actor.commitment {
        Commitment::Locked(lock) if &lock.move_id == move_id => Some(lock.clone()),
        _ => None,
    }
}

/// End-of-turn countdown. Returns the move whose lock just ran out.
pub fn advance_lock(actor: &mut Combatant) -> Option<MoveId> {
    let Commitment::Locked(lock) = &mut actor.commitment else {
        return None;
    };
    lock.turns_remaining = lock.turns_remaining.saturating_sub(1);
    if lock.turns_remaining > 0 {
        return None;
    }
    let finished = lock.move_id.clone();
    actor.commitment = Commitment::Idle;
    Some(finished)
}

/// Fixed per-turn trap damage, computed once when the trap lands.
pub fn trap_damage(victim_max_hp: u16, divisor: u16) -> u16 {
    (victim_max_hp / divisor.max(1)).max(1)
}

/// Trap an idle victim. Victims already committed to something else are left alone.
pub fn apply_trap(
    victim: &mut Combatant,
    trapper_id: &str,
    move_id: &MoveId,
    turns: u8,
    divisor: u16,
) -> bool {
    if !victim.commitment.is_idle() || victim.is_fainted() {
        return false;
    }
    victim.commitment = Commitment::Trapped(TrapState {
        trapper_id: trapper_id.to_string(),
        move_id: move_id.clone(),
        turns_remaining: turns,
        damage_per_turn: trap_damage(victim.max_hp, divisor),
    });
    true
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrapTick {
    pub move_id: MoveId,
    pub damage: u16,
    pub released: bool,
}

/// Deal this turn's trap damage and count down; the trap clears at zero.
pub fn tick_trap(victim: &mut Combatant) -> Option<TrapTick> {
    let Commitment::Trapped(trap) = &mut victim.commitment else {
        return None;
    };
    let damage = trap.damage_per_turn.min(victim.current_hp);
    trap.turns_remaining = trap.turns_remaining.saturating_sub(1);
    let released = trap.turns_remaining == 0;
    let move_id = trap.move_id.clone();

    victim.take_damage(damage);
    if released {
        victim.commitment = Commitment::Idle;
    }
    Some(TrapTick {
        move_id,
        damage,
        released,
    })
}

/// Free a victim held by `trapper_id`, e.g. when the trapper leaves the field.
pub fn release_if_trapped_by(victim: &mut Combatant, trapper_id: &str) -> Option<MoveId> {
    match &victim.commitment {
        Commitment::Trapped(trap) if trap.trapper_id == trapper_id => {
            let move_id = trap.move_id.clone();
            victim.commitment = Commitment::Idle;
            Some(move_id)
        }
        _ => None,
    }
}

pub fn released_event(victim: &Combatant, move_name: &str) -> BattleEvent {
    BattleEvent::TrapReleased {
        target: victim.name.clone(),
        move_name: move_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestCombatantBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn lock_power_scales_geometrically() {
        assert_eq!(lock_power(30, 2.0, 1), 30);
        assert_eq!(lock_power(30, 2.0, 2), 60);
        assert_eq!(lock_power(30, 2.0, 5), 480);
        assert_eq!(lock_power(120, 1.0, 3), 120);
    }

    #[test]
    fn lock_counts_down_to_idle() {
        let mut actor = TestCombatantBuilder::new("roller", 20).build();
        let rollout = MoveId::from("rollout");
        begin_lock(&mut actor, &rollout, 2);
        assert_eq!(current_lock(&actor, &rollout).unwrap().current_turn(), 1);
        assert_eq!(advance_lock(&mut actor), None);
        assert_eq!(current_lock(&actor, &rollout).unwrap().current_turn(), 2);
        assert_eq!(advance_lock(&mut actor), Some(rollout));
        assert!(actor.commitment.is_idle());
    }

    #[test]
    fn trap_ticks_fixed_damage_until_freed() {
        let mut victim = TestCombatantBuilder::new("prey", 30).with_hp(80).build();
        let wrap = MoveId::from("wrap");
        assert!(apply_trap(&mut victim, "snake", &wrap, 2, 8));

        let first = tick_trap(&mut victim).unwrap();
        assert_eq!((first.damage, first.released), (10, false));
        victim.current_hp = 40;
        let second = tick_trap(&mut victim).unwrap();
        assert_eq!((second.damage, second.released), (10, true));
        assert_eq!(victim.current_hp, 30);
        assert!(tick_trap(&mut victim).is_none());
    }

    #[test]
    fn committed_victims_are_not_trapped() {
        let mut victim = TestCombatantBuilder::new("prey", 30).build();
        begin_lock(&mut victim, &MoveId::from("outrage"), 3);
        assert!(!apply_trap(&mut victim, "snake", &MoveId::from("wrap"), 4, 8));
    }

    #[test]
    fn only_the_owning_trapper_releases() {
        let mut victim = TestCombatantBuilder::new("prey", 30).build();
        apply_trap(&mut victim, "snake", &MoveId::from("wrap"), 4, 8);
        assert_eq!(release_if_trapped_by(&mut victim, "someone-else"), None);
        assert_eq!(
            release_if_trapped_by(&mut victim, "snake"),
            Some(MoveId::from("wrap"))
        );
    }

    #[test]
    fn hit_count_stays_within_bounds() {
        let mut rng = TurnRng::from_seed(11);
        for _ in 0..200 {
            let hits = draw_hit_count(2, 5, &mut rng);
            assert!((2..=5).contains(&hits));
        }
    }
}
