use crate::battle::engine::{resolve_action, BattleAction};
use crate::battle::state::{ActionFailureReason, BattleContext, BattleEvent, Side, TurnRng};
use crate::battle::tests::common::{context_for, rng_with, test_catalog, TestCombatantBuilder};
use crate::battle::weather::WeatherCondition;
use crate::combatant::Combatant;
use crate::errors::{BattleEngineError, CatalogError};
use pretty_assertions::assert_eq;
use schema::{ElementType, MoveId, StatKind, StatusTag, WeatherKind};

fn duel(moves: &[&str]) -> (Combatant, Combatant, BattleContext) {
    let attacker = TestCombatantBuilder::new("attacker", 50)
        .with_moves(moves)
        .build();
    let defender = TestCombatantBuilder::new("defender", 50)
        .with_moves(&["tackle"])
        .build();
    let context = context_for(&attacker, &defender);
    (attacker, defender, context)
}

fn pp_of(combatant: &Combatant, move_id: &str) -> u8 {
    combatant.move_slot(&MoveId::from(move_id)).unwrap().pp
}

#[test]
fn test_attack_deals_damage_and_spends_pp() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["tackle"]);
    // no crit, top of the damage spread
    let mut rng = rng_with(vec![50, 100]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();

    // floor(floor(22 * 40 * 100 / 100) / 50) + 2 = 19, STAB 1.5
    assert!(result.success);
    assert_eq!(result.damage, Some(28));
    assert_eq!(result.is_critical, Some(false));
    assert_eq!(defender.current_hp, 72);
    assert_eq!(pp_of(&attacker, "tackle"), 34);
    assert_eq!(
        result.effects,
        vec![
            "attacker used Tackle!".to_string(),
            "defender took 28 damage! (72 HP left)".to_string(),
        ]
    );
    assert!(!result.battle_ended);
}

#[test]
fn test_fainted_actor_cannot_act() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["tackle"]);
    attacker.current_hp = 0;
    let mut rng = TurnRng::new_for_test(vec![]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();

    assert!(!result.success);
    assert_eq!(result.effects, vec!["attacker can't battle!".to_string()]);
    assert_eq!(pp_of(&attacker, "tackle"), 35);
}

#[test]
fn test_no_pp_and_unknown_moves_are_refused() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["tackle"]);
    attacker.moves[0].pp = 0;
    let mut rng = TurnRng::new_for_test(vec![]);

    let empty = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();
    assert!(matches!(
        empty.events.last(),
        Some(BattleEvent::ActionFailed {
            reason: ActionFailureReason::NoPPRemaining,
            ..
        })
    ));

    let unknown = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("ember"),
        &mut rng,
    )
    .unwrap();
    assert!(!unknown.success);
    assert_eq!(
        unknown.effects,
        vec!["attacker doesn't know that move!".to_string()]
    );
    assert_eq!(defender.current_hp, 100);
}

#[test]
fn test_missing_catalog_move_errors_before_mutation() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["tackle"]);
    let before = (attacker.clone(), defender.clone());
    let mut rng = TurnRng::new_for_test(vec![]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("no-such-move"),
        &mut rng,
    );

    assert!(matches!(
        result,
        Err(BattleEngineError::Catalog(CatalogError::MoveNotFound(_)))
    ));
    assert_eq!((attacker, defender), before);
}

#[test]
fn test_fainted_target_only_blocks_moves_aimed_at_it() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["tackle", "swords-dance"]);
    defender.current_hp = 0;
    let mut rng = TurnRng::new_for_test(vec![]);

    let blocked = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();
    assert!(!blocked.success);
    assert_eq!(blocked.effects, vec!["But there was no target...".to_string()]);

    let boosted = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("swords-dance"),
        &mut rng,
    )
    .unwrap();
    assert!(boosted.success);
    assert_eq!(context.player_stages.get(StatKind::Attack), 2);
    assert!(boosted
        .effects
        .contains(&"attacker's Attack rose sharply!".to_string()));
}

#[test]
fn test_status_can_skip_the_turn_before_pp_is_spent() {
    let catalog = test_catalog();
    let attacker = TestCombatantBuilder::new("attacker", 50)
        .with_moves(&["tackle"])
        .with_status(StatusTag::Paralysis);
    let mut paralyzed = attacker.build();
    let mut defender = TestCombatantBuilder::new("defender", 50).build();
    let mut context = context_for(&paralyzed, &defender);

    let mut rng = rng_with(vec![10]);
    let result = resolve_action(
        &catalog,
        &mut context,
        &mut paralyzed,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();

    assert!(!result.success);
    assert_eq!(
        result.effects,
        vec!["attacker is paralyzed! It can't move!".to_string()]
    );
    assert_eq!(pp_of(&paralyzed, "tackle"), 35);
    assert_eq!(defender.current_hp, 100);

    let mut sleeper = TestCombatantBuilder::new("sleeper", 50)
        .with_moves(&["tackle"])
        .with_status(StatusTag::Sleep)
        .build();
    let mut context = context_for(&sleeper, &defender);
    let mut no_draws = TurnRng::new_for_test(vec![]);
    let result = resolve_action(
        &catalog,
        &mut context,
        &mut sleeper,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut no_draws,
    )
    .unwrap();
    assert_eq!(result.effects, vec!["sleeper is fast asleep.".to_string()]);
}

#[test]
fn test_confusion_self_hit_uses_the_move_power_against_itself() {
    let catalog = test_catalog();
    let mut attacker = TestCombatantBuilder::new("attacker", 50)
        .with_moves(&["tackle"])
        .with_status(StatusTag::Confusion)
        .build();
    let mut defender = TestCombatantBuilder::new("defender", 50).build();
    let mut context = context_for(&attacker, &defender);
    let mut rng = rng_with(vec![10]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();

    assert!(!result.success);
    assert_eq!(attacker.current_hp, 81);
    assert_eq!(defender.current_hp, 100);
    assert_eq!(pp_of(&attacker, "tackle"), 34);
    assert_eq!(
        result.effects,
        vec![
            "attacker used Tackle!".to_string(),
            "attacker hurt itself in its confusion! (19 damage)".to_string(),
        ]
    );
}

#[test]
fn test_status_moves_roll_accuracy_and_apply() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["thunder-wave"]);

    let mut miss = rng_with(vec![95]);
    let missed = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("thunder-wave"),
        &mut miss,
    )
    .unwrap();
    assert!(!missed.success);
    assert!(missed.effects.contains(&"attacker's attack missed!".to_string()));
    assert!(defender.statuses.is_empty());

    let mut hit = rng_with(vec![50]);
    let landed = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("thunder-wave"),
        &mut hit,
    )
    .unwrap();
    assert!(landed.success);
    assert!(landed
        .effects
        .contains(&"defender is paralyzed! It may be unable to move!".to_string()));
    assert_eq!(pp_of(&attacker, "thunder-wave"), 18);
}

#[test]
fn test_stat_moves_track_the_target_side() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["growl"]);
    let mut rng = TurnRng::new_for_test(vec![]);

    resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("growl"),
        &mut rng,
    )
    .unwrap();

    assert_eq!(context.opponent_stages.get(StatKind::Attack), -1);
    assert_eq!(context.player_stages.get(StatKind::Attack), 0);
}

#[test]
fn test_effectless_moves_report_nothing_happened() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["splash", "recover"]);
    let mut rng = TurnRng::new_for_test(vec![]);

    let splash = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("splash"),
        &mut rng,
    )
    .unwrap();
    assert!(!splash.success);
    assert_eq!(
        splash.effects,
        vec![
            "attacker used Splash!".to_string(),
            "But nothing happened!".to_string(),
        ]
    );

    // Already at full HP
    let recover = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("recover"),
        &mut rng,
    )
    .unwrap();
    assert!(!recover.success);

    attacker.current_hp = 40;
    let healed = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("recover"),
        &mut rng,
    )
    .unwrap();
    assert!(healed.success);
    assert_eq!(attacker.current_hp, 90);
    assert!(healed
        .effects
        .contains(&"attacker recovered 50 HP! (90 HP)".to_string()));
}

#[test]
fn test_secondary_status_procs_on_its_own_roll() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["ember"]);
    // no crit, top spread, burn proc at 5 <= 10
    let mut rng = rng_with(vec![50, 100, 5]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("ember"),
        &mut rng,
    )
    .unwrap();

    assert_eq!(result.damage, Some(19));
    assert_eq!(defender.current_hp, 81);
    assert!(defender
        .statuses
        .iter()
        .any(|status| status.tag == StatusTag::Burn));
}

#[test]
fn test_sunlight_blocks_frostbite_procs() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["ice-beam"]);
    context.weather = Some(WeatherCondition::new(WeatherKind::HarshSunlight, 5));
    let mut rng = rng_with(vec![50, 100, 5]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("ice-beam"),
        &mut rng,
    )
    .unwrap();

    assert!(defender.statuses.is_empty());
    assert!(result
        .effects
        .contains(&"The harsh sunlight protected defender from frostbite!".to_string()));
}

#[test]
fn test_type_immunity_spends_pp_without_rolls() {
    let catalog = test_catalog();
    let mut attacker = TestCombatantBuilder::new("attacker", 50)
        .with_moves(&["tackle"])
        .build();
    let mut ghost = TestCombatantBuilder::new("ghost", 50)
        .with_types(vec![ElementType::Ghost])
        .build();
    let mut context = context_for(&attacker, &ghost);
    let mut rng = TurnRng::new_for_test(vec![]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut ghost,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();

    assert!(!result.success);
    assert_eq!(result.damage, None);
    assert!(result.effects.contains(&"It doesn't affect ghost...".to_string()));
    assert_eq!(pp_of(&attacker, "tackle"), 34);
}

#[test]
fn test_recoil_still_applies_on_a_knockout() {
    let catalog = test_catalog();
    let mut attacker = TestCombatantBuilder::new("attacker", 50)
        .with_moves(&["double-edge"])
        .build();
    let mut defender = TestCombatantBuilder::new("defender", 50)
        .with_current_hp(10)
        .build();
    let mut context = context_for(&attacker, &defender);
    let mut rng = rng_with(vec![50, 100]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("double-edge"),
        &mut rng,
    )
    .unwrap();

    // Damage is capped at remaining HP; recoil is a quarter of that.
    assert_eq!(result.damage, Some(10));
    assert_eq!(attacker.current_hp, 98);
    assert!(defender.is_fainted());
    assert!(result.battle_ended);
    assert_eq!(result.winner, Some(Side::Player));
    assert_eq!(result.fainted, vec!["defender".to_string()]);
    assert!(result.effects.contains(&"defender fainted!".to_string()));
}

#[test]
fn test_drain_heals_from_damage_dealt() {
    let catalog = test_catalog();
    let mut attacker = TestCombatantBuilder::new("attacker", 50)
        .with_moves(&["giga-drain"])
        .with_current_hp(50)
        .build();
    let mut defender = TestCombatantBuilder::new("defender", 50).build();
    let mut context = context_for(&attacker, &defender);
    let mut rng = rng_with(vec![50, 100]);

    resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("giga-drain"),
        &mut rng,
    )
    .unwrap();

    // floor(22 * 75 * 100 / 100 / 50) + 2 = 35, half drained back
    assert_eq!(defender.current_hp, 65);
    assert_eq!(attacker.current_hp, 67);
}

#[test]
fn test_weather_moves_replace_the_weather() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["rain-dance"]);
    context.weather = Some(WeatherCondition::new(WeatherKind::Sandstorm, 2));
    let mut rng = TurnRng::new_for_test(vec![]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("rain-dance"),
        &mut rng,
    )
    .unwrap();

    assert!(result.success);
    assert_eq!(
        context.weather,
        Some(WeatherCondition::new(WeatherKind::Rain, 5))
    );
    assert!(result.effects.contains(&"It started to rain!".to_string()));
}

#[test]
fn test_fog_lowers_accuracy() {
    let catalog = test_catalog();
    let (mut attacker, mut defender, mut context) = duel(&["tackle"]);
    context.weather = Some(WeatherCondition::new(WeatherKind::Fog, 5));
    // 100 * 0.8 = 80; a draw of 85 misses
    let mut rng = rng_with(vec![85]);

    let result = resolve_action(
        &catalog,
        &mut context,
        &mut attacker,
        &mut defender,
        BattleAction::attack("tackle"),
        &mut rng,
    )
    .unwrap();

    assert!(!result.success);
    assert_eq!(defender.current_hp, 100);
}
