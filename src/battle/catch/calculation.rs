use crate::battle::rules::BattleRules;
use crate::battle::state::TurnRng;
use schema::{BallTier, Rarity};

/// Species base catch rate in percent.
pub fn rarity_base_rate(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 70.0,
        Rarity::Uncommon => 50.0,
        Rarity::Rare => 30.0,
        Rarity::Legendary => 10.0,
    }
}

/// Catch chance in percent:
/// (base + bonus * missing_hp_fraction) * ball_modifier, capped at the rules cap.
pub fn calculate_catch_chance(
    rarity: Rarity,
    current_hp: u16,
    max_hp: u16,
    ball: BallTier,
    rules: &BattleRules,
) -> u8 {
    let max_hp = max_hp.max(1) as f64;
    let missing_fraction = (1.0 - current_hp.min(max_hp as u16) as f64 / max_hp).clamp(0.0, 1.0);
    let raw = (rarity_base_rate(rarity) + rules.catch_missing_hp_bonus * missing_fraction)
        * ball.modifier();
    raw.floor().min(rules.catch_cap as f64) as u8
}

/// Roll for catch success using the calculated chance.
pub fn roll_catch_success(chance: u8, rng: &mut TurnRng) -> bool {
    rng.roll_chance(chance, "catch roll")
}

/// Get a descriptive catch chance category for display purposes
pub fn get_catch_chance_description(chance: u8) -> &'static str {
    match chance {
        c if c >= 90 => "Excellent",
        c if c >= 70 => "Very Good",
        c if c >= 50 => "Good",
        c if c >= 30 => "Fair",
        c if c >= 15 => "Poor",
        _ => "Very Poor",
    }
}
