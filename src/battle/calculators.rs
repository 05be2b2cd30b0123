use crate::battle::abilities::{ability_effect, same_type_multiplier};
use crate::battle::rules::BattleRules;
use crate::battle::state::{BattleContext, TurnRng};
use crate::battle::stats::{effective_stat, StatStages};
use crate::battle::weather;
use crate::catalog::Catalog;
use crate::combatant::Combatant;
use crate::errors::BattleResult;
use schema::{ElementType, MoveCategory, MoveData, MoveId, StatKind, WeatherKind};
use tracing::trace;

/// Random inputs of one damage roll, drawn up front so the arithmetic stays pure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRolls {
    pub critical: bool,
    pub random_factor: f64,
}

impl DamageRolls {
    /// Draw the critical-hit roll, then the damage spread.
    pub fn roll(rules: &BattleRules, rng: &mut TurnRng) -> Self {
        let critical = rng.roll_chance(rules.critical_hit_chance, "critical hit");
        let random_factor = rng.random_factor(rules.random_factor_floor, "damage spread");
        Self {
            critical,
            random_factor,
        }
    }

    pub fn fixed(critical: bool, random_factor: f64) -> Self {
        Self {
            critical,
            random_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub is_critical: bool,
    pub effectiveness: f64,
}

impl DamageOutcome {
    fn none() -> Self {
        Self {
            damage: 0,
            is_critical: false,
            effectiveness: 1.0,
        }
    }
}

/// Offensive and defensive stat pair for a category.
pub fn stat_pair(category: MoveCategory) -> Option<(StatKind, StatKind)> {
    match category {
        MoveCategory::Physical => Some((StatKind::Attack, StatKind::Defense)),
        MoveCategory::Special => Some((StatKind::SpecialAttack, StatKind::SpecialDefense)),
        MoveCategory::Status => None,
    }
}

/// Product of effectiveness across all defender types, with weather overrides.
pub fn type_effectiveness(
    move_type: ElementType,
    defender_types: &[ElementType],
    weather: Option<WeatherKind>,
) -> f64 {
    defender_types
        .iter()
        .map(|defending| {
            let base = ElementType::effectiveness(move_type, *defending);
            weather::adjust_effectiveness(weather, move_type, *defending, base)
        })
        .product()
}

/// floor(floor(floor(2L/5 + 2) * P * A / D) / 50) + 2
pub fn base_damage(level: u8, power: u16, attack: u16, defense: u16) -> u32 {
    let level_factor = (2 * level as u32) / 5 + 2;
    let scaled = level_factor * power as u32 * attack as u32 / defense.max(1) as u32;
    scaled / 50 + 2
}

/// `computeDamage`: look the move up and roll for it.
pub fn compute_damage(
    catalog: &dyn Catalog,
    attacker: &Combatant,
    defender: &Combatant,
    move_id: &MoveId,
    context: Option<&BattleContext>,
    rng: &mut TurnRng,
) -> BattleResult<DamageOutcome> {
    let move_data = catalog.require_move(move_id)?;
    calculate_damage(catalog, attacker, defender, move_data, move_data.power, context, rng)
}

/// Damage for `move_data` at an explicit power (multi-hit and locking moves override it).
pub fn calculate_damage(
    catalog: &dyn Catalog,
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    power: u16,
    context: Option<&BattleContext>,
    rng: &mut TurnRng,
) -> BattleResult<DamageOutcome> {
    if power == 0 || move_data.category == MoveCategory::Status {
        return Ok(DamageOutcome::none());
    }
    let default_rules = BattleRules::default();
    let rules = context.map(|ctx| &ctx.rules).unwrap_or(&default_rules);
    let rolls = DamageRolls::roll(rules, rng);
    calculate_damage_with_rolls(catalog, attacker, defender, move_data, power, context, rolls)
}

/// The fixed-order damage pipeline with rolls supplied by the caller.
pub fn calculate_damage_with_rolls(
    catalog: &dyn Catalog,
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    power: u16,
    context: Option<&BattleContext>,
    rolls: DamageRolls,
) -> BattleResult<DamageOutcome> {
    // (a) power and category
    let Some((offense, defense)) = stat_pair(move_data.category) else {
        return Ok(DamageOutcome::none());
    };
    if power == 0 {
        return Ok(DamageOutcome::none());
    }

    let default_rules = BattleRules::default();
    let rules = context.map(|ctx| &ctx.rules).unwrap_or(&default_rules);
    let weather_kind = context.and_then(BattleContext::weather_kind);
    let (attacker_stages, defender_stages) = match context {
        Some(ctx) => (ctx.stages_of(&attacker.id), ctx.stages_of(&defender.id)),
        None => (StatStages::default(), StatStages::default()),
    };

    // (b)-(d) stat pair, status penalties, stages
    let attack = effective_stat(attacker, offense, &attacker_stages);
    let defense_stat = effective_stat(defender, defense, &defender_stages);
    let base = base_damage(attacker.level, power, attack, defense_stat);
    trace!(attack, defense = defense_stat, base, "damage base");

    // (e) same-type bonus and ability boosts
    let ability = ability_effect(catalog, attacker)?;
    let stab = same_type_multiplier(rules, ability, attacker, move_data.move_type);

    // (f) type effectiveness
    let effectiveness = type_effectiveness(move_data.move_type, &defender.types, weather_kind);

    // (g) critical hit
    let critical = if rolls.critical {
        rules.critical_multiplier
    } else {
        1.0
    };

    // (h) weather power
    let weather_power = weather::power_multiplier(weather_kind, move_data.move_type);

    // (i) damage spread
    let product =
        base as f64 * stab * effectiveness * critical * weather_power * rolls.random_factor;
    trace!(
        stab,
        effectiveness,
        critical,
        weather_power,
        random = rolls.random_factor,
        product,
        "damage modifiers"
    );

    // (j) floor and clamp
    let damage = (product.floor() as u32).clamp(1, u16::MAX as u32) as u16;
    Ok(DamageOutcome {
        damage,
        is_critical: rolls.critical,
        effectiveness,
    })
}

/// Confusion self-hit: typeless physical damage against the user's own defense.
pub fn confusion_damage(combatant: &Combatant, stages: &StatStages, power: u16) -> u16 {
    let attack = effective_stat(combatant, StatKind::Attack, stages);
    let defense = effective_stat(combatant, StatKind::Defense, stages);
    base_damage(combatant.level, power, attack, defense).clamp(1, u16::MAX as u32) as u16
}
