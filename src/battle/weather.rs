use crate::battle::state::{BattleContext, BattleEvent};
use crate::combatant::Combatant;
use schema::{ElementType, StatusTag, WeatherKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub kind: WeatherKind,
    pub turns_remaining: u8,
}

impl WeatherCondition {
    pub fn new(kind: WeatherKind, turns_remaining: u8) -> Self {
        Self {
            kind,
            turns_remaining,
        }
    }
}

pub fn power_multiplier(weather: Option<WeatherKind>, move_type: ElementType) -> f64 {
    match (weather, move_type) {
        (Some(WeatherKind::HarshSunlight), ElementType::Fire) => 1.5,
        (Some(WeatherKind::HarshSunlight), ElementType::Water) => 0.5,
        (Some(WeatherKind::Rain), ElementType::Water) => 1.5,
        (Some(WeatherKind::Rain), ElementType::Fire) => 0.5,
        _ => 1.0,
    }
}

pub fn accuracy_multiplier(weather: Option<WeatherKind>) -> f64 {
    match weather {
        Some(WeatherKind::Fog) => 0.8,
        _ => 1.0,
    }
}

/// Strong winds cancel Electric, Ice and Rock super-effectiveness against Flying.
pub fn adjust_effectiveness(
    weather: Option<WeatherKind>,
    attacking: ElementType,
    defending: ElementType,
    effectiveness: f64,
) -> f64 {
    let neutralized = matches!(
        attacking,
        ElementType::Electric | ElementType::Ice | ElementType::Rock
    );
    if weather == Some(WeatherKind::StrongWinds)
        && defending == ElementType::Flying
        && neutralized
        && effectiveness > 1.0
    {
        1.0
    } else {
        effectiveness
    }
}

pub fn is_immune_to_chip(weather: WeatherKind, combatant: &Combatant) -> bool {
    match weather {
        WeatherKind::Sandstorm => combatant.types.iter().any(|element| {
            matches!(
                element,
                ElementType::Rock | ElementType::Ground | ElementType::Steel
            )
        }),
        WeatherKind::Hail => combatant.has_type(ElementType::Ice),
        _ => true,
    }
}

/// End-of-turn chip damage: max(1, max_hp / divisor) for non-immune combatants.
pub fn chip_damage(weather: Option<WeatherKind>, combatant: &Combatant, divisor: u16) -> u16 {
    let Some(weather) = weather else {
        return 0;
    };
    if combatant.is_fainted() || is_immune_to_chip(weather, combatant) {
        return 0;
    }
    (combatant.max_hp / divisor.max(1)).max(1)
}

pub fn suppresses_status(weather: Option<WeatherKind>, status: StatusTag) -> bool {
    matches!(
        (weather, status),
        (Some(WeatherKind::HarshSunlight), StatusTag::Frostbite)
    )
}

/// One end-of-turn countdown step.
///
/// Returns the next condition (cleared at zero) and the kind that just ended,
/// which is reported exactly once.
pub fn update_weather_condition(
    condition: Option<WeatherCondition>,
) -> (Option<WeatherCondition>, Option<WeatherKind>) {
    match condition {
        None => (None, None),
        Some(current) if current.turns_remaining <= 1 => (None, Some(current.kind)),
        Some(current) => (
            Some(WeatherCondition::new(current.kind, current.turns_remaining - 1)),
            None,
        ),
    }
}

/// Replace any active weather outright. Zero turns falls back to the rules default.
pub fn set_weather(context: &mut BattleContext, kind: WeatherKind, turns: u8) -> BattleEvent {
    let turns = if turns == 0 {
        context.rules.default_weather_turns
    } else {
        turns
    };
    context.weather = Some(WeatherCondition::new(kind, turns));
    BattleEvent::WeatherStarted { weather: kind }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestCombatantBuilder;
    use rstest::rstest;

    #[rstest]
    #[case(Some(WeatherKind::HarshSunlight), ElementType::Fire, 1.5)]
    #[case(Some(WeatherKind::HarshSunlight), ElementType::Water, 0.5)]
    #[case(Some(WeatherKind::Rain), ElementType::Water, 1.5)]
    #[case(Some(WeatherKind::Rain), ElementType::Fire, 0.5)]
    #[case(Some(WeatherKind::Sandstorm), ElementType::Fire, 1.0)]
    #[case(None, ElementType::Water, 1.0)]
    fn test_weather_power(
        #[case] weather: Option<WeatherKind>,
        #[case] move_type: ElementType,
        #[case] expected: f64,
    ) {
        assert_eq!(power_multiplier(weather, move_type), expected);
    }

    #[test]
    fn countdown_clears_after_exactly_n_updates() {
        let mut condition = Some(WeatherCondition::new(WeatherKind::Rain, 3));
        let mut ended = Vec::new();
        for _ in 0..3 {
            let (next, finished) = update_weather_condition(condition);
            condition = next;
            ended.extend(finished);
        }
        assert_eq!(condition, None);
        assert_eq!(ended, vec![WeatherKind::Rain]);
        assert_eq!(update_weather_condition(condition), (None, None));
    }

    #[test]
    fn sandstorm_spares_rock_types() {
        let rock = TestCombatantBuilder::new("rock", 50)
            .with_types(vec![ElementType::Rock])
            .with_hp(160)
            .build();
        let normal = TestCombatantBuilder::new("normal", 50)
            .with_types(vec![ElementType::Normal])
            .with_hp(160)
            .build();
        assert_eq!(chip_damage(Some(WeatherKind::Sandstorm), &rock, 16), 0);
        assert_eq!(chip_damage(Some(WeatherKind::Sandstorm), &normal, 16), 10);
    }

    #[test]
    fn hail_spares_ice_and_rain_never_chips() {
        let ice = TestCombatantBuilder::new("ice", 50)
            .with_types(vec![ElementType::Ice])
            .build();
        let tiny = TestCombatantBuilder::new("tiny", 2)
            .with_types(vec![ElementType::Normal])
            .with_hp(12)
            .build();
        assert_eq!(chip_damage(Some(WeatherKind::Hail), &ice, 16), 0);
        assert_eq!(chip_damage(Some(WeatherKind::Hail), &tiny, 16), 1);
        assert_eq!(chip_damage(Some(WeatherKind::Rain), &tiny, 16), 0);
    }

    #[test]
    fn strong_winds_only_cancel_super_effective_hits_on_flying() {
        let winds = Some(WeatherKind::StrongWinds);
        assert_eq!(
            adjust_effectiveness(winds, ElementType::Electric, ElementType::Flying, 2.0),
            1.0
        );
        assert_eq!(
            adjust_effectiveness(winds, ElementType::Electric, ElementType::Ground, 0.0),
            0.0
        );
        assert_eq!(
            adjust_effectiveness(winds, ElementType::Fire, ElementType::Flying, 1.0),
            1.0
        );
        assert_eq!(
            adjust_effectiveness(None, ElementType::Rock, ElementType::Flying, 2.0),
            2.0
        );
    }

    #[test]
    fn new_weather_replaces_old() {
        let mut context = BattleContext::new("b", "p", "o").with_weather(WeatherKind::Rain, 2);
        set_weather(&mut context, WeatherKind::Sandstorm, 0);
        assert_eq!(
            context.weather,
            Some(WeatherCondition::new(WeatherKind::Sandstorm, 5))
        );
    }

    #[test]
    fn sunlight_blocks_frostbite_only() {
        let sun = Some(WeatherKind::HarshSunlight);
        assert!(suppresses_status(sun, StatusTag::Frostbite));
        assert!(!suppresses_status(sun, StatusTag::Burn));
        assert!(accuracy_multiplier(Some(WeatherKind::Fog)) < 1.0);
    }
}
