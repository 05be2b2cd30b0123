use crate::errors::{BattleEngineError, BattleResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunable constants for one battle. Every field has a default, so a RON
/// document only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    pub critical_hit_chance: u8,
    pub critical_multiplier: f64,
    pub stab_multiplier: f64,
    /// Lower bound (percent) of the damage spread.
    pub random_factor_floor: u8,
    pub catch_cap: u8,
    pub catch_missing_hp_bonus: f64,
    /// Pinch abilities trigger at or below max HP / this divisor.
    pub pinch_threshold_divisor: u16,
    pub pinch_boost: f64,
    /// Power used for a confusion self-hit when the chosen move has none.
    pub confusion_power: u16,
    pub weather_chip_divisor: u16,
    pub default_weather_turns: u8,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            critical_hit_chance: 1,
            critical_multiplier: 2.0,
            stab_multiplier: 1.5,
            random_factor_floor: 85,
            catch_cap: 95,
            catch_missing_hp_bonus: 30.0,
            pinch_threshold_divisor: 3,
            pinch_boost: 1.5,
            confusion_power: 40,
            weather_chip_divisor: 16,
            default_weather_turns: 5,
        }
    }
}

impl BattleRules {
    pub fn from_ron_str(source: &str) -> BattleResult<Self> {
        let rules: BattleRules =
            ron::from_str(source).map_err(|err| BattleEngineError::Config(err.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> BattleResult<Self> {
        let source = fs::read_to_string(path)
            .map_err(|err| BattleEngineError::Config(format!("{}: {}", path.display(), err)))?;
        Self::from_ron_str(&source)
    }

    fn validate(&self) -> BattleResult<()> {
        if self.random_factor_floor == 0 || self.random_factor_floor > 100 {
            return Err(BattleEngineError::Config(format!(
                "random_factor_floor must be within 1..=100, got {}",
                self.random_factor_floor
            )));
        }
        if self.catch_cap > 100 {
            return Err(BattleEngineError::Config(format!(
                "catch_cap must not exceed 100, got {}",
                self.catch_cap
            )));
        }
        if self.pinch_threshold_divisor == 0 || self.weather_chip_divisor == 0 {
            return Err(BattleEngineError::Config(
                "divisors must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
