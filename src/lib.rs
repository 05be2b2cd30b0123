// In: src/lib.rs

//! Creature Battle Engine
//!
//! Turn resolution for one-on-one creature battles: damage, status effects,
//! weather, abilities and multi-turn move commitments. All randomness flows
//! through an injected [`TurnRng`], so scripted or seeded battles replay exactly.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod combatant;
pub mod errors;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Re-export the catalog data definitions.
pub use schema::{
    AbilityData, AbilityEffect, AbilityId, BallTier, BaseStats, EffectKind, ElementType,
    ItemData, ItemEffect, ItemId, MoveCategory, MoveData, MoveId, MultiTurnSpec, Rarity,
    SecondaryEffect, SpeciesData, SpeciesId, StatKind, StatusTag, Target, WeatherKind,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine functions and state.
pub use battle::calculators::{compute_damage, DamageOutcome};
pub use battle::engine::{resolve_action, ActionResult, BattleAction};
pub use battle::rules::BattleRules;
pub use battle::state::{BattleContext, BattleEvent, EventBus, Side, TurnRng};
pub use battle::turn_orchestrator::{begin_battle, end_battle, resolve_turn, TurnResult};
pub use battle::validation::{can_use, get_usable_moves, MoveUsability};

// Runtime types and data access.
pub use catalog::{Catalog, MemoryCatalog};
pub use combatant::{Combatant, Commitment};

// Crate-specific error and result types.
pub use errors::{BattleEngineError, BattleResult, CatalogError, CatalogResult};
