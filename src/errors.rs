use schema::{AbilityId, ItemId, MoveId, SpeciesId};
use thiserror::Error;

/// Main error type for the creature battle engine.
///
/// Every variant is raised before the engine mutates any combatant or context,
/// so a caller receiving an `Err` can retry with corrected input.
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// Error related to catalog lookups
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// A combatant referenced by an action is not part of the battle context
    #[error("combatant '{0}' is not part of this battle")]
    CombatantNotInBattle(String),
    /// The action is malformed for the current battle
    #[error("invalid action: {0}")]
    InvalidAction(String),
    /// Battle rules could not be loaded
    #[error("rules configuration error: {0}")]
    Config(String),
}

/// Errors raised by catalog lookups and catalog loading
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("move not found: {0}")]
    MoveNotFound(MoveId),
    #[error("species not found: {0}")]
    SpeciesNotFound(SpeciesId),
    #[error("ability not found: {0}")]
    AbilityNotFound(AbilityId),
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("malformed catalog data: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in the battle engine
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Convenience type alias for catalog lookups
pub type CatalogResult<T> = Result<T, CatalogError>;
