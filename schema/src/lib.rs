// Creature battle schema - catalog definitions shared with the battle engine.
// The engine reads these through lookups keyed by id and never mutates them.

pub use battle_data::*;
pub use element_types::*;
pub use ids::*;
pub use move_data::*;
pub use species_data::*;

pub mod battle_data;
pub mod element_types;
pub mod ids;
pub mod move_data;
pub mod species_data;
