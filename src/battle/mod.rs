pub mod abilities;
pub mod ai;
pub mod calculators;
pub mod catch;
pub mod conditions;
pub mod engine;
pub mod flee;
pub mod move_effects;
pub mod multi_turn;
pub mod rules;
pub mod state;
pub mod stats;
pub mod turn_orchestrator;
pub mod two_turn;
pub mod validation;
pub mod weather;

#[cfg(test)]
mod tests;
