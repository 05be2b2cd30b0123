use crate::{AbilityId, ElementType, MoveId, SpeciesId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnsetEntry {
    pub level: u8,
    pub move_id: MoveId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub name: String,
    pub types: Vec<ElementType>,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
    #[serde(default)]
    pub learnset: Vec<LearnsetEntry>,
    pub rarity: Rarity,
}

impl SpeciesData {
    /// Moves learned at or below `level`, in the order they are learned.
    pub fn moves_up_to(&self, level: u8) -> Vec<&MoveId> {
        let mut entries: Vec<&LearnsetEntry> = self
            .learnset
            .iter()
            .filter(|entry| entry.level <= level)
            .collect();
        entries.sort_by_key(|entry| entry.level);
        entries.into_iter().map(|entry| &entry.move_id).collect()
    }
}
