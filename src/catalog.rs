//! Read-only catalog lookups.
//!
//! The engine never owns game data. It asks a [`Catalog`] for move, species,
//! ability and item definitions by id; [`MemoryCatalog`] is the in-process
//! implementation, loadable from a single RON document.

use crate::errors::{CatalogError, CatalogResult};
use schema::{
    AbilityData, AbilityId, ItemData, ItemId, MoveData, MoveId, SpeciesData, SpeciesId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

pub trait Catalog {
    fn move_data(&self, id: &MoveId) -> Option<&MoveData>;
    fn species(&self, id: &SpeciesId) -> Option<&SpeciesData>;
    fn ability(&self, id: &AbilityId) -> Option<&AbilityData>;
    fn item(&self, id: &ItemId) -> Option<&ItemData>;

    fn require_move(&self, id: &MoveId) -> CatalogResult<&MoveData> {
        self.move_data(id)
            .ok_or_else(|| CatalogError::MoveNotFound(id.clone()))
    }

    fn require_species(&self, id: &SpeciesId) -> CatalogResult<&SpeciesData> {
        self.species(id)
            .ok_or_else(|| CatalogError::SpeciesNotFound(id.clone()))
    }

    fn require_ability(&self, id: &AbilityId) -> CatalogResult<&AbilityData> {
        self.ability(id)
            .ok_or_else(|| CatalogError::AbilityNotFound(id.clone()))
    }

    fn require_item(&self, id: &ItemId) -> CatalogResult<&ItemData> {
        self.item(id)
            .ok_or_else(|| CatalogError::ItemNotFound(id.clone()))
    }
}

/// On-disk shape of a catalog document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub moves: Vec<MoveData>,
    #[serde(default)]
    pub species: Vec<SpeciesData>,
    #[serde(default)]
    pub abilities: Vec<AbilityData>,
    #[serde(default)]
    pub items: Vec<ItemData>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    moves: HashMap<MoveId, MoveData>,
    species: HashMap<SpeciesId, SpeciesData>,
    abilities: HashMap<AbilityId, AbilityData>,
    items: HashMap<ItemId, ItemData>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: CatalogFile) -> Self {
        let mut catalog = Self::new();
        file.moves.into_iter().for_each(|data| catalog.insert_move(data));
        file.species
            .into_iter()
            .for_each(|data| catalog.insert_species(data));
        file.abilities
            .into_iter()
            .for_each(|data| catalog.insert_ability(data));
        file.items.into_iter().for_each(|data| catalog.insert_item(data));
        catalog
    }

    pub fn from_ron_str(source: &str) -> CatalogResult<Self> {
        let file: CatalogFile = ron::from_str(source)?;
        Ok(Self::from_file(file))
    }

    /// Load a catalog document from disk.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let source = fs::read_to_string(path)?;
        let catalog = Self::from_ron_str(&source)?;
        info!(
            path = %path.display(),
            moves = catalog.moves.len(),
            species = catalog.species.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    pub fn insert_move(&mut self, data: MoveData) {
        self.moves.insert(data.id.clone(), data);
    }

    pub fn insert_species(&mut self, data: SpeciesData) {
        self.species.insert(data.id.clone(), data);
    }

    pub fn insert_ability(&mut self, data: AbilityData) {
        self.abilities.insert(data.id.clone(), data);
    }

    pub fn insert_item(&mut self, data: ItemData) {
        self.items.insert(data.id.clone(), data);
    }
}

impl Catalog for MemoryCatalog {
    fn move_data(&self, id: &MoveId) -> Option<&MoveData> {
        self.moves.get(id)
    }

    fn species(&self, id: &SpeciesId) -> Option<&SpeciesData> {
        self.species.get(id)
    }

    fn ability(&self, id: &AbilityId) -> Option<&AbilityData> {
        self.abilities.get(id)
    }

    fn item(&self, id: &ItemId) -> Option<&ItemData> {
        self.items.get(id)
    }
}
