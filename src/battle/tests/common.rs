use crate::battle::conditions::add_status;
use crate::battle::state::{BattleContext, TurnRng};
use crate::catalog::{Catalog, MemoryCatalog};
use crate::combatant::{Combatant, Commitment, MoveSlot, Stats};
use schema::{AbilityId, ElementType, MoveId, SpeciesId, StatusTag};

const TEST_CATALOG: &str = include_str!("fixtures/catalog.ron");

/// The shared fixture catalog.
pub fn test_catalog() -> MemoryCatalog {
    match MemoryCatalog::from_ron_str(TEST_CATALOG) {
        Ok(catalog) => catalog,
        Err(err) => panic!("Failed to parse the fixture catalog: {}", err),
    }
}

/// A builder for creating test combatants with common defaults.
///
/// Defaults: species `testmon`, Normal type, 100 max HP, 100 in every stat,
/// no moves, no ability.
///
/// # Example
/// ```ignore
/// let combatant = TestCombatantBuilder::new("sparky", 25)
///     .with_moves(&["tackle"])
///     .with_status(StatusTag::Paralysis)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    id: String,
    level: u8,
    species: SpeciesId,
    types: Vec<ElementType>,
    max_hp: u16,
    current_hp: Option<u16>,
    stats: Stats,
    moves: Vec<MoveId>,
    ability: Option<AbilityId>,
    statuses: Vec<StatusTag>,
}

impl TestCombatantBuilder {
    /// The id doubles as the display name so messages are easy to assert on.
    pub fn new(id: &str, level: u8) -> Self {
        Self {
            id: id.to_string(),
            level,
            species: SpeciesId::from("testmon"),
            types: vec![ElementType::Normal],
            max_hp: 100,
            current_hp: None,
            stats: Stats {
                attack: 100,
                defense: 100,
                special_attack: 100,
                special_defense: 100,
                speed: 100,
            },
            moves: Vec::new(),
            ability: None,
            statuses: Vec::new(),
        }
    }

    pub fn with_species(mut self, species: &str) -> Self {
        self.species = SpeciesId::from(species);
        self
    }

    pub fn with_types(mut self, types: Vec<ElementType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_stats(
        mut self,
        attack: u16,
        defense: u16,
        special_attack: u16,
        special_defense: u16,
        speed: u16,
    ) -> Self {
        self.stats = Stats {
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
        };
        self
    }

    /// Sets max HP and starts at full health.
    pub fn with_hp(mut self, max_hp: u16) -> Self {
        self.max_hp = max_hp;
        self
    }

    /// Sets current HP below the maximum.
    pub fn with_current_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Move ids from the fixture catalog; PP comes from the catalog entry.
    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = moves.iter().map(|id| MoveId::from(*id)).collect();
        self
    }

    pub fn with_ability(mut self, ability: &str) -> Self {
        self.ability = Some(AbilityId::from(ability));
        self
    }

    pub fn with_status(mut self, status: StatusTag) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn build(self) -> Combatant {
        let catalog = test_catalog();
        let moves = self
            .moves
            .into_iter()
            .map(|move_id| {
                let max_pp = match catalog.move_data(&move_id) {
                    Some(data) => data.max_pp,
                    None => panic!("Fixture catalog has no move {}", move_id),
                };
                MoveSlot::new(move_id, max_pp)
            })
            .collect();

        let mut combatant = Combatant {
            id: self.id.clone(),
            name: self.id,
            species: self.species,
            level: self.level,
            types: self.types,
            current_hp: self.current_hp.unwrap_or(self.max_hp).min(self.max_hp),
            max_hp: self.max_hp,
            stats: self.stats,
            moves,
            ability: self.ability,
            statuses: Vec::new(),
            commitment: Commitment::Idle,
        };
        for status in self.statuses {
            add_status(&mut combatant, status);
        }
        combatant
    }
}

/// Outcomes of 50 everywhere: no crits, hits at 90%+ accuracy, no 25-33% procs.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100])
}

/// Scripted outcomes followed by a tail of neutral 50s.
pub fn rng_with(outcomes: Vec<u8>) -> TurnRng {
    let mut values = outcomes;
    values.extend(std::iter::repeat(50).take(100));
    TurnRng::new_for_test(values)
}

/// A context pairing two combatants, both on their first turn on the field.
pub fn context_for(player: &Combatant, opponent: &Combatant) -> BattleContext {
    let mut context = BattleContext::new("test-battle", player.id.clone(), opponent.id.clone());
    context.field.enter(&player.id);
    context.field.enter(&opponent.id);
    context
}
