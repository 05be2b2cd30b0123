use crate::catalog::Catalog;
use crate::errors::CatalogResult;
use schema::{
    AbilityId, BaseStats, ElementType, MoveId, SemiInvulnerable, SpeciesId, StatKind, StatusTag,
};
use serde::{Deserialize, Serialize};

pub const MAX_MOVES: usize = 4;

/// The five battle stats (HP is tracked separately on the combatant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

impl Stats {
    pub fn get(&self, stat: StatKind) -> u16 {
        match stat {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::SpecialAttack => self.special_attack,
            StatKind::SpecialDefense => self.special_defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut u16 {
        match stat {
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::SpecialAttack => &mut self.special_attack,
            StatKind::SpecialDefense => &mut self.special_defense,
            StatKind::Speed => &mut self.speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub pp: u8,
    pub max_pp: u8,
}

impl MoveSlot {
    pub fn new(move_id: MoveId, max_pp: u8) -> Self {
        Self {
            move_id,
            pp: max_pp,
            max_pp,
        }
    }

    /// Use the move (decrement PP)
    pub fn use_pp(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub tag: StatusTag,
    pub turns_active: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    pub move_id: MoveId,
    pub turns_remaining: u8,
    pub total_turns: u8,
    pub first_hit_landed: bool,
}

impl LockState {
    /// 1-based index of the turn about to be resolved.
    pub fn current_turn(&self) -> u8 {
        self.total_turns
            .saturating_sub(self.turns_remaining)
            .saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapState {
    pub trapper_id: String,
    pub move_id: MoveId,
    pub turns_remaining: u8,
    pub damage_per_turn: u16,
}

/// Multi-turn commitment. A combatant holds at most one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Commitment {
    #[default]
    Idle,
    Charging {
        move_id: MoveId,
        semi_invulnerable: Option<SemiInvulnerable>,
    },
    Recharging {
        move_id: MoveId,
    },
    Locked(LockState),
    Trapped(TrapState),
}

impl Commitment {
    pub fn is_idle(&self) -> bool {
        matches!(self, Commitment::Idle)
    }

    /// Move the combatant must use instead of its chosen action, if any.
    pub fn forced_move(&self) -> Option<&MoveId> {
        match self {
            Commitment::Charging { move_id, .. } => Some(move_id),
            Commitment::Locked(lock) => Some(&lock.move_id),
            _ => None,
        }
    }

    pub fn semi_invulnerable(&self) -> Option<SemiInvulnerable> {
        match self {
            Commitment::Charging {
                semi_invulnerable, ..
            } => *semi_invulnerable,
            _ => None,
        }
    }

    pub fn is_trapped(&self) -> bool {
        matches!(self, Commitment::Trapped(_))
    }
}

/// Battle-facing instance of a creature.
///
/// The engine mutates combatants in place during a call and never keeps a
/// reference past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub species: SpeciesId,
    pub level: u8,
    pub types: Vec<ElementType>,
    pub current_hp: u16,
    pub max_hp: u16,
    pub stats: Stats,
    pub moves: Vec<MoveSlot>,
    pub ability: Option<AbilityId>,
    pub statuses: Vec<ActiveStatus>,
    pub commitment: Commitment,
}

impl Combatant {
    /// Build a combatant from catalog species data at the given level.
    ///
    /// Without explicit moves the four most recently learned learnset moves are used.
    pub fn from_species(
        catalog: &dyn Catalog,
        id: impl Into<String>,
        species_id: &SpeciesId,
        level: u8,
        moves: Option<Vec<MoveId>>,
    ) -> CatalogResult<Self> {
        let species = catalog.require_species(species_id)?;
        let (max_hp, stats) = Self::calculate_stats(&species.base_stats, level);

        let move_ids = match moves {
            Some(moves) => moves,
            None => {
                let learned = species.moves_up_to(level);
                let skip = learned.len().saturating_sub(MAX_MOVES);
                learned.into_iter().skip(skip).cloned().collect()
            }
        };

        let mut slots = Vec::with_capacity(MAX_MOVES);
        for move_id in move_ids.into_iter().take(MAX_MOVES) {
            let data = catalog.require_move(&move_id)?;
            slots.push(MoveSlot::new(move_id, data.max_pp));
        }

        Ok(Self {
            id: id.into(),
            name: species.name.clone(),
            species: species.id.clone(),
            level,
            types: species.types.clone(),
            current_hp: max_hp,
            max_hp,
            stats,
            moves: slots,
            ability: species.abilities.first().cloned(),
            statuses: Vec::new(),
            commitment: Commitment::Idle,
        })
    }

    /// Level-scaled stats: HP = 2*base*level/100 + level + 10, others = 2*base*level/100 + 5.
    pub fn calculate_stats(base: &BaseStats, level: u8) -> (u16, Stats) {
        let scale = |base: u8| (2 * base as u32 * level as u32) / 100;
        let other = |base: u8| (scale(base) + 5).min(u16::MAX as u32) as u16;

        let hp = (scale(base.hp) + level as u32 + 10).min(u16::MAX as u32) as u16;
        let stats = Stats {
            attack: other(base.attack),
            defense: other(base.defense),
            special_attack: other(base.sp_attack),
            special_defense: other(base.sp_defense),
            speed: other(base.speed),
        };
        (hp, stats)
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }

    /// Take damage, returns true if the combatant fainted from this damage
    pub fn take_damage(&mut self, damage: u16) -> bool {
        let was_fainted = self.is_fainted();
        self.current_hp = self.current_hp.saturating_sub(damage);
        !was_fainted && self.is_fainted()
    }

    /// Restore HP up to max. Fainted combatants are not revived.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    pub fn move_slot(&self, move_id: &MoveId) -> Option<&MoveSlot> {
        self.moves.iter().find(|slot| &slot.move_id == move_id)
    }

    pub fn move_slot_mut(&mut self, move_id: &MoveId) -> Option<&mut MoveSlot> {
        self.moves.iter_mut().find(|slot| &slot.move_id == move_id)
    }

    /// Drop every multi-turn commitment and volatile condition after fainting.
    pub fn on_faint(&mut self) {
        self.commitment = Commitment::Idle;
        self.statuses.retain(|status| status.tag != StatusTag::Confusion);
    }
}
