use crate::combatant::Combatant;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatchError {
    /// Target has already fainted
    #[error("{name} has fainted and cannot be caught")]
    TargetFainted { name: String },
    /// Target is hidden in a semi-invulnerable position
    #[error("{name} is out of reach")]
    TargetOutOfReach { name: String },
}

/// Validate that a catch attempt can be made against `target`.
pub fn can_attempt_catch(target: &Combatant) -> Result<(), CatchError> {
    if target.is_fainted() {
        return Err(CatchError::TargetFainted {
            name: target.name.clone(),
        });
    }
    if target.commitment.semi_invulnerable().is_some() {
        return Err(CatchError::TargetOutOfReach {
            name: target.name.clone(),
        });
    }
    Ok(())
}
