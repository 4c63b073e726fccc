//! Runtime error taxonomy.

use game_core::{CharacterId, CombatSetupError};

use crate::repository::RepositoryError;

/// Errors surfaced by evolution and challenge-progression operations.
///
/// Validation errors abort the requested operation before any state changes;
/// everything the genome codec can repair never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("character `{0}` not found")]
    CharacterNotFound(CharacterId),

    #[error("no active opponent for `{0}`; start a round first")]
    NoOpponent(CharacterId),

    #[error(transparent)]
    Setup(#[from] CombatSetupError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("evaluation task failed: {0}")]
    EvaluationFailed(String),

    #[error("evolution produced an empty population")]
    EmptyPopulation,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
