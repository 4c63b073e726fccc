//! Repository error taxonomy.

use game_core::CharacterId;

/// Errors surfaced by challenge-state persistence.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A std lock was poisoned by a panicking writer.
    #[error("repository lock poisoned")]
    LockPoisoned,

    #[error("repository io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("repository serialization error: {0}")]
    Json(String),

    /// Compare-and-swap save lost a race; reload and retry.
    #[error("stale save for `{character}`: saved from version {expected}, store holds {stored}")]
    Conflict {
        character: CharacterId,
        expected: u64,
        stored: u64,
    },
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
