//! Persistence contracts.

use crate::challenge::ChallengeState;

use super::error::Result;

/// Versioned challenge-state store.
///
/// `save` is a compare-and-swap: the caller passes the state carrying the
/// version it loaded, and the store accepts it only while that version is
/// still current, persisting with `version + 1`. A lost race returns
/// [`super::RepositoryError::Conflict`]; the caller reloads and retries.
pub trait ChallengeRepository: Send + Sync {
    fn load(&self, character_id: &str) -> Result<Option<ChallengeState>>;

    /// Persist `state` and return it with the bumped version.
    fn save(&self, state: ChallengeState) -> Result<ChallengeState>;
}
