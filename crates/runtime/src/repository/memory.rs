//! In-memory challenge store for tests and single-process runs.

use std::collections::HashMap;
use std::sync::RwLock;

use game_core::CharacterId;

use crate::challenge::ChallengeState;

use super::error::{RepositoryError, Result};
use super::traits::ChallengeRepository;

#[derive(Debug, Default)]
pub struct InMemoryChallengeRepo {
    states: RwLock<HashMap<CharacterId, ChallengeState>>,
}

impl InMemoryChallengeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeRepository for InMemoryChallengeRepo {
    fn load(&self, character_id: &str) -> Result<Option<ChallengeState>> {
        let states = self
            .states
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(states.get(character_id).cloned())
    }

    fn save(&self, mut state: ChallengeState) -> Result<ChallengeState> {
        let mut states = self
            .states
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if let Some(stored) = states.get(&state.character_id) {
            if stored.version != state.version {
                return Err(RepositoryError::Conflict {
                    character: state.character_id,
                    expected: state.version,
                    stored: stored.version,
                });
            }
        }
        state.version += 1;
        states.insert(state.character_id.clone(), state.clone());
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_bumps_version_and_load_round_trips() {
        let repo = InMemoryChallengeRepo::new();
        let state = ChallengeState::new("hero".to_string());
        let saved = repo.save(state).unwrap();
        assert_eq!(saved.version, 1);

        let loaded = repo.load("hero").unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert!(repo.load("stranger").unwrap().is_none());
    }

    #[test]
    fn stale_save_conflicts() {
        let repo = InMemoryChallengeRepo::new();
        let first = repo.save(ChallengeState::new("hero".to_string())).unwrap();

        // Two writers loaded version 1; the second save must lose.
        let mut a = first.clone();
        a.round = 2;
        let mut b = first;
        b.round = 3;

        repo.save(a).unwrap();
        let err = repo.save(b).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Conflict {
                expected: 1,
                stored: 2,
                ..
            }
        ));
        assert_eq!(repo.load("hero").unwrap().unwrap().round, 2);
    }
}
