//! JSON-file challenge store, one file per character.

use std::fs;
use std::path::{Path, PathBuf};

use crate::challenge::ChallengeState;

use super::error::{RepositoryError, Result};
use super::traits::ChallengeRepository;

#[derive(Debug)]
pub struct FileChallengeRepo {
    dir: PathBuf,
}

impl FileChallengeRepo {
    /// Open a store rooted at `dir`, creating it if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn state_path(&self, character_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(character_id)))
    }

    fn read_state(&self, path: &Path) -> Result<Option<ChallengeState>> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl ChallengeRepository for FileChallengeRepo {
    fn load(&self, character_id: &str) -> Result<Option<ChallengeState>> {
        self.read_state(&self.state_path(character_id))
    }

    fn save(&self, mut state: ChallengeState) -> Result<ChallengeState> {
        let path = self.state_path(&state.character_id);
        if let Some(stored) = self.read_state(&path)? {
            if stored.version != state.version {
                return Err(RepositoryError::Conflict {
                    character: state.character_id,
                    expected: state.version,
                    stored: stored.version,
                });
            }
        }
        state.version += 1;

        // Write-then-rename so a crash never leaves a torn state file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&state)?)?;
        fs::rename(&tmp, &path)?;
        Ok(state)
    }
}

/// Keep file names flat and predictable; ids are caller-controlled.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileChallengeRepo::new(dir.path()).unwrap();

        let mut state = ChallengeState::new("hero".to_string());
        state.round = 3;
        let saved = repo.save(state).unwrap();
        assert_eq!(saved.version, 1);

        let loaded = repo.load("hero").unwrap().unwrap();
        assert_eq!(loaded.round, 3);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn sanitizes_hostile_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileChallengeRepo::new(dir.path()).unwrap();

        let saved = repo
            .save(ChallengeState::new("../../etc/passwd".to_string()))
            .unwrap();
        assert_eq!(saved.version, 1);
        assert!(repo.load("../../etc/passwd").unwrap().is_some());
        // The state file must land inside the store directory.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn stale_save_conflicts_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileChallengeRepo::new(dir.path()).unwrap();
        let first = repo.save(ChallengeState::new("hero".to_string())).unwrap();

        let mut stale = first.clone();
        stale.version = 0;
        assert!(matches!(
            repo.save(stale),
            Err(RepositoryError::Conflict { .. })
        ));
    }
}
