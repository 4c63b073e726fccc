//! Persistent challenge progression state.
//!
//! One [`ChallengeState`] exists per character, created on first access and
//! never deleted. Everything here serializes with serde so the file
//! repository can store states as plain JSON.

use chrono::{DateTime, Utc};
use game_core::{
    AbilityId, BasicType, CharacterId, CharacterSnapshot, Genome, Tick,
};
use serde::{Deserialize, Serialize};

/// How the last fight ended, from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightOutcome {
    Victory,
    Defeat,
    /// Iteration cap reached; progression state is left untouched.
    Timeout,
}

/// Reward granted for a victorious round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub xp: u64,
    pub gold: u64,
    pub multiplier: f64,
}

/// Aggregates of the player's most recent fight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FightMetrics {
    pub damage_to_player: u64,
    pub damage_to_opponent: u64,
    pub duration: Tick,
    pub turns: u32,
}

/// Selection-battle performance of the stored opponent.
///
/// These are expectations from the fast-forward evaluation that picked the
/// champion, not results of the player's live fight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetrics {
    pub fitness: f64,
    pub expected_damage_to_player: u64,
    pub expected_duration: Tick,
    pub won_selection_battle: bool,
}

/// Display summary of the stored opponent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentPreview {
    pub name: String,
    pub level: u32,
    pub basic_type: BasicType,
    pub max_health: u32,
    pub rotation: Vec<AbilityId>,
    /// Display names of equipped items.
    pub equipment: Vec<String>,
}

/// The evolved opponent waiting for the player, with its breeding material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpponentRecord {
    pub character: CharacterSnapshot,
    pub genome: Genome,
    /// Second parent for the next generation if this opponent is defeated.
    pub partner_genome: Genome,
    pub metrics: CandidateMetrics,
    /// Set when the opponent is staged; `status` backfills it for states
    /// persisted without one.
    pub preview: Option<OpponentPreview>,
}

/// Per-character progression record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChallengeState {
    pub character_id: CharacterId,
    /// Current round, starting at 1 and reset to 1 on defeat.
    pub round: u32,
    pub parent_a: Option<Genome>,
    pub parent_b: Option<Genome>,
    pub current_opponent: Option<OpponentRecord>,
    pub last_outcome: Option<FightOutcome>,
    pub last_reward: Option<RewardSummary>,
    pub last_metrics: Option<FightMetrics>,
    pub updated_at: DateTime<Utc>,
    /// Monotonic save counter used for compare-and-swap persistence.
    pub version: u64,
}

impl ChallengeState {
    pub fn new(character_id: CharacterId) -> Self {
        Self {
            character_id,
            round: 1,
            parent_a: None,
            parent_b: None,
            current_opponent: None,
            last_outcome: None,
            last_reward: None,
            last_metrics: None,
            updated_at: Utc::now(),
            version: 0,
        }
    }

    /// Reset progression after a defeat, keeping the fight trail.
    pub fn reset_run(&mut self) {
        self.round = 1;
        self.parent_a = None;
        self.parent_b = None;
        self.current_opponent = None;
    }
}
