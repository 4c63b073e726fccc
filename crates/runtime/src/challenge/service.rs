//! Challenge progression orchestration.
//!
//! [`ChallengeService`] is the single entry point for the challenge loop:
//! `status` reads, `start` evolves and stores an opponent, `fight` resolves a
//! live battle and advances or resets the run. A per-character async mutex
//! serializes all three so concurrent calls on one character never interleave;
//! the repository's compare-and-swap save is the backstop for writers outside
//! this process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use game_core::{
    BattleReport, CharacterId, CharacterSnapshot, EquipmentOracle, ResourceMaximums, SimMode,
    Verdict, mix_seed,
};
use tokio::sync::Mutex;

use crate::error::{Result, RuntimeError};
use crate::evolution::{BattleRunner, Champion, EvolutionEngine};
use crate::oracle::{CatalogManager, CharacterService};
use crate::repository::ChallengeRepository;

use super::reward::round_reward;
use super::state::{
    CandidateMetrics, ChallengeState, FightMetrics, FightOutcome, OpponentPreview,
    OpponentRecord, RewardSummary,
};

/// Read-only view returned by [`ChallengeService::status`].
#[derive(Clone, Debug)]
pub struct ChallengeStatus {
    pub round: u32,
    /// Reward for winning the current round.
    pub reward_preview: RewardSummary,
    /// Reward for winning the round after that.
    pub next_reward_preview: RewardSummary,
    pub opponent: Option<OpponentPreview>,
    pub last_outcome: Option<FightOutcome>,
    pub last_reward: Option<RewardSummary>,
    pub last_metrics: Option<FightMetrics>,
}

/// Result of one [`ChallengeService::fight`] call.
#[derive(Clone, Debug)]
pub struct FightResult {
    pub outcome: FightOutcome,
    /// Granted on victory only.
    pub reward: Option<RewardSummary>,
    pub metrics: FightMetrics,
    /// Round after the fight resolved.
    pub round: u32,
    pub report: BattleReport,
}

pub struct ChallengeService {
    repository: Arc<dyn ChallengeRepository>,
    engine: Arc<EvolutionEngine>,
    characters: Arc<dyn CharacterService>,
    catalogs: Arc<CatalogManager>,
    runner: Arc<dyn BattleRunner>,
    locks: StdMutex<HashMap<CharacterId, Arc<Mutex<()>>>>,
    base_seed: u64,
    seed_counter: AtomicU64,
}

impl ChallengeService {
    pub fn new(
        repository: Arc<dyn ChallengeRepository>,
        engine: Arc<EvolutionEngine>,
        characters: Arc<dyn CharacterService>,
        catalogs: Arc<CatalogManager>,
        runner: Arc<dyn BattleRunner>,
        base_seed: u64,
    ) -> Self {
        Self {
            repository,
            engine,
            characters,
            catalogs,
            runner,
            locks: StdMutex::new(HashMap::new()),
            base_seed,
            seed_counter: AtomicU64::new(0),
        }
    }

    /// Current progression view; backfills a missing opponent preview.
    pub async fn status(&self, character_id: &str) -> Result<ChallengeStatus> {
        let lock = self.lock_for(character_id);
        let _guard = lock.lock().await;

        let player = self.snapshot(character_id)?;
        let mut state = self.load_or_create(character_id)?;

        let mut backfilled = false;
        if let Some(record) = state.current_opponent.as_mut() {
            if record.preview.is_none() {
                record.preview = Some(build_preview(&record.character, self.catalogs.as_ref()));
                backfilled = true;
            }
        }
        if backfilled {
            state.updated_at = Utc::now();
            state = self.repository.save(state)?;
        }

        let xp_next = self.characters.xp_for_next_level(player.level);
        Ok(ChallengeStatus {
            round: state.round,
            reward_preview: round_reward(state.round, xp_next),
            next_reward_preview: round_reward(state.round + 1, xp_next),
            opponent: state
                .current_opponent
                .and_then(|record| record.preview),
            last_outcome: state.last_outcome,
            last_reward: state.last_reward,
            last_metrics: state.last_metrics,
        })
    }

    /// Evolve and store an opponent for the current round.
    ///
    /// Idempotent while an opponent is already waiting, unless `force` is
    /// set.
    pub async fn start(&self, character_id: &str, force: bool) -> Result<ChallengeState> {
        let lock = self.lock_for(character_id);
        let _guard = lock.lock().await;

        let player = self.snapshot(character_id)?;
        let mut state = self.load_or_create(character_id)?;
        if state.current_opponent.is_some() && !force {
            return Ok(state);
        }

        let champion = self
            .engine
            .find_champion(
                &player,
                state.parent_a.as_ref(),
                state.parent_b.as_ref(),
                state.round,
                self.next_seed(),
            )
            .await?;
        state.current_opponent = Some(self.record_from_champion(champion));
        state.updated_at = Utc::now();
        tracing::info!(character = character_id, round = state.round, "opponent staged");
        Ok(self.repository.save(state)?)
    }

    /// Resolve a live battle against the stored opponent.
    pub async fn fight(&self, character_id: &str) -> Result<FightResult> {
        let lock = self.lock_for(character_id);
        let _guard = lock.lock().await;

        let player = self.snapshot(character_id)?;
        let mut state = self.load_or_create(character_id)?;
        let record = state
            .current_opponent
            .clone()
            .ok_or_else(|| RuntimeError::NoOpponent(character_id.to_string()))?;

        let report = self.runner.run(
            &player,
            &record.character,
            SimMode::Live,
            self.next_seed(),
        )?;

        let metrics = FightMetrics {
            damage_to_player: report.damage_dealt_by(&record.character.id),
            damage_to_opponent: report.damage_dealt_by(&player.id),
            duration: report.duration,
            turns: report.turns,
        };

        let (outcome, reward) = match report.verdict {
            Verdict::SideA => {
                let reward =
                    round_reward(state.round, self.characters.xp_for_next_level(player.level));
                state.round += 1;
                state.parent_a = Some(record.genome);
                state.parent_b = Some(record.partner_genome);
                let next = self
                    .engine
                    .find_champion(
                        &player,
                        state.parent_a.as_ref(),
                        state.parent_b.as_ref(),
                        state.round,
                        self.next_seed(),
                    )
                    .await?;
                state.current_opponent = Some(self.record_from_champion(next));
                (FightOutcome::Victory, Some(reward))
            }
            Verdict::SideB => {
                state.reset_run();
                (FightOutcome::Defeat, None)
            }
            // The round stays winnable; the same opponent waits.
            Verdict::Timeout => (FightOutcome::Timeout, None),
        };

        state.last_outcome = Some(outcome);
        state.last_reward = reward;
        state.last_metrics = Some(metrics);
        state.updated_at = Utc::now();
        let state = self.repository.save(state)?;

        tracing::info!(
            character = character_id,
            ?outcome,
            round = state.round,
            turns = metrics.turns,
            "fight resolved"
        );

        Ok(FightResult {
            outcome,
            reward,
            metrics,
            round: state.round,
            report,
        })
    }

    fn snapshot(&self, character_id: &str) -> Result<CharacterSnapshot> {
        self.characters
            .snapshot(character_id)
            .ok_or_else(|| RuntimeError::CharacterNotFound(character_id.to_string()))
    }

    fn load_or_create(&self, character_id: &str) -> Result<ChallengeState> {
        if let Some(state) = self.repository.load(character_id)? {
            return Ok(state);
        }
        let state = self
            .repository
            .save(ChallengeState::new(character_id.to_string()))?;
        Ok(state)
    }

    fn lock_for(&self, character_id: &str) -> Arc<Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            locks
                .entry(character_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn next_seed(&self) -> u64 {
        mix_seed(self.base_seed, self.seed_counter.fetch_add(1, Ordering::Relaxed))
    }

    fn record_from_champion(&self, champion: Champion) -> OpponentRecord {
        let Champion {
            champion: evaluated,
            partner_genome,
        } = champion;
        let preview = build_preview(&evaluated.character, self.catalogs.as_ref());
        OpponentRecord {
            character: evaluated.character,
            genome: evaluated.genome,
            partner_genome,
            metrics: CandidateMetrics {
                fitness: evaluated.fitness,
                expected_damage_to_player: evaluated.damage_to_player,
                expected_duration: evaluated.battle_duration,
                won_selection_battle: evaluated.won,
            },
            preview: Some(preview),
        }
    }
}

/// Summarize an opponent for display, with equipment folded into max health.
fn build_preview(character: &CharacterSnapshot, catalogs: &CatalogManager) -> OpponentPreview {
    let mut bonus_attributes = game_core::Attributes::default();
    let mut health_bonus = 0u32;
    let mut equipment = Vec::with_capacity(character.equipment.len());
    for id in character.equipment.values() {
        if let Some(item) = catalogs.item(id) {
            bonus_attributes = bonus_attributes.combined(&item.attribute_bonuses);
            health_bonus += item.health_bonus;
            equipment.push(item.name.clone());
        }
    }
    let effective = character.attributes.combined(&bonus_attributes);
    let maximums = ResourceMaximums::compute(&effective, character.level, health_bonus, 0, 0);

    OpponentPreview {
        name: character.name.clone(),
        level: character.level,
        basic_type: character.basic_type,
        max_health: maximums.health,
        rotation: character.rotation.clone(),
        equipment,
    }
}
