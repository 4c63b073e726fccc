//! Runtime services around the combat core.
//!
//! Layers, outermost first:
//! - [`challenge`]: the player-facing progression loop (status, start,
//!   fight) with per-character serialization.
//! - [`evolution`]: generation building and concurrent candidate evaluation.
//! - [`repository`]: versioned persistence for challenge states.
//! - [`oracle`]: catalog adapters implementing the core oracle traits, plus
//!   the character-service contract.
//!
//! The core stays pure; every effectful concern (time, randomness seeds,
//! storage, task scheduling) lives here.

pub mod challenge;
pub mod error;
pub mod evolution;
pub mod oracle;
pub mod repository;

pub use challenge::{
    ChallengeService, ChallengeState, ChallengeStatus, FightOutcome, FightResult,
    OpponentPreview, OpponentRecord, RewardSummary,
};
pub use error::{Result, RuntimeError};
pub use evolution::{
    BattleRunner, Champion, EvaluatedCandidate, EvolutionConfig, EvolutionEngine,
    FitnessWeights, SimulatorRunner,
};
pub use oracle::{CatalogManager, CharacterService};
pub use repository::{
    ChallengeRepository, FileChallengeRepo, InMemoryChallengeRepo, RepositoryError,
};
