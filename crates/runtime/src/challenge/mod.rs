//! Challenge progression: rounds, rewards and the service loop.

mod reward;
mod service;
mod state;

pub use reward::{round_multiplier, round_reward};
pub use service::{ChallengeService, ChallengeStatus, FightResult};
pub use state::{
    CandidateMetrics, ChallengeState, FightMetrics, FightOutcome, OpponentPreview,
    OpponentRecord, RewardSummary,
};
