//! Round reward computation.
//!
//! Rewards scale linearly with the round reached and are floored so even
//! early rounds pay something.

use super::state::RewardSummary;

const ROUND_MULTIPLIER_STEP: f64 = 0.15;
const XP_SHARE_OF_NEXT_LEVEL: f64 = 0.04;
const BASE_GOLD: f64 = 12.0;
const MIN_XP: u64 = 5;
const MIN_GOLD: u64 = 3;

/// `1 + (round - 1) * 0.15`.
pub fn round_multiplier(round: u32) -> f64 {
    1.0 + f64::from(round.saturating_sub(1)) * ROUND_MULTIPLIER_STEP
}

/// Reward for winning `round`, given the XP the player needs for their next
/// level.
pub fn round_reward(round: u32, xp_for_next_level: u64) -> RewardSummary {
    let multiplier = round_multiplier(round);
    let xp = (xp_for_next_level as f64 * XP_SHARE_OF_NEXT_LEVEL * multiplier).round() as u64;
    let gold = (BASE_GOLD * multiplier).round() as u64;
    RewardSummary {
        xp: xp.max(MIN_XP),
        gold: gold.max(MIN_GOLD),
        multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_one_is_unscaled() {
        let reward = round_reward(1, 1000);
        assert_eq!(reward.multiplier, 1.0);
        assert_eq!(reward.xp, 40);
        assert_eq!(reward.gold, 12);
    }

    #[test]
    fn later_rounds_scale_up() {
        let reward = round_reward(3, 1000);
        assert!((reward.multiplier - 1.3).abs() < 1e-9);
        assert_eq!(reward.xp, 52);
        assert_eq!(reward.gold, 16);
    }

    #[test]
    fn floors_protect_tiny_curves() {
        let reward = round_reward(1, 10);
        assert_eq!(reward.xp, 5);
        assert_eq!(reward.gold, 12);
    }
}
