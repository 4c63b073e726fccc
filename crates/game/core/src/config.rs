/// Simulation configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Hard cap on turn-loop iterations for one battle. Degenerate stat
    /// combinations (two unkillable tanks) otherwise never terminate; hitting
    /// the cap produces an explicit timeout verdict, never a winner.
    pub iteration_cap: u32,
}

impl SimConfig {
    // ===== compile-time constants used as type parameters =====
    /// Minimum rotation length for a non-empty rotation.
    pub const MIN_ROTATION: usize = 3;
    /// Maximum rotation length.
    pub const MAX_ROTATION: usize = 6;
    /// Maximum simultaneously tracked damage buffs per combatant.
    pub const MAX_BUFFS: usize = 8;
    /// Maximum simultaneously tracked poisons per combatant.
    pub const MAX_POISONS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ITERATION_CAP: u32 = 1_000;

    pub fn new() -> Self {
        Self {
            iteration_cap: Self::DEFAULT_ITERATION_CAP,
        }
    }

    pub fn with_iteration_cap(iteration_cap: u32) -> Self {
        Self { iteration_cap }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}
