//! Resource pools (health, mana, stamina).
//!
//! Maximums are computed from effective attributes plus equipment and are not
//! stored; current values are battle state.

use super::Attributes;

/// Enum referencing one resource, used by ability costs and effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Health,
    Mana,
    Stamina,
}

/// Maximum resource values computed from stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMaximums {
    pub health: u32,
    pub mana: u32,
    pub stamina: u32,
}

impl ResourceMaximums {
    /// Compute maximums from effective attributes, level and flat item
    /// bonuses.
    ///
    /// Formulas:
    /// - health = 50 + CON × 12 + level × 8 + item health bonus
    /// - mana = 20 + INT × 10 + WIL × 4 + item mana bonus
    /// - stamina = 20 + STR × 6 + DEX × 6 + item stamina bonus
    pub fn compute(
        effective: &Attributes,
        level: u32,
        health_bonus: u32,
        mana_bonus: u32,
        stamina_bonus: u32,
    ) -> Self {
        Self {
            health: 50 + effective.constitution * 12 + level * 8 + health_bonus,
            mana: 20 + effective.intellect * 10 + effective.willpower * 4 + mana_bonus,
            stamina: 20 + effective.strength * 6 + effective.dexterity * 6 + stamina_bonus,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Health => self.health,
            ResourceKind::Mana => self.mana,
            ResourceKind::Stamina => self.stamina,
        }
    }
}

/// Current resource values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePools {
    pub health: u32,
    pub mana: u32,
    pub stamina: u32,
}

impl ResourcePools {
    pub const fn new(health: u32, mana: u32, stamina: u32) -> Self {
        Self {
            health,
            mana,
            stamina,
        }
    }

    /// Pools filled to the given maximums.
    pub const fn at_max(max: &ResourceMaximums) -> Self {
        Self {
            health: max.health,
            mana: max.mana,
            stamina: max.stamina,
        }
    }

    /// Element-wise clamp against maximums.
    #[must_use]
    pub fn clamped(&self, max: &ResourceMaximums) -> Self {
        Self {
            health: self.health.min(max.health),
            mana: self.mana.min(max.mana),
            stamina: self.stamina.min(max.stamina),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Health => self.health,
            ResourceKind::Mana => self.mana,
            ResourceKind::Stamina => self.stamina,
        }
    }

    pub fn spend(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Health => self.health = self.health.saturating_sub(amount),
            ResourceKind::Mana => self.mana = self.mana.saturating_sub(amount),
            ResourceKind::Stamina => self.stamina = self.stamina.saturating_sub(amount),
        }
    }
}
