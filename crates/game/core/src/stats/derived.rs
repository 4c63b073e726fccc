//! Derived combat stats.
//!
//! Computed once when a combatant enters battle, from effective attributes
//! (base + equipment bonuses) plus equipment resistances. Integer formulas
//! throughout except resistances, which are damage fractions.

use crate::character::BasicType;
use crate::env::{Resistances, School};
use crate::tick::Tick;

use super::{Attributes, ResourceMaximums};

/// An inclusive damage roll range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRange {
    pub min: u32,
    pub max: u32,
}

/// Everything the simulator reads per combatant besides current resources.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedStats {
    pub melee_attack: AttackRange,
    pub magic_attack: AttackRange,
    /// Ticks between two actions of this combatant.
    pub attack_interval: Tick,
    /// Fraction of physical damage removed, clamped to [0, 0.75].
    pub physical_resist: f64,
    /// Fraction of magic damage removed, clamped to [0, 0.75].
    pub magic_resist: f64,
    pub maximums: ResourceMaximums,
}

impl DerivedStats {
    /// Upper clamp on either resistance.
    pub const RESIST_CAP: f64 = 0.75;

    /// Base attack interval before dexterity speeds it up.
    const BASE_INTERVAL_MS: u64 = 3_000;
    /// Fastest possible attack interval.
    const MIN_INTERVAL_MS: u64 = 1_200;
    /// Interval reduction per point of dexterity, in ms.
    const INTERVAL_PER_DEX_MS: u64 = 40;

    /// Compute derived stats from effective attributes.
    ///
    /// Formulas:
    /// - melee attack = [2 + STR × 2, 6 + STR × 2 + DEX]
    /// - magic attack = [2 + INT × 2, 6 + INT × 2 + WIL]
    /// - attack interval = clamp(3000 − DEX × 40, 1200, 3000) ms
    /// - resistances = item resistances + WIL × 0.004 (magic only), capped
    pub fn compute(
        effective: &Attributes,
        level: u32,
        item_resists: Resistances,
        health_bonus: u32,
        mana_bonus: u32,
        stamina_bonus: u32,
    ) -> Self {
        let melee_min = 2 + effective.strength * 2;
        let magic_min = 2 + effective.intellect * 2;

        let interval = Self::BASE_INTERVAL_MS
            .saturating_sub(u64::from(effective.dexterity) * Self::INTERVAL_PER_DEX_MS)
            .max(Self::MIN_INTERVAL_MS);

        let magic_from_will = f64::from(effective.willpower) * 0.004;

        Self {
            melee_attack: AttackRange {
                min: melee_min,
                max: melee_min + 4 + effective.dexterity,
            },
            magic_attack: AttackRange {
                min: magic_min,
                max: magic_min + 4 + effective.willpower,
            },
            attack_interval: Tick(interval),
            physical_resist: item_resists.physical.clamp(0.0, Self::RESIST_CAP),
            magic_resist: (item_resists.magic + magic_from_will).clamp(0.0, Self::RESIST_CAP),
            maximums: ResourceMaximums::compute(
                effective,
                level,
                health_bonus,
                mana_bonus,
                stamina_bonus,
            ),
        }
    }

    /// Attack range for a damage school.
    pub fn attack_range(&self, school: School) -> AttackRange {
        match school {
            School::Physical => self.melee_attack,
            School::Magic => self.magic_attack,
        }
    }

    /// Attack range used by a basic attack of the given type.
    pub fn basic_attack_range(&self, basic: BasicType) -> AttackRange {
        match basic {
            BasicType::Melee => self.melee_attack,
            BasicType::Magic => self.magic_attack,
        }
    }

    /// Resistance against a damage school.
    pub fn resistance(&self, school: School) -> f64 {
        match school {
            School::Physical => self.physical_resist,
            School::Magic => self.magic_resist,
        }
    }
}
