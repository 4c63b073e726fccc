//! Opponent genomes.
//!
//! A [`Genome`] is the encoded, budget-constrained description of a candidate
//! opponent: attribute allocation, ability rotation, equipment and an
//! optional behavior gene. Genomes are value objects: the evolution
//! operators in [`codec`] always return new genomes rather than mutating in
//! place, and anything that leaves the codec is game-legal by construction.

pub mod codec;

use std::collections::BTreeMap;

use crate::character::BasicType;
use crate::env::{AbilityId, EquipSlot, ItemId};
use crate::stats::Attributes;

/// Behavioral genes of an opponent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Behavior {
    /// Health fraction below which the opponent casts an available heal out
    /// of rotation order. Clamped to [`Behavior::THRESHOLD_MIN`],
    /// [`Behavior::THRESHOLD_MAX`] by the codec.
    pub heal_threshold: f64,
}

impl Behavior {
    pub const THRESHOLD_MIN: f64 = 0.05;
    pub const THRESHOLD_MAX: f64 = 0.95;

    /// Behavior with the threshold clamped into its legal band.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            heal_threshold: self
                .heal_threshold
                .clamp(Self::THRESHOLD_MIN, Self::THRESHOLD_MAX),
        }
    }
}

/// Encoded candidate opponent.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    /// Basic attack type; `None` until the codec derives it from attributes.
    pub basic_type: Option<BasicType>,
    pub attributes: Attributes,
    pub rotation: Vec<AbilityId>,
    /// Equipped item per slot; absent slots are empty.
    pub equipment: BTreeMap<EquipSlot, ItemId>,
    pub behavior: Option<Behavior>,
}

/// Budgets and catalog views the codec validates against.
///
/// Built once per evolution call from the player's snapshot and the catalogs;
/// the codec itself stays a set of pure functions.
#[derive(Clone, Debug)]
pub struct GenomeContext {
    /// Attribute point budget every legal genome sums to.
    pub total_points: u32,
    /// Ability ids a rotation may reference.
    pub valid_ability_ids: Vec<AbilityId>,
    /// Gold budget on total equipped item cost.
    pub gear_budget: u32,
    /// Equippable items per slot with their gold costs.
    pub items_by_slot: BTreeMap<EquipSlot, Vec<SlotItem>>,
    /// The player's own spend per slot, used to bias random gear toward
    /// comparable quality. Absent when the player left the slot empty.
    pub per_slot_reference_cost: BTreeMap<EquipSlot, u32>,
}

/// One equippable item as the codec sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotItem {
    pub id: ItemId,
    pub cost: u32,
}

impl GenomeContext {
    /// Slot and cost of an item id, if the context knows it.
    pub fn lookup(&self, id: &str) -> Option<(EquipSlot, u32)> {
        self.items_by_slot.iter().find_map(|(slot, items)| {
            items
                .iter()
                .find(|item| item.id == id)
                .map(|item| (*slot, item.cost))
        })
    }

    /// Total gold cost of a genome's equipment under this context.
    pub fn equipment_cost(&self, equipment: &BTreeMap<EquipSlot, ItemId>) -> u32 {
        equipment
            .values()
            .filter_map(|id| self.lookup(id).map(|(_, cost)| cost))
            .sum()
    }
}
