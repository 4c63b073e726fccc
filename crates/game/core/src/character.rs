//! Character snapshot contract.
//!
//! A [`CharacterSnapshot`] is the externally supplied view of a fighter:
//! the player as the character service reports them, or an opponent the
//! evolution engine materialized from a genome. The simulator builds its own
//! per-battle state from a snapshot and never writes back to it.

use std::collections::BTreeMap;

use crate::env::{AbilityId, EquipSlot, ItemId};
use crate::stats::{Attributes, ResourcePools};

/// Identifier of a character (player or materialized opponent).
pub type CharacterId = String;

/// Which attack range a character's basic attack draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasicType {
    Melee,
    Magic,
}

/// Externally supplied character definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub level: u32,
    pub basic_type: BasicType,
    pub attributes: Attributes,
    /// Ordered ability rotation; empty means basic attacks only.
    pub rotation: Vec<AbilityId>,
    /// Equipped item per slot; absent slots are empty.
    pub equipment: BTreeMap<EquipSlot, ItemId>,
    /// Current resources as last persisted. Clamped to computed maximums
    /// when the combatant is built.
    pub resources: ResourcePools,
    /// Fraction of max health below which an available heal ability is cast
    /// out of rotation order. Evolved opponents carry this from their genome.
    pub heal_threshold: Option<f64>,
}
