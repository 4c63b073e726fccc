//! Equipment catalog contract.

use crate::stats::Attributes;

/// Identifier of an item in the catalog.
pub type ItemId = String;

/// Equipment slots a character can fill.
///
/// The slot set is fixed; genomes carry at most one item per slot and the
/// codec rejects items whose catalog slot does not match the slot they are
/// equipped in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipSlot {
    Head,
    Chest,
    Legs,
    MainHand,
    OffHand,
    Trinket,
}

/// Flat resistance contribution of an item, per damage school.
///
/// Values are fractions of incoming damage removed; total resistance is
/// clamped by the stat layer, not here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resistances {
    pub physical: f64,
    pub magic: f64,
}

/// A catalog entry describing one equippable item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub slot: EquipSlot,
    /// Gold cost; the genome codec keeps total equipped cost within budget.
    pub cost: u32,
    pub attribute_bonuses: Attributes,
    pub resistances: Resistances,
    /// Flat resource-maximum bonuses.
    pub health_bonus: u32,
    pub mana_bonus: u32,
    pub stamina_bonus: u32,
}

/// Read-only equipment catalog injected into stat derivation and the codec.
pub trait EquipmentOracle: Send + Sync {
    /// Look up an item definition by id.
    fn item(&self, id: &str) -> Option<&ItemDef>;
}
