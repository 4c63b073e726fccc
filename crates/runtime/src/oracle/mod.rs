//! Catalog adapters and external character access.
//!
//! The content/persistence layer owns ability and equipment definitions;
//! [`CatalogManager`] holds an immutable in-memory view of them and serves
//! the core oracle traits. [`CharacterService`] is the narrow contract to the
//! character collaborator (snapshots and the level curve).

use std::collections::{BTreeMap, HashMap};

use game_core::{
    AbilityDef, AbilityId, AbilityOracle, CharacterSnapshot, EquipmentOracle, GenomeContext,
    ItemDef, ItemId, SlotItem,
};

/// Immutable catalog bundle constructed at startup and shared by reference.
#[derive(Debug, Default)]
pub struct CatalogManager {
    abilities: HashMap<AbilityId, AbilityDef>,
    items: HashMap<ItemId, ItemDef>,
}

impl CatalogManager {
    pub fn new(
        abilities: impl IntoIterator<Item = AbilityDef>,
        items: impl IntoIterator<Item = ItemDef>,
    ) -> Self {
        Self {
            abilities: abilities.into_iter().map(|a| (a.id.clone(), a)).collect(),
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    /// All ability ids, sorted for deterministic genome contexts.
    pub fn ability_ids(&self) -> Vec<AbilityId> {
        let mut ids: Vec<AbilityId> = self.abilities.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Total gold value of a character's equipped items.
    pub fn equipment_spend(&self, snapshot: &CharacterSnapshot) -> u32 {
        snapshot
            .equipment
            .values()
            .filter_map(|id| self.items.get(id))
            .map(|item| item.cost)
            .sum()
    }

    /// Build the codec context for breeding opponents of `player`.
    ///
    /// The attribute budget mirrors the player's own allocation and the gear
    /// budget mirrors their equipped spend (floored so naked characters still
    /// face armed opponents); per-slot reference costs bias random gear
    /// toward comparable quality.
    pub fn genome_context(
        &self,
        player: &CharacterSnapshot,
        gear_budget_floor: u32,
    ) -> GenomeContext {
        let mut items_by_slot: BTreeMap<_, Vec<SlotItem>> = BTreeMap::new();
        for item in self.items.values() {
            items_by_slot.entry(item.slot).or_default().push(SlotItem {
                id: item.id.clone(),
                cost: item.cost,
            });
        }
        // Deterministic ordering inside each slot.
        for items in items_by_slot.values_mut() {
            items.sort_by(|a, b| a.id.cmp(&b.id));
        }

        let per_slot_reference_cost = player
            .equipment
            .iter()
            .filter_map(|(slot, id)| self.items.get(id).map(|item| (*slot, item.cost)))
            .collect();

        GenomeContext {
            total_points: player.attributes.total(),
            valid_ability_ids: self.ability_ids(),
            gear_budget: self.equipment_spend(player).max(gear_budget_floor),
            items_by_slot,
            per_slot_reference_cost,
        }
    }
}

impl AbilityOracle for CatalogManager {
    fn ability(&self, id: &str) -> Option<&AbilityDef> {
        self.abilities.get(id)
    }
}

impl EquipmentOracle for CatalogManager {
    fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }
}

/// Contract to the character collaborator.
///
/// The character service owns player persistence and the XP curve; this core
/// only reads snapshots and asks how much XP the next level needs (for reward
/// computation).
pub trait CharacterService: Send + Sync {
    /// Current snapshot of a character, if it exists.
    fn snapshot(&self, id: &str) -> Option<CharacterSnapshot>;

    /// XP required to advance from `level` to `level + 1`.
    fn xp_for_next_level(&self, level: u32) -> u64;
}
