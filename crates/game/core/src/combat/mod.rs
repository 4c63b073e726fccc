//! Deterministic combat resolution.
//!
//! The pipeline is leaf-to-root: [`effect`] applies a single effect,
//! [`rotation`] picks a combatant's action each turn, and [`simulator`] runs
//! the full battle loop over owned [`state::Combatant`] values. All
//! randomness comes through the injected RNG and all catalog access through
//! the env oracles.

pub mod effect;
pub mod log;
pub mod rotation;
pub mod simulator;
pub mod state;

pub use effect::EffectKind;
pub use log::{BattleLog, CombatEvent, CombatEventKind};
pub use rotation::{RotationController, TurnAction};
pub use simulator::{BattleReport, CombatSimulator, CombatantSummary, SimMode, Verdict};
pub use state::{ActiveBuff, ActivePoison, Combatant};

use crate::character::CharacterId;
use crate::config::SimConfig;
use crate::env::{AbilityId, EquipSlot, ItemId};

/// Validation failures detected before a battle starts.
///
/// These abort the requested battle with nothing mutated; anything the codec
/// can repair never reaches this point.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatSetupError {
    #[error("rotation of `{character}` has {len} abilities, expected {min}..={max}",
        min = SimConfig::MIN_ROTATION, max = SimConfig::MAX_ROTATION)]
    RotationLength { character: CharacterId, len: usize },

    #[error("unknown ability `{id}` in rotation of `{character}`")]
    UnknownAbility { character: CharacterId, id: AbilityId },

    #[error("unknown item `{id}` equipped by `{character}`")]
    UnknownItem { character: CharacterId, id: ItemId },

    #[error("item `{id}` does not fit slot {slot} on `{character}`")]
    SlotMismatch {
        character: CharacterId,
        id: ItemId,
        slot: EquipSlot,
    },
}

#[cfg(test)]
pub(crate) mod testkit {
    //! Small fixed catalogs and snapshots shared by combat tests.

    use std::collections::{BTreeMap, HashMap};

    use crate::character::{BasicType, CharacterSnapshot};
    use crate::env::{
        AbilityDef, AbilityOracle, CostKind, EquipSlot, EquipmentOracle, ItemDef, ResourceCost,
        Resistances, School,
    };
    use crate::stats::{Attributes, ResourcePools};
    use crate::tick::Tick;

    use super::EffectKind;

    pub struct TestCatalogs {
        abilities: HashMap<String, AbilityDef>,
        items: HashMap<String, ItemDef>,
    }

    impl AbilityOracle for TestCatalogs {
        fn ability(&self, id: &str) -> Option<&AbilityDef> {
            self.abilities.get(id)
        }
    }

    impl EquipmentOracle for TestCatalogs {
        fn item(&self, id: &str) -> Option<&ItemDef> {
            self.items.get(id)
        }
    }

    fn ability(
        id: &str,
        school: School,
        cost: ResourceCost,
        cooldown: u64,
        effects: Vec<EffectKind>,
    ) -> (String, AbilityDef) {
        (
            id.to_string(),
            AbilityDef {
                id: id.to_string(),
                name: id.to_string(),
                school,
                cost,
                cooldown: Tick(cooldown),
                effects,
            },
        )
    }

    pub fn catalogs() -> TestCatalogs {
        let stamina = |value| ResourceCost {
            kind: CostKind::Stamina,
            value,
        };
        let mana = |value| ResourceCost {
            kind: CostKind::Mana,
            value,
        };
        let abilities = HashMap::from([
            ability(
                "strike",
                School::Physical,
                stamina(10),
                4_000,
                vec![EffectKind::PhysicalDamage { value: 8 }],
            ),
            ability(
                "bash",
                School::Physical,
                stamina(15),
                8_000,
                vec![
                    EffectKind::PhysicalDamage { value: 4 },
                    EffectKind::Stun { duration: Tick(2_500) },
                ],
            ),
            ability(
                "rally",
                School::Physical,
                stamina(12),
                10_000,
                vec![EffectKind::BuffDamagePct {
                    amount: 0.25,
                    duration: Tick(6_000),
                }],
            ),
            ability(
                "bolt",
                School::Magic,
                mana(12),
                3_000,
                vec![EffectKind::MagicDamage { value: 10 }],
            ),
            ability(
                "venom",
                School::Magic,
                mana(16),
                9_000,
                vec![EffectKind::Poison {
                    potency_per_tick: 5,
                    tick_interval: Tick(1_000),
                    duration: Tick(5_000),
                }],
            ),
            ability(
                "mend",
                School::Magic,
                mana(20),
                6_000,
                vec![EffectKind::Heal { value: 40 }],
            ),
        ]);

        let items = HashMap::from([(
            "iron-helm".to_string(),
            ItemDef {
                id: "iron-helm".to_string(),
                name: "Iron Helm".to_string(),
                slot: EquipSlot::Head,
                cost: 25,
                attribute_bonuses: Attributes::new(0, 0, 2, 0, 0),
                resistances: Resistances {
                    physical: 0.05,
                    magic: 0.0,
                },
                health_bonus: 10,
                mana_bonus: 0,
                stamina_bonus: 0,
            },
        )]);

        TestCatalogs { abilities, items }
    }

    pub fn melee_snapshot(id: &str) -> CharacterSnapshot {
        CharacterSnapshot {
            id: id.to_string(),
            name: id.to_string(),
            level: 5,
            basic_type: BasicType::Melee,
            attributes: Attributes::new(10, 8, 6, 0, 1),
            rotation: vec!["strike".to_string(), "bash".to_string(), "rally".to_string()],
            equipment: BTreeMap::from([(EquipSlot::Head, "iron-helm".to_string())]),
            resources: ResourcePools::new(u32::MAX, u32::MAX, u32::MAX),
            heal_threshold: None,
        }
    }

    pub fn magic_snapshot(id: &str) -> CharacterSnapshot {
        CharacterSnapshot {
            id: id.to_string(),
            name: id.to_string(),
            level: 5,
            basic_type: BasicType::Magic,
            attributes: Attributes::new(1, 4, 6, 9, 5),
            rotation: vec!["bolt".to_string(), "venom".to_string(), "mend".to_string()],
            equipment: BTreeMap::new(),
            resources: ResourcePools::new(u32::MAX, u32::MAX, u32::MAX),
            heal_threshold: Some(0.35),
        }
    }
}
