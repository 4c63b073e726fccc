//! Deterministic combat simulation and opponent-genome logic.
//!
//! `game-core` defines the canonical battle rules (effects, rotations, the
//! turn loop) and the genome codec used to encode candidate opponents. It is
//! pure: catalogs arrive through the [`env`] oracle traits, randomness
//! through an injected [`env::CombatRng`], and every battle runs on owned
//! state that dies with the run. The runtime crate builds evolution and
//! challenge progression on top of the types re-exported here.
pub mod character;
pub mod combat;
pub mod config;
pub mod env;
pub mod genome;
pub mod stats;
pub mod tick;

pub use character::{BasicType, CharacterId, CharacterSnapshot};
pub use combat::{
    BattleReport, CombatEvent, CombatEventKind, CombatSetupError, CombatSimulator,
    CombatantSummary, EffectKind, RotationController, SimMode, TurnAction, Verdict,
};
pub use config::SimConfig;
pub use env::{
    AbilityDef, AbilityId, AbilityOracle, CombatRng, CostKind, EquipSlot, EquipmentOracle,
    ItemDef, ItemId, Pcg32, ResourceCost, Resistances, School, mix_seed,
};
pub use genome::{Behavior, Genome, GenomeContext, SlotItem};
pub use stats::{
    AttackRange, Attribute, Attributes, DerivedStats, ResourceKind, ResourceMaximums,
    ResourcePools,
};
pub use tick::Tick;
