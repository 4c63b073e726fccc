//! External catalog contracts and the injected RNG.
//!
//! Ability and equipment catalogs live outside this crate (they belong to the
//! content/persistence layer). The simulator and codec consume them through
//! the oracle traits defined here, always as explicit parameters.

pub mod abilities;
pub mod items;
pub mod rng;

pub use abilities::{AbilityDef, AbilityId, AbilityOracle, CostKind, ResourceCost, School};
pub use items::{EquipSlot, EquipmentOracle, ItemDef, ItemId, Resistances};
pub use rng::{CombatRng, Pcg32, mix_seed};
