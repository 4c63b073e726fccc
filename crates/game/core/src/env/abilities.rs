//! Ability catalog contract.

use crate::combat::EffectKind;
use crate::tick::Tick;

/// Identifier of an ability in the catalog.
pub type AbilityId = String;

/// Damage school an ability (or basic attack) belongs to.
///
/// Determines which attack range of the source and which resistance of the
/// target apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum School {
    Physical,
    Magic,
}

/// Resource an ability consumes when cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostKind {
    Mana,
    Stamina,
}

impl From<CostKind> for crate::stats::ResourceKind {
    fn from(kind: CostKind) -> Self {
        match kind {
            CostKind::Mana => crate::stats::ResourceKind::Mana,
            CostKind::Stamina => crate::stats::ResourceKind::Stamina,
        }
    }
}

/// Cost of casting an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub kind: CostKind,
    pub value: u32,
}

/// A catalog entry describing one castable ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: String,
    pub school: School,
    pub cost: ResourceCost,
    pub cooldown: Tick,
    /// Effects resolved in order when the ability lands.
    pub effects: Vec<EffectKind>,
}

impl AbilityDef {
    /// Whether any effect of this ability heals the caster.
    ///
    /// Used by the emergency-heal behavior gate in the rotation controller.
    pub fn is_heal(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, EffectKind::Heal { .. }))
    }
}

/// Read-only ability catalog injected into the simulator and codec.
///
/// Catalogs are immutable after construction; components receive them as
/// explicit parameters, never through global state.
pub trait AbilityOracle: Send + Sync {
    /// Look up an ability definition by id.
    fn ability(&self, id: &str) -> Option<&AbilityDef>;
}
