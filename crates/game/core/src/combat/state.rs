//! Per-battle combatant state.
//!
//! A [`Combatant`] is built from a [`CharacterSnapshot`] when a battle starts
//! and is owned exclusively by that battle; nothing here outlives the run or
//! is written back to the snapshot.

use std::collections::{BTreeMap, HashMap};

use arrayvec::ArrayVec;

use crate::character::{BasicType, CharacterId, CharacterSnapshot};
use crate::config::SimConfig;
use crate::env::{AbilityId, AbilityOracle, EquipSlot, EquipmentOracle, ItemId, Resistances, School};
use crate::stats::{Attributes, DerivedStats, ResourcePools};
use crate::tick::Tick;

use super::CombatSetupError;
use super::log::{BattleLog, CombatEvent, CombatEventKind};
use super::rotation::RotationController;

/// A running percentage damage buff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveBuff {
    /// Additive contribution to the damage multiplier (0.25 = +25%).
    pub amount: f64,
    pub expires_at: Tick,
}

/// A running damage-over-time effect.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivePoison {
    /// Combatant credited with the poison's damage.
    pub source: CharacterId,
    pub potency_per_tick: u32,
    pub tick_interval: Tick,
    pub next_tick_at: Tick,
    pub expires_at: Tick,
}

/// Runtime state of one fighter inside one battle.
#[derive(Debug)]
pub struct Combatant {
    pub id: CharacterId,
    pub name: String,
    pub basic_type: BasicType,
    pub stats: DerivedStats,
    pub resources: ResourcePools,
    /// Tick at which each ability comes off cooldown. Absent = ready.
    pub cooldowns: HashMap<AbilityId, Tick>,
    pub buffs: ArrayVec<ActiveBuff, { SimConfig::MAX_BUFFS }>,
    pub poisons: ArrayVec<ActivePoison, { SimConfig::MAX_POISONS }>,
    pub stun_until: Tick,
    pub next_action_at: Tick,
    pub rotation: RotationController,
    pub heal_threshold: Option<f64>,
}

impl Combatant {
    /// Build battle state from a snapshot, resolving equipment and validating
    /// the rotation against the catalogs.
    ///
    /// Fails before any state exists: an unknown ability or item id, an item
    /// equipped in the wrong slot, or a non-empty rotation outside
    /// `3..=6` abilities is a setup error.
    pub fn from_snapshot(
        snapshot: &CharacterSnapshot,
        abilities: &dyn AbilityOracle,
        items: &dyn EquipmentOracle,
    ) -> Result<Self, CombatSetupError> {
        if !snapshot.rotation.is_empty()
            && !(SimConfig::MIN_ROTATION..=SimConfig::MAX_ROTATION)
                .contains(&snapshot.rotation.len())
        {
            return Err(CombatSetupError::RotationLength {
                character: snapshot.id.clone(),
                len: snapshot.rotation.len(),
            });
        }
        for id in &snapshot.rotation {
            if abilities.ability(id).is_none() {
                return Err(CombatSetupError::UnknownAbility {
                    character: snapshot.id.clone(),
                    id: id.clone(),
                });
            }
        }

        let (effective, resists, bonuses) =
            resolve_equipment(&snapshot.id, &snapshot.attributes, &snapshot.equipment, items)?;

        let stats = DerivedStats::compute(
            &effective,
            snapshot.level,
            resists,
            bonuses.health,
            bonuses.mana,
            bonuses.stamina,
        );

        Ok(Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            basic_type: snapshot.basic_type,
            resources: snapshot.resources.clamped(&stats.maximums),
            stats,
            cooldowns: HashMap::new(),
            buffs: ArrayVec::new(),
            poisons: ArrayVec::new(),
            stun_until: Tick::ZERO,
            next_action_at: Tick::ZERO,
            rotation: RotationController::new(snapshot.rotation.clone()),
            heal_threshold: snapshot.heal_threshold,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.resources.health > 0
    }

    /// Damage school of this combatant's basic attack.
    pub fn basic_school(&self) -> School {
        match self.basic_type {
            BasicType::Melee => School::Physical,
            BasicType::Magic => School::Magic,
        }
    }

    /// Current outgoing damage multiplier: 1 + sum of active buff amounts.
    pub fn damage_multiplier(&self, now: Tick) -> f64 {
        1.0 + self
            .buffs
            .iter()
            .filter(|b| b.expires_at > now)
            .map(|b| b.amount)
            .sum::<f64>()
    }

    /// Whether an ability is off cooldown at `now`.
    pub fn is_ready(&self, id: &str, now: Tick) -> bool {
        self.cooldowns.get(id).is_none_or(|ready_at| *ready_at <= now)
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.resources.health = self.resources.health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.resources.health =
            (self.resources.health + amount).min(self.stats.maximums.health);
    }

    /// Expire buffs and drain due poison ticks at `now`.
    ///
    /// Poison ticks fire for every interval boundary that passed since the
    /// last visit, so a slow actor still takes every tick it owes. A poison
    /// is dropped once `now` reaches its expiry.
    pub fn tick_auras(&mut self, now: Tick, log: &mut BattleLog) {
        let mut i = 0;
        while i < self.buffs.len() {
            if self.buffs[i].expires_at <= now {
                let expired = self.buffs.remove(i);
                log.push(CombatEvent {
                    at: now,
                    source: self.id.clone(),
                    target: None,
                    kind: CombatEventKind::BuffExpired {
                        amount: expired.amount,
                    },
                });
            } else {
                i += 1;
            }
        }

        let magic_resist = self.stats.magic_resist;
        let mut i = 0;
        while i < self.poisons.len() {
            while self.poisons[i].next_tick_at <= self.poisons[i].expires_at
                && self.poisons[i].next_tick_at <= now
            {
                let potency = self.poisons[i].potency_per_tick;
                let amount =
                    ((f64::from(potency) * (1.0 - magic_resist)).round() as u32).max(1);
                let at = self.poisons[i].next_tick_at;
                let source = self.poisons[i].source.clone();
                self.resources.health = self.resources.health.saturating_sub(amount);
                log.push(CombatEvent {
                    at,
                    source,
                    target: Some(self.id.clone()),
                    kind: CombatEventKind::PoisonTick { amount },
                });
                let interval = self.poisons[i].tick_interval;
                self.poisons[i].next_tick_at = self.poisons[i].next_tick_at.plus(interval);
            }
            if now >= self.poisons[i].expires_at {
                self.poisons.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

struct ResourceBonuses {
    health: u32,
    mana: u32,
    stamina: u32,
}

/// Fold equipped items into effective attributes, resistances and flat
/// resource bonuses.
fn resolve_equipment(
    character: &str,
    base: &Attributes,
    equipment: &BTreeMap<EquipSlot, ItemId>,
    items: &dyn EquipmentOracle,
) -> Result<(Attributes, Resistances, ResourceBonuses), CombatSetupError> {
    let mut effective = *base;
    let mut resists = Resistances::default();
    let mut bonuses = ResourceBonuses {
        health: 0,
        mana: 0,
        stamina: 0,
    };

    for (slot, id) in equipment {
        let item = items.item(id).ok_or_else(|| CombatSetupError::UnknownItem {
            character: character.to_string(),
            id: id.clone(),
        })?;
        if item.slot != *slot {
            return Err(CombatSetupError::SlotMismatch {
                character: character.to_string(),
                id: id.clone(),
                slot: *slot,
            });
        }
        effective = effective.combined(&item.attribute_bonuses);
        resists.physical += item.resistances.physical;
        resists.magic += item.resistances.magic;
        bonuses.health += item.health_bonus;
        bonuses.mana += item.mana_bonus;
        bonuses.stamina += item.stamina_bonus;
    }

    Ok((effective, resists, bonuses))
}
