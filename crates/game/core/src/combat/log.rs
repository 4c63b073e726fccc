//! Structured battle log.
//!
//! Every resolution step emits a [`CombatEvent`] carrying attribution
//! (source, optional target) so transport layers can render it however they
//! like. The log also folds damage totals per combatant as events arrive;
//! fast-forward mode keeps only those aggregates and drops the event list.

use std::collections::BTreeMap;

use crate::character::CharacterId;
use crate::env::{AbilityId, School};
use crate::tick::Tick;

/// What happened in one resolution step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEventKind {
    BasicAttack {
        amount: u32,
    },
    AbilityDamage {
        ability: AbilityId,
        school: School,
        amount: u32,
    },
    Heal {
        ability: AbilityId,
        amount: u32,
    },
    BuffApplied {
        amount: f64,
        expires_at: Tick,
    },
    BuffExpired {
        amount: f64,
    },
    StunApplied {
        until: Tick,
    },
    /// Actor was stunned and lost this turn.
    StunSkipped,
    PoisonApplied {
        expires_at: Tick,
    },
    PoisonTick {
        amount: u32,
    },
    Defeated,
    /// Iteration cap reached; battle ended without a winner.
    Timeout,
}

/// One attributed entry in the battle log.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatEvent {
    pub at: Tick,
    pub source: CharacterId,
    /// Absent for self-directed entries (heals, buff expiry, stun skips).
    pub target: Option<CharacterId>,
    pub kind: CombatEventKind,
}

impl CombatEvent {
    /// Damage credited to the source by this event, if any.
    fn dealt_damage(&self) -> Option<u64> {
        match self.kind {
            CombatEventKind::BasicAttack { amount }
            | CombatEventKind::AbilityDamage { amount, .. }
            | CombatEventKind::PoisonTick { amount } => Some(u64::from(amount)),
            _ => None,
        }
    }
}

impl core::fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let target = self.target.as_deref().unwrap_or("self");
        match &self.kind {
            CombatEventKind::BasicAttack { amount } => {
                write!(f, "[{}] {} hits {} for {}", self.at, self.source, target, amount)
            }
            CombatEventKind::AbilityDamage { ability, school, amount } => write!(
                f,
                "[{}] {} casts {} on {} for {} ({})",
                self.at, self.source, ability, target, amount, school
            ),
            CombatEventKind::Heal { ability, amount } => {
                write!(f, "[{}] {} heals {} with {}", self.at, self.source, amount, ability)
            }
            CombatEventKind::BuffApplied { amount, expires_at } => write!(
                f,
                "[{}] {} gains +{:.0}% damage until {}",
                self.at,
                self.source,
                amount * 100.0,
                expires_at
            ),
            CombatEventKind::BuffExpired { amount } => write!(
                f,
                "[{}] {} loses +{:.0}% damage",
                self.at,
                self.source,
                amount * 100.0
            ),
            CombatEventKind::StunApplied { until } => {
                write!(f, "[{}] {} stuns {} until {}", self.at, self.source, target, until)
            }
            CombatEventKind::StunSkipped => {
                write!(f, "[{}] {} is stunned and loses the turn", self.at, self.source)
            }
            CombatEventKind::PoisonApplied { expires_at } => write!(
                f,
                "[{}] {} poisons {} until {}",
                self.at, self.source, target, expires_at
            ),
            CombatEventKind::PoisonTick { amount } => {
                write!(f, "[{}] {}'s poison burns {} for {}", self.at, self.source, target, amount)
            }
            CombatEventKind::Defeated => {
                write!(f, "[{}] {} is defeated", self.at, target)
            }
            CombatEventKind::Timeout => {
                write!(f, "[{}] the battle ends with no victor", self.at)
            }
        }
    }
}

/// Accumulating battle log.
///
/// `retain_events` mirrors the invocation mode: live battles keep the ordered
/// event list, fast-forward fitness runs keep only aggregates. Both paths run
/// the identical resolution code and push the identical events.
#[derive(Debug)]
pub struct BattleLog {
    retain_events: bool,
    events: Vec<CombatEvent>,
    damage_by: BTreeMap<CharacterId, u64>,
}

impl BattleLog {
    pub fn new(retain_events: bool) -> Self {
        Self {
            retain_events,
            events: Vec::new(),
            damage_by: BTreeMap::new(),
        }
    }

    /// Record one event, folding damage attribution into the totals.
    pub fn push(&mut self, event: CombatEvent) {
        if let Some(amount) = event.dealt_damage() {
            *self.damage_by.entry(event.source.clone()).or_insert(0) += amount;
        }
        if self.retain_events {
            self.events.push(event);
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total damage credited to one combatant.
    pub fn damage_dealt_by(&self, id: &str) -> u64 {
        self.damage_by.get(id).copied().unwrap_or(0)
    }

    /// Consume the log into its event list and damage totals.
    pub fn into_parts(self) -> (Vec<CombatEvent>, BTreeMap<CharacterId, u64>) {
        (self.events, self.damage_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(source: &str, target: &str, amount: u32) -> CombatEvent {
        CombatEvent {
            at: Tick(100),
            source: source.to_string(),
            target: Some(target.to_string()),
            kind: CombatEventKind::BasicAttack { amount },
        }
    }

    #[test]
    fn damage_is_attributed_to_source() {
        let mut log = BattleLog::new(true);
        log.push(hit("a", "b", 10));
        log.push(hit("a", "b", 5));
        log.push(hit("b", "a", 7));
        assert_eq!(log.damage_dealt_by("a"), 15);
        assert_eq!(log.damage_dealt_by("b"), 7);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn fast_forward_keeps_aggregates_only() {
        let mut log = BattleLog::new(false);
        log.push(hit("a", "b", 10));
        assert!(log.is_empty());
        assert_eq!(log.damage_dealt_by("a"), 10);
    }
}
