//! Rotation control: which action does a combatant take this turn.
//!
//! The rotation is a fixed, ordered ability list with a sticky cursor: the
//! queued ability is retried every turn until its cooldown and resource cost
//! allow it, and basic attacks fill the gaps. Only a successful cast advances
//! the cursor.

use crate::env::{AbilityId, AbilityOracle};
use crate::tick::Tick;

use super::state::Combatant;

/// The action chosen for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnAction {
    Ability(AbilityId),
    BasicAttack,
}

/// Fixed ability rotation with a circular sticky cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationController {
    rotation: Vec<AbilityId>,
    cursor: usize,
}

impl RotationController {
    pub fn new(rotation: Vec<AbilityId>) -> Self {
        Self {
            rotation,
            cursor: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rotation.is_empty()
    }

    pub fn abilities(&self) -> &[AbilityId] {
        &self.rotation
    }

    /// Ability the cursor currently points at.
    pub fn queued(&self) -> Option<&AbilityId> {
        self.rotation.get(self.cursor)
    }

    /// Advance the cursor circularly after a successful cast.
    pub fn advance(&mut self) {
        if !self.rotation.is_empty() {
            self.cursor = (self.cursor + 1) % self.rotation.len();
        }
    }
}

/// Decide and commit the actor's action for this turn.
///
/// On a successful cast the resource is deducted and the cooldown set here,
/// so the caller only resolves the ability's effects. The emergency-heal
/// override (behavior gene) fires before the queued ability is considered and
/// does not move the cursor.
pub fn decide_action(
    actor: &mut Combatant,
    abilities: &dyn AbilityOracle,
    now: Tick,
) -> TurnAction {
    if let Some(id) = emergency_heal(actor, abilities, now) {
        commit_cast(actor, abilities, &id, now);
        return TurnAction::Ability(id);
    }

    let Some(queued) = actor.rotation.queued().cloned() else {
        return TurnAction::BasicAttack;
    };
    // Rotation ids were validated at battle setup.
    let Some(def) = abilities.ability(&queued) else {
        return TurnAction::BasicAttack;
    };

    let affordable = actor.resources.get(def.cost.kind.into()) >= def.cost.value;
    if actor.is_ready(&queued, now) && affordable {
        commit_cast(actor, abilities, &queued, now);
        actor.rotation.advance();
        TurnAction::Ability(queued)
    } else {
        // Sticky retry: same ability is queued again next turn.
        TurnAction::BasicAttack
    }
}

/// A heal from anywhere in the rotation, castable now, when health has
/// dropped below the combatant's heal threshold.
fn emergency_heal(
    actor: &Combatant,
    abilities: &dyn AbilityOracle,
    now: Tick,
) -> Option<AbilityId> {
    let threshold = actor.heal_threshold?;
    let cutoff = (f64::from(actor.stats.maximums.health) * threshold).floor() as u32;
    if actor.resources.health >= cutoff {
        return None;
    }
    actor
        .rotation
        .abilities()
        .iter()
        .find(|id| {
            abilities.ability(id).is_some_and(|def| {
                def.is_heal()
                    && actor.is_ready(id, now)
                    && actor.resources.get(def.cost.kind.into()) >= def.cost.value
            })
        })
        .cloned()
}

fn commit_cast(actor: &mut Combatant, abilities: &dyn AbilityOracle, id: &str, now: Tick) {
    if let Some(def) = abilities.ability(id) {
        actor.resources.spend(def.cost.kind.into(), def.cost.value);
        actor.cooldowns.insert(def.id.clone(), now.plus(def.cooldown));
    }
}
